//! # Minibank Core
//!
//! Core domain types for Minibank - a minimal banking ledger.
//!
//! The ledger keeps every balance as an `i64` in the smallest currency unit
//! (cents for USD/EUR/CAD). [`Money`] bridges those minor units to
//! `rust_decimal::Decimal` for parsing and display at the edges; the store
//! itself never touches floating point or decimals.
//!
//! Caller-side transfer validation (currency match, positive amount) lives
//! here as well: the store assumes those checks already passed and focuses
//! purely on atomicity.

pub mod error;
pub mod money;
pub mod validate;

pub use error::{CoreError, CoreResult};
pub use money::{Currency, Money};
pub use validate::validate_transfer;
