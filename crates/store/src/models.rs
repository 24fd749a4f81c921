//! Row types and typed parameter structs for the ledger tables.
//!
//! These map 1:1 to the SQLite schema in [`crate::db`]. Amounts and balances
//! are `i64` minor units; `currency` is stored as its code and parsed back to
//! [`minibank_core::Currency`] on demand.

use chrono::{DateTime, Utc};
use minibank_core::{CoreResult, Currency};
use serde::{Deserialize, Serialize};

/// Row type for the `users` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `accounts` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    /// Balance in minor units; never driven negative by a transfer debit
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Parse the stored currency code
    pub fn currency(&self) -> CoreResult<Currency> {
        self.currency.parse()
    }
}

/// Row type for the `entries` table.
///
/// One signed line-item per account per transfer: negative = debit,
/// positive = credit. Immutable once written.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `transfers` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Always positive; the sign lives on the entries
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// === Typed parameters ===

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub currency: Currency,
    /// Opening balance in minor units
    pub balance: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Pagination window for list queries
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}
