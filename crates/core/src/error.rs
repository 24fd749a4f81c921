//! # Error Module
//!
//! Domain errors for Minibank core, independent of any storage backend.

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_currency_mismatch(&self) -> bool {
        matches!(self, CoreError::CurrencyMismatch { .. })
    }
}
