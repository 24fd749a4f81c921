//! # Store Errors
//!
//! Error types for the ledger store. Raw `sqlx` failures are classified into
//! structured variants so callers can branch on kinds instead of parsing
//! database error text.

use thiserror::Error;

/// Ledger store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    // === Domain rejections ===
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error(
        "Insufficient funds on account {account_id}: requested {requested}, balance {balance}"
    )]
    InsufficientFunds {
        account_id: i64,
        requested: i64,
        balance: i64,
    },

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    // === Constraint violations ===
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    // === Storage failures ===
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Transaction failed: {source}; rollback also failed: {rollback}")]
    Rollback {
        source: Box<StoreError>,
        rollback: sqlx::Error,
    },
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: &str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }

    /// Transient storage failures the caller may retry.
    ///
    /// The store itself never retries; retry policy belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Io(_)) => true,
            Self::Database(sqlx::Error::PoolTimedOut) => true,
            Self::Database(sqlx::Error::Database(db)) => {
                // Primary SQLite codes 5 (SQLITE_BUSY) and 6 (SQLITE_LOCKED);
                // extended codes carry the primary code in the low byte.
                db.code()
                    .and_then(|code| code.parse::<u32>().ok())
                    .map(|code| matches!(code & 0xff, 5 | 6))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return Self::UniqueViolation(db.message().to_string());
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return Self::ForeignKeyViolation(db.message().to_string());
                }
                sqlx::error::ErrorKind::CheckViolation => {
                    return Self::CheckViolation(db.message().to_string());
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}
