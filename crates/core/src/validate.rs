//! Caller-side transfer request validation.
//!
//! The ledger store assumes the request already passed these checks and
//! concerns itself only with atomic execution. Front ends (CLI, API) call
//! [`validate_transfer`] before handing the request to the store.

use crate::error::{CoreError, CoreResult};
use crate::money::Currency;

/// Validate a transfer request between two accounts.
///
/// Both accounts must hold the same currency and the amount (in minor units)
/// must be strictly positive.
pub fn validate_transfer(
    from_currency: Currency,
    to_currency: Currency,
    amount: i64,
) -> CoreResult<()> {
    if amount <= 0 {
        return Err(CoreError::InvalidAmount(format!(
            "transfer amount must be positive, got {}",
            amount
        )));
    }
    if from_currency != to_currency {
        return Err(CoreError::CurrencyMismatch {
            expected: from_currency.as_str().to_string(),
            actual: to_currency.as_str().to_string(),
        });
    }
    Ok(())
}
