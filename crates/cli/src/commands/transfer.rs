//! Transfer command.
//!
//! Performs the caller-side validation the store contract assigns to the API
//! layer (accounts exist, currencies match, amount parses into minor units),
//! then hands the request to the atomic transfer and maps the structured
//! error kinds to user-facing messages.

use anyhow::{bail, Result};
use minibank_core::{validate_transfer, Money};
use minibank_store::{Ledger, StoreError, TransferTxParams};
use rust_decimal::Decimal;
use uuid::Uuid;

pub async fn run(db_url: &str, from: i64, to: i64, amount: Decimal, json: bool) -> Result<()> {
    let store = super::connect(db_url).await?;

    let from_account = store.get_account(from).await?;
    let to_account = store.get_account(to).await?;
    let from_currency = from_account.currency()?;
    let to_currency = to_account.currency()?;

    let money = Money::from_decimal(amount, from_currency)?;
    validate_transfer(from_currency, to_currency, money.minor)?;

    let trace_id = Uuid::new_v4().to_string();
    let result = store
        .transfer_tx(
            TransferTxParams::new(from, to, money.minor).with_trace_id(trace_id.clone()),
        )
        .await;

    let result = match result {
        Ok(result) => result,
        Err(StoreError::InsufficientFunds {
            account_id,
            requested,
            balance,
        }) => {
            bail!(
                "account {} cannot cover {} (balance {})",
                account_id,
                Money::new(requested, from_currency),
                Money::new(balance, from_currency)
            );
        }
        Err(err) if err.is_not_found() => bail!("{}", err),
        Err(err) if err.is_retryable() => {
            bail!("transient storage failure, retry may succeed: {}", err)
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "✅ Transfer {} complete: {} from account {} to account {} (trace {})",
        result.transfer.id,
        Money::new(result.transfer.amount, from_currency),
        result.from_account.id,
        result.to_account.id,
        trace_id,
    );
    println!(
        "   account {} balance: {}",
        result.from_account.id,
        Money::new(result.from_account.balance, from_currency)
    );
    println!(
        "   account {} balance: {}",
        result.to_account.id,
        Money::new(result.to_account.balance, to_currency)
    );
    Ok(())
}
