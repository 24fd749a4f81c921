//! Atomic money transfer between two accounts.
//!
//! A transfer is one unit of work: the transfer row, both entry rows and both
//! balance adjustments commit together or not at all. Balance rows are always
//! updated in ascending account-id order, whichever side is logically the
//! source, so two transfers moving money between the same pair of accounts in
//! opposite directions acquire their row locks in the same order and cannot
//! deadlock.

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Account, CreateEntryParams, CreateTransferParams, Entry, Transfer,
};
use crate::repos::{AccountRepo, EntryRepo, TransferRepo};
use crate::SqlStore;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::Instrument;

/// Parameters for [`SqlStore::transfer_tx`].
#[derive(Debug, Clone)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount in minor units, must be positive
    pub amount: i64,
    /// Optional correlation id, only used for tracing
    pub trace_id: Option<String>,
}

impl TransferTxParams {
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// Everything a committed transfer produced, with the accounts in request
/// order regardless of the internal lock-acquisition order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}

impl SqlStore {
    /// Move money from one account to another as a single transaction.
    ///
    /// Creates a transfer record, a debit entry on the source, a credit entry
    /// on the destination, and adjusts both balances. Any step failure rolls
    /// the whole transaction back; an overdraw surfaces as
    /// [`StoreError::InsufficientFunds`] and a missing account as
    /// [`StoreError::NotFound`], with no rows written in either case.
    pub async fn transfer_tx(&self, params: TransferTxParams) -> StoreResult<TransferTxResult> {
        if params.amount <= 0 {
            return Err(StoreError::InvalidTransfer(format!(
                "amount must be positive, got {}",
                params.amount
            )));
        }
        if params.from_account_id == params.to_account_id {
            return Err(StoreError::InvalidTransfer(format!(
                "cannot transfer from account {} to itself",
                params.from_account_id
            )));
        }

        let span = tracing::debug_span!(
            "transfer_tx",
            from = params.from_account_id,
            to = params.to_account_id,
            amount = params.amount,
            trace_id = params.trace_id.as_deref().unwrap_or(""),
        );

        self.run_transaction(move |conn| Box::pin(execute_transfer(conn, params)))
            .instrument(span)
            .await
    }
}

/// The transfer unit of work, executed inside one open transaction.
async fn execute_transfer(
    conn: &mut SqliteConnection,
    params: TransferTxParams,
) -> StoreResult<TransferTxResult> {
    let transfer = match TransferRepo::insert(
        conn,
        &CreateTransferParams {
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
        },
    )
    .await
    {
        Ok(transfer) => transfer,
        Err(StoreError::ForeignKeyViolation(message)) => {
            return Err(resolve_missing_account(
                conn,
                params.from_account_id,
                params.to_account_id,
                message,
            )
            .await);
        }
        Err(err) => return Err(err),
    };

    let from_entry = EntryRepo::insert(
        conn,
        &CreateEntryParams {
            account_id: params.from_account_id,
            amount: -params.amount,
        },
    )
    .await?;

    let to_entry = EntryRepo::insert(
        conn,
        &CreateEntryParams {
            account_id: params.to_account_id,
            amount: params.amount,
        },
    )
    .await?;

    // Fixed global lock order: lower account id first.
    let (from_account, to_account) = if params.from_account_id < params.to_account_id {
        let from = AccountRepo::add_balance(conn, params.from_account_id, -params.amount).await?;
        let to = AccountRepo::add_balance(conn, params.to_account_id, params.amount).await?;
        (from, to)
    } else {
        let to = AccountRepo::add_balance(conn, params.to_account_id, params.amount).await?;
        let from = AccountRepo::add_balance(conn, params.from_account_id, -params.amount).await?;
        (from, to)
    };

    tracing::debug!(transfer_id = transfer.id, "transfer applied");

    Ok(TransferTxResult {
        transfer,
        from_entry,
        to_entry,
        from_account,
        to_account,
    })
}

/// Turn a foreign-key failure on the transfer insert into a `NotFound` naming
/// the missing account. Runs on the abort path only.
async fn resolve_missing_account(
    conn: &mut SqliteConnection,
    from_account_id: i64,
    to_account_id: i64,
    message: String,
) -> StoreError {
    for id in [from_account_id, to_account_id] {
        match AccountRepo::get_optional(conn, id).await {
            Ok(Some(_)) => continue,
            Ok(None) => return StoreError::not_found("account", id),
            Err(_) => break,
        }
    }
    StoreError::ForeignKeyViolation(message)
}
