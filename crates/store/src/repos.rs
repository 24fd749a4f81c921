//! Single-row operations for the ledger tables.
//!
//! Every operation takes a `&mut SqliteConnection` so the same code path
//! serves pooled one-shot calls and calls scoped to an open transaction.
//! None of these carry concurrency logic of their own; composition and
//! lock ordering live in [`crate::transfer`].

use crate::error::{StoreError, StoreResult};
use crate::models::*;
use chrono::Utc;
use sqlx::SqliteConnection;

// ============================================================================
// User Repository
// ============================================================================

/// Repository for the `users` table
pub struct UserRepo;

impl UserRepo {
    pub async fn insert(
        conn: &mut SqliteConnection,
        params: &CreateUserParams,
    ) -> StoreResult<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, full_name, email, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&params.username)
        .bind(&params.full_name)
        .bind(&params.email)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(err) => match StoreError::from(err) {
                StoreError::UniqueViolation(_) => {
                    Err(StoreError::already_exists("user", &params.username))
                }
                other => Err(other),
            },
        }
    }

    pub async fn get(conn: &mut SqliteConnection, username: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| StoreError::not_found("user", username))
    }
}

// ============================================================================
// Account Repository
// ============================================================================

/// Repository for the `accounts` table
pub struct AccountRepo;

impl AccountRepo {
    pub async fn insert(
        conn: &mut SqliteConnection,
        params: &CreateAccountParams,
    ) -> StoreResult<Account> {
        let result = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (owner, balance, currency, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&params.owner)
        .bind(params.balance)
        .bind(params.currency.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await;

        match result {
            Ok(account) => Ok(account),
            Err(err) => match StoreError::from(err) {
                StoreError::UniqueViolation(_) => Err(StoreError::already_exists(
                    "account",
                    format!("{}/{}", params.owner, params.currency),
                )),
                other => Err(other),
            },
        }
    }

    pub async fn get(conn: &mut SqliteConnection, id: i64) -> StoreResult<Account> {
        Self::get_optional(conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("account", id))
    }

    pub async fn get_optional(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    pub async fn list(
        conn: &mut SqliteConnection,
        params: ListParams,
    ) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Atomically add `delta` (may be negative) to an account balance.
    ///
    /// The adjustment is a single conditional UPDATE, not a read-then-write,
    /// so concurrent increments cannot lose updates. The `balance + delta >= 0`
    /// guard makes an overdraw fail without touching the row; a follow-up read
    /// then distinguishes a missing account from insufficient funds.
    pub async fn add_balance(
        conn: &mut SqliteConnection,
        id: i64,
        delta: i64,
    ) -> StoreResult<Account> {
        let updated = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = balance + ?1
            WHERE id = ?2 AND balance + ?1 >= 0
            RETURNING *
            "#,
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match updated {
            Some(account) => Ok(account),
            None => match Self::get_optional(conn, id).await? {
                None => Err(StoreError::not_found("account", id)),
                Some(account) => {
                    tracing::warn!(
                        account_id = id,
                        requested = -delta,
                        balance = account.balance,
                        "balance adjustment rejected"
                    );
                    Err(StoreError::InsufficientFunds {
                        account_id: id,
                        requested: -delta,
                        balance: account.balance,
                    })
                }
            },
        }
    }
}

// ============================================================================
// Entry Repository
// ============================================================================

/// Repository for the `entries` table
pub struct EntryRepo;

impl EntryRepo {
    pub async fn insert(
        conn: &mut SqliteConnection,
        params: &CreateEntryParams,
    ) -> StoreResult<Entry> {
        let entry = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (account_id, amount, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(params.account_id)
        .bind(params.amount)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(entry)
    }

    pub async fn get(conn: &mut SqliteConnection, id: i64) -> StoreResult<Entry> {
        sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| StoreError::not_found("entry", id))
    }

    pub async fn list_by_account(
        conn: &mut SqliteConnection,
        account_id: i64,
        params: ListParams,
    ) -> StoreResult<Vec<Entry>> {
        let rows = sqlx::query_as::<_, Entry>(
            "SELECT * FROM entries WHERE account_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(account_id)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Transfer Repository
// ============================================================================

/// Repository for the `transfers` table
pub struct TransferRepo;

impl TransferRepo {
    pub async fn insert(
        conn: &mut SqliteConnection,
        params: &CreateTransferParams,
    ) -> StoreResult<Transfer> {
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(params.from_account_id)
        .bind(params.to_account_id)
        .bind(params.amount)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(transfer)
    }

    pub async fn get(conn: &mut SqliteConnection, id: i64) -> StoreResult<Transfer> {
        sqlx::query_as::<_, Transfer>("SELECT * FROM transfers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| StoreError::not_found("transfer", id))
    }

    /// Transfers touching the account on either side
    pub async fn list_by_account(
        conn: &mut SqliteConnection,
        account_id: i64,
        params: ListParams,
    ) -> StoreResult<Vec<Transfer>> {
        let rows = sqlx::query_as::<_, Transfer>(
            r#"
            SELECT * FROM transfers
            WHERE from_account_id = ?1 OR to_account_id = ?1
            ORDER BY id LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(account_id)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}
