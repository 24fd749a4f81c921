//! # Minibank Store
//!
//! The ledger store: accounts, entries and transfers persisted in SQLite via
//! `sqlx`, with an atomic transfer operation on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         SqlStore                             │
//! │  ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐   │
//! │  │    repos     │   │ run_transaction │   │ transfer_tx  │   │
//! │  │ (row ops)    │──▶│ (begin/commit/  │──▶│ (ordered     │   │
//! │  │              │   │  rollback)      │   │  unit of     │   │
//! │  └──────────────┘   └─────────────────┘   │  work)       │   │
//! │                                           └──────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The datastore is the single source of truth: there is no in-process
//! mutable state behind any balance. Concurrency correctness is delegated to
//! SQLite's transaction isolation plus the fixed ascending-account-id update
//! order inside [`SqlStore::transfer_tx`].

pub mod db;
pub mod error;
pub mod models;
pub mod repos;
pub mod transfer;
pub mod tx;

pub use db::{create_pool, init_schema};
pub use error::{StoreError, StoreResult};
pub use models::{
    Account, CreateAccountParams, CreateEntryParams, CreateTransferParams, CreateUserParams,
    Entry, ListParams, Transfer, User,
};
pub use repos::{AccountRepo, EntryRepo, TransferRepo, UserRepo};
pub use transfer::{TransferTxParams, TransferTxResult};

use async_trait::async_trait;
use sqlx::SqlitePool;

/// The full ledger capability: single-row operations plus the composite
/// atomic transfer. One concrete implementation, [`SqlStore`], backs it with
/// a SQLite connection pool.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> StoreResult<User>;
    async fn get_user(&self, username: &str) -> StoreResult<User>;

    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account>;
    async fn get_account(&self, id: i64) -> StoreResult<Account>;
    async fn list_accounts(&self, params: ListParams) -> StoreResult<Vec<Account>>;
    /// Administrative balance adjustment (deposit/correction), atomic
    async fn add_account_balance(&self, id: i64, delta: i64) -> StoreResult<Account>;

    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry>;
    async fn get_entry(&self, id: i64) -> StoreResult<Entry>;
    async fn list_entries(&self, account_id: i64, params: ListParams) -> StoreResult<Vec<Entry>>;

    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer>;
    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer>;
    async fn list_transfers(
        &self,
        account_id: i64,
        params: ListParams,
    ) -> StoreResult<Vec<Transfer>>;

    /// Atomic money movement; see [`SqlStore::transfer_tx`]
    async fn transfer(&self, params: TransferTxParams) -> StoreResult<TransferTxResult>;
}

/// SQLite-backed ledger store.
#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = db::create_pool(database_url).await?;
        db::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Ledger for SqlStore {
    async fn create_user(&self, params: CreateUserParams) -> StoreResult<User> {
        let mut conn = self.pool.acquire().await?;
        UserRepo::insert(&mut conn, &params).await
    }

    async fn get_user(&self, username: &str) -> StoreResult<User> {
        let mut conn = self.pool.acquire().await?;
        UserRepo::get(&mut conn, username).await
    }

    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account> {
        let mut conn = self.pool.acquire().await?;
        AccountRepo::insert(&mut conn, &params).await
    }

    async fn get_account(&self, id: i64) -> StoreResult<Account> {
        let mut conn = self.pool.acquire().await?;
        AccountRepo::get(&mut conn, id).await
    }

    async fn list_accounts(&self, params: ListParams) -> StoreResult<Vec<Account>> {
        let mut conn = self.pool.acquire().await?;
        AccountRepo::list(&mut conn, params).await
    }

    async fn add_account_balance(&self, id: i64, delta: i64) -> StoreResult<Account> {
        let mut conn = self.pool.acquire().await?;
        AccountRepo::add_balance(&mut conn, id, delta).await
    }

    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry> {
        let mut conn = self.pool.acquire().await?;
        EntryRepo::insert(&mut conn, &params).await
    }

    async fn get_entry(&self, id: i64) -> StoreResult<Entry> {
        let mut conn = self.pool.acquire().await?;
        EntryRepo::get(&mut conn, id).await
    }

    async fn list_entries(&self, account_id: i64, params: ListParams) -> StoreResult<Vec<Entry>> {
        let mut conn = self.pool.acquire().await?;
        EntryRepo::list_by_account(&mut conn, account_id, params).await
    }

    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer> {
        let mut conn = self.pool.acquire().await?;
        TransferRepo::insert(&mut conn, &params).await
    }

    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer> {
        let mut conn = self.pool.acquire().await?;
        TransferRepo::get(&mut conn, id).await
    }

    async fn list_transfers(
        &self,
        account_id: i64,
        params: ListParams,
    ) -> StoreResult<Vec<Transfer>> {
        let mut conn = self.pool.acquire().await?;
        TransferRepo::list_by_account(&mut conn, account_id, params).await
    }

    async fn transfer(&self, params: TransferTxParams) -> StoreResult<TransferTxResult> {
        self.transfer_tx(params).await
    }
}
