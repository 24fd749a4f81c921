//! Shared helpers for store integration tests.

use minibank_core::Currency;
use minibank_store::{Account, CreateAccountParams, CreateUserParams, Ledger, SqlStore};
use tempfile::TempDir;

/// Fresh store backed by a SQLite file in its own temp directory.
///
/// A file-backed database is required here: the concurrency tests run many
/// transactions across pooled connections, and in-memory SQLite is private
/// to a single connection.
pub async fn test_store() -> (SqlStore, TempDir) {
    let dir = TempDir::new().expect("create tempdir");
    let url = format!("sqlite:{}", dir.path().join("ledger.db").display());
    let store = SqlStore::connect(&url).await.expect("connect store");
    (store, dir)
}

/// Create a user plus one USD account with the given opening balance.
pub async fn seed_account(store: &SqlStore, username: &str, balance: i64) -> Account {
    store
        .create_user(CreateUserParams {
            username: username.to_string(),
            full_name: format!("Test {}", username),
            email: format!("{}@example.com", username),
        })
        .await
        .expect("create user");
    store
        .create_account(CreateAccountParams {
            owner: username.to_string(),
            currency: Currency::Usd,
            balance,
        })
        .await
        .expect("create account")
}

/// Row count of a whole table.
pub async fn table_count(store: &SqlStore, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(store.pool())
        .await
        .expect("count rows");
    row.0
}
