//! CLI command implementations.

pub mod account;
pub mod transfer;
pub mod user;

use anyhow::Result;
use minibank_store::SqlStore;

/// Create the schema and report success.
pub async fn init_database(db_url: &str) -> Result<()> {
    SqlStore::connect(db_url).await?;
    println!("📦 Ledger schema ready at {}", db_url);
    Ok(())
}

/// Connect to an existing (or fresh) ledger database.
pub async fn connect(db_url: &str) -> Result<SqlStore> {
    Ok(SqlStore::connect(db_url).await?)
}
