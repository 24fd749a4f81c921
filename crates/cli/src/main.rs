//! Minibank CLI - ledger operations from the command line
//!
//! Usage:
//! ```bash
//! minibank init
//! minibank user create alice --full-name "Alice Example" --email alice@example.com
//! minibank account create alice --currency USD --balance 100.00
//! minibank deposit 1 25.50
//! minibank transfer 1 2 10.00
//! minibank history 1
//! ```
//!
//! The CLI performs the caller-side checks the store does not: it looks up
//! both accounts, verifies the currencies match and converts the decimal
//! amount to minor units before invoking the atomic transfer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;

use commands::{account, transfer, user};

/// Minibank - a minimal banking ledger on SQLite
#[derive(Parser)]
#[command(name = "minibank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/minibank.db", global = true)]
    pub db: PathBuf,

    /// Verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema (idempotent)
    Init,

    /// User management
    User {
        #[command(subcommand)]
        action: user::UserAction,
    },

    /// Account management
    Account {
        #[command(subcommand)]
        action: account::AccountAction,
    },

    /// Administrative deposit into an account
    Deposit {
        /// Account id
        account_id: i64,
        /// Amount in the account currency, e.g. 25.50
        amount: Decimal,
    },

    /// Transfer money between two accounts of the same currency
    Transfer {
        /// Source account id
        from: i64,
        /// Destination account id
        to: i64,
        /// Amount in the shared currency, e.g. 10.00
        amount: Decimal,
        /// Print the full transfer result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show entries recorded against an account
    History {
        /// Account id
        account_id: i64,
        /// Maximum number of entries
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let db_url = format!("sqlite:{}", cli.db.display());
    if let Some(parent) = cli.db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Init => {
            commands::init_database(&db_url).await?;
        }
        Commands::User { action } => {
            user::run(&db_url, action).await?;
        }
        Commands::Account { action } => {
            account::run(&db_url, action).await?;
        }
        Commands::Deposit { account_id, amount } => {
            account::deposit(&db_url, account_id, amount).await?;
        }
        Commands::Transfer {
            from,
            to,
            amount,
            json,
        } => {
            transfer::run(&db_url, from, to, amount, json).await?;
        }
        Commands::History { account_id, limit } => {
            account::history(&db_url, account_id, limit).await?;
        }
    }

    Ok(())
}
