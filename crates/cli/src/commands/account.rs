//! Account commands: create, list, show, administrative deposit, history.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use minibank_core::{Currency, Money};
use minibank_store::{Account, CreateAccountParams, Ledger, ListParams};
use rust_decimal::Decimal;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Open an account for a user
    Create {
        /// Owner username
        owner: String,
        /// Account currency (USD, EUR, CAD)
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Opening balance, e.g. 100.00
        #[arg(long, default_value = "0")]
        balance: Decimal,
    },
    /// List accounts
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Show one account
    Show {
        account_id: i64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn print_account(account: &Account) {
    let currency: Currency = match account.currency() {
        Ok(currency) => currency,
        Err(_) => {
            println!(
                "  [{}] {} {} {} (unknown currency)",
                account.id, account.owner, account.balance, account.currency
            );
            return;
        }
    };
    println!(
        "  [{}] {}: {}",
        account.id,
        account.owner,
        Money::new(account.balance, currency)
    );
}

pub async fn run(db_url: &str, action: AccountAction) -> Result<()> {
    let store = super::connect(db_url).await?;

    match action {
        AccountAction::Create {
            owner,
            currency,
            balance,
        } => {
            let currency: Currency = currency.parse()?;
            let opening = Money::from_decimal(balance, currency)?;
            if opening.is_negative() {
                bail!("opening balance cannot be negative");
            }
            let account = store
                .create_account(CreateAccountParams {
                    owner,
                    currency,
                    balance: opening.minor,
                })
                .await?;
            println!("✅ Opened account {} for {}", account.id, account.owner);
            print_account(&account);
        }
        AccountAction::List { limit, offset } => {
            let accounts = store.list_accounts(ListParams { limit, offset }).await?;
            println!("Accounts ({}):", accounts.len());
            for account in &accounts {
                print_account(account);
            }
        }
        AccountAction::Show { account_id, json } => {
            let account = store.get_account(account_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&account)?);
            } else {
                print_account(&account);
            }
        }
    }
    Ok(())
}

/// Administrative balance adjustment; not a transfer, writes no entry.
pub async fn deposit(db_url: &str, account_id: i64, amount: Decimal) -> Result<()> {
    let store = super::connect(db_url).await?;

    let account = store.get_account(account_id).await?;
    let currency = account
        .currency()
        .context("account holds an unknown currency")?;
    let money = Money::from_decimal(amount, currency)?;
    if !money.is_positive() {
        bail!("deposit amount must be positive");
    }

    let updated = store.add_account_balance(account_id, money.minor).await?;
    println!("✅ Deposited {} into account {}", money, updated.id);
    print_account(&updated);
    Ok(())
}

/// Show the signed entries recorded against an account.
pub async fn history(db_url: &str, account_id: i64, limit: i64) -> Result<()> {
    let store = super::connect(db_url).await?;

    let account = store.get_account(account_id).await?;
    let entries = store
        .list_entries(account_id, ListParams { limit, offset: 0 })
        .await?;

    println!("History for account {} ({}):", account.id, account.currency);
    for entry in &entries {
        let sign = if entry.amount < 0 { "debit " } else { "credit" };
        println!(
            "  [{}] {} {:>12}  at {}",
            entry.id, sign, entry.amount, entry.created_at
        );
    }
    if entries.is_empty() {
        println!("  (no entries)");
    }
    Ok(())
}
