//! User commands.

use anyhow::Result;
use clap::Subcommand;
use minibank_store::{CreateUserParams, Ledger};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a new user
    Create {
        /// Unique username
        username: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
    },
    /// Show a user
    Show {
        username: String,
    },
}

pub async fn run(db_url: &str, action: UserAction) -> Result<()> {
    let store = super::connect(db_url).await?;

    match action {
        UserAction::Create {
            username,
            full_name,
            email,
        } => {
            let user = store
                .create_user(CreateUserParams {
                    username,
                    full_name,
                    email,
                })
                .await?;
            println!("✅ Created user {} ({})", user.username, user.full_name);
        }
        UserAction::Show { username } => {
            let user = store.get_user(&username).await?;
            println!("User:    {}", user.username);
            println!("Name:    {}", user.full_name);
            println!("Email:   {}", user.email);
            println!("Since:   {}", user.created_at);
        }
    }
    Ok(())
}
