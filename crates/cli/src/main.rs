//! Seeker CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! seeker-cli migrate
//!
//! # List users with their seeking-list item counts
//! seeker-cli admin list-users
//!
//! # Delete a user and their seeking list
//! seeker-cli admin delete-user 80351110224678912
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin list-users` - List users with item counts
//! - `admin delete-user` - Delete a user account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "seeker-cli")]
#[command(author, version, about = "Seeker CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List users with their seeking-list item counts
    ListUsers,
    /// Delete a user and, by cascade, their seeking list
    DeleteUser {
        /// Discord user ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::ListUsers => commands::admin::list_users().await?,
            AdminAction::DeleteUser { id } => commands::admin::delete_user(&id).await?,
        },
    }
    Ok(())
}
