//! Command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use userdesk_core::UserId;

#[derive(Parser, Debug)]
#[command(name = "userdesk", version, about = "Manage user records in a local SQLite table")]
pub struct Args {
    /// sqlite:///path/to/users.db, sqlite:///:memory:, or a plain file path.
    /// Overrides DATABASE_URL from the environment or `.env`.
    #[arg(long)]
    pub database_url: Option<String>,

    #[arg(long, help = "Log every SQL statement at debug level (stderr unless a log dir is set)")]
    pub echo_sql: bool,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,

    #[arg(long, help = "Absolute directory for rolling log files (default: USERDESK_LOG_DIR)")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all users with the total count
    List,
    /// Show one user
    Show { id: UserId },
    /// Add a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Overwrite name and email of a user
    Edit {
        id: UserId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Delete a user
    Delete { id: UserId },
}
