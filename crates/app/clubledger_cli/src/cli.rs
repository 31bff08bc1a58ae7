use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clubledger_core::models::Capability;

#[derive(Parser, Debug)]
#[command(name = "clubledger", about = "Investment club session and access control")]
pub struct Cli {
    /// Directory holding the persisted session (default: platform data dir).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Roster file with accounts and members (default: <data-dir>/roster.json).
    #[arg(long, global = true)]
    pub roster: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate against the roster and start a session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Restore the persisted session and report its state.
    Status,

    /// End the session and erase it from storage.
    Logout,

    /// Navigate to a screen path and print the resulting view.
    Open {
        /// Screen path, e.g. `/members`.
        path: String,

        /// Capability the screen is opened for.
        #[arg(long, default_value = "read")]
        capability: Capability,
    },

    /// List club members for the restored session.
    Members,

    /// Print a bcrypt hash for a roster account password.
    HashPassword { password: String },

    /// Print the version.
    Version,
}
