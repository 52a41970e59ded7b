//! CLI module - Command-line interface for `EntryGate`
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

pub use commands::{cmd_attempts, cmd_create_admin, cmd_init};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `EntryGate` - two-step facility access control
/// Tag scan at a checkpoint, confirmed with a one-time code
#[derive(Parser)]
#[command(name = "entrygate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Create a default config file
    Init {
        /// Where to write the file
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Register an admin directly against the database
    CreateAdmin {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Badge tag id for the admin
        #[arg(long)]
        tag_id: String,
    },

    /// Print the entry attempt log
    Attempts {
        /// Only attempts by the user with this email
        #[arg(long)]
        email: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_admin() {
        let cli = Cli::try_parse_from([
            "entrygate",
            "create-admin",
            "--name",
            "Root",
            "--email",
            "root@example.com",
            "--password",
            "pw",
            "--tag-id",
            "TAG-0",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateAdmin { email, tag_id, .. }) => {
                assert_eq!(email, "root@example.com");
                assert_eq!(tag_id, "TAG-0");
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["entrygate"]).unwrap();
        assert!(cli.command.is_none());
    }
}
