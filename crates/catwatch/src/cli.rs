//! Command-line interface for catwatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Catwatch - GitHub organization statistics backend
#[derive(Parser, Debug)]
#[command(name = "catwatch")]
#[command(about = "Snapshots GitHub organization statistics and serves them over REST", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "catwatch.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations
    Migrate,

    /// Populate the database with test data for the configured organizations
    Init,

    /// Delete every stored record
    Delete,

    /// Export the whole database as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON bundle produced by `export`
    Import {
        /// Bundle file to read
        file: PathBuf,
    },

    /// Recompute project scores
    Score {
        /// Comma-separated organizations (defaults to configuration)
        #[arg(long)]
        organizations: Option<String>,

        /// Scoring formula (defaults to configuration)
        #[arg(long)]
        formula: Option<String>,
    },
}
