//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stride_core::DEFAULT_USER_ID;

/// Stride - Daily step insights and forecasts
#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Self-hosted step tracker with insights and forecasts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "stride.db", global = true)]
    pub db: PathBuf,

    /// User whose history is read or written
    #[arg(short, long, default_value = DEFAULT_USER_ID, global = true)]
    pub user: String,

    /// Engine config file (defaults to ~/.config/stride/config.toml, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import daily steps from a CSV with `date` and `steps` columns
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Add or replace one day's steps
    Add {
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Step count
        #[arg(short, long)]
        steps: String,
    },

    /// List stored steps
    Steps {
        /// Show only the most recent N days
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show statistics and recommendations
    Insights {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forecast upcoming days
    Predict {
        /// Number of days (defaults to the configured horizon)
        #[arg(short = 'n', long)]
        days: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show history, insights and forecast together
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List users with stored data
    Users,

    /// Delete one day's entry, or the user's whole history
    Remove {
        /// Date to delete (omit with --all)
        #[arg(short, long, conflicts_with = "all")]
        date: Option<String>,

        /// Delete every entry for the user
        #[arg(long)]
        all: bool,

        /// Skip confirmation for --all
        #[arg(short, long)]
        yes: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
