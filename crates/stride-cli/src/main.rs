//! Stride CLI - Daily step insights and forecasts
//!
//! Usage:
//!   stride init                    Initialize database
//!   stride import --file CSV       Import daily steps
//!   stride insights                Show statistics and recommendations
//!   stride predict --days 7        Forecast upcoming days
//!   stride serve --port 3000       Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let user = cli.user.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, &file, user)
        }
        Commands::Add { date, steps } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(&db, user, &date, &steps)
        }
        Commands::Steps { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_steps(&db, user, limit)
        }
        Commands::Insights { json } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_insights(&db, &config, user, json)
        }
        Commands::Predict { days, json } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_predict(&db, &config, user, days, json)
        }
        Commands::Dashboard { json } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_dashboard(&db, &config, user, json)
        }
        Commands::Users => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_users(&db)
        }
        Commands::Remove { date, all, yes } => {
            let db = commands::open_db(&cli.db)?;
            match date {
                Some(date) => commands::cmd_remove_day(&db, user, &date),
                None if all => commands::cmd_clear(&db, user, yes),
                None => anyhow::bail!("Specify --date YYYY-MM-DD or --all"),
            }
        }
        Commands::Serve { port, host } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_serve(&cli.db, config, &host, port).await
        }
    }
}
