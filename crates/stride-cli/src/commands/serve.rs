//! Server command implementation

use std::path::Path;

use anyhow::Result;
use stride_core::EngineConfig;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, config: EngineConfig, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Stride web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Forecast: {} days, trend model after {} observations",
        config.forecast.horizon, config.forecast.min_observations
    );
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;
    stride_server::serve(db, config, host, port).await?;

    Ok(())
}
