//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Engine configuration with overrides applied
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use stride_core::{config::default_config_path, db::Database, EngineConfig};

pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::new(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Load engine config from `--config`, the user config dir, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load_from(path).context("Failed to load engine configuration")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let users = db.list_users().context("Failed to read users")?;

    println!("✅ Database initialized successfully!");
    if !users.is_empty() {
        println!("   Existing users: {}", users.join(", "));
    }
    if let Some(path) = default_config_path() {
        println!("   Config override: {}", path.display());
    }
    println!();
    println!("Next steps:");
    println!("  1. Import steps: stride import --file steps.csv");
    println!("  2. See insights: stride insights");
    println!("  3. Start web API: stride serve");

    Ok(())
}
