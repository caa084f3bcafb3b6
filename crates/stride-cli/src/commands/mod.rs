//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config)
//! - `steps` - Step history commands (import, add, list, remove, users)
//! - `analysis` - Insights, forecast and dashboard output
//! - `serve` - Web server command

pub mod analysis;
pub mod core;
pub mod serve;
pub mod steps;

// Re-export command functions for main.rs
pub use analysis::*;
pub use core::*;
pub use serve::*;
pub use steps::*;

/// Render a bar proportional to `value / max`
pub fn bar(value: u32, max: u32, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (value as u64 * width as u64 / max as u64) as usize;
    "█".repeat(filled.min(width))
}
