//! Step history commands (import, add, list, remove, users)

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use stride_core::{
    db::Database, insights::weekday_name, parse_csv, parse_date, validate, RawObservation,
    UpsertOutcome,
};

use super::bar;

pub fn cmd_import(db: &Database, file: &Path, user: &str) -> Result<()> {
    println!("📥 Importing steps for {} from {}...", user, file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let observations = parse_csv(csv_file, user).context("Failed to parse CSV")?;

    println!("   Found {} rows", observations.len());

    let stats = db.upsert_observations(&observations)?;
    let total = db.count_observations(user)?;

    println!("✅ Import complete!");
    println!("   New days: {}", stats.inserted);
    println!("   Updated days: {}", stats.updated);
    println!("   Total days for {}: {}", user, total);

    Ok(())
}

pub fn cmd_add(db: &Database, user: &str, date: &str, steps: &str) -> Result<()> {
    let obs = validate(&RawObservation::new(date, steps, user))?;

    match db.upsert_steps(&obs)? {
        UpsertOutcome::Inserted => println!("✅ Added {} steps on {}", obs.steps, obs.date),
        UpsertOutcome::Updated => println!("✅ Updated {} to {} steps", obs.date, obs.steps),
    }

    Ok(())
}

pub fn cmd_steps(db: &Database, user: &str, limit: Option<usize>) -> Result<()> {
    let series = db.load_series(user)?;

    if series.is_empty() {
        println!("No steps stored for {}. Import some with 'stride import --file steps.csv'", user);
        return Ok(());
    }

    let points = match limit {
        Some(n) => series.tail(n),
        None => series.points(),
    };
    let max = points.iter().map(|p| p.steps).max().unwrap_or(0);

    println!();
    println!("👟 Steps for {} ({} of {} days)", user, points.len(), series.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for p in points {
        println!(
            "   {} {:<9} {:>7}  {}",
            p.date,
            weekday_name(p.date.weekday()),
            p.steps,
            bar(p.steps, max, 30)
        );
    }

    Ok(())
}

pub fn cmd_users(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet.");
        return Ok(());
    }

    println!();
    println!("👥 Users");
    println!("   ─────────────────────────────");
    for user in users {
        let days = db.count_observations(&user)?;
        println!("   {:<24} {:>5} days", user, days);
    }

    Ok(())
}

pub fn cmd_remove_day(db: &Database, user: &str, date: &str) -> Result<()> {
    let date = parse_date(date)?;

    if db.delete_observation(user, date)? {
        println!("🗑️  Removed {} for {}", date, user);
    } else {
        println!("No entry for {} on {}", user, date);
    }

    Ok(())
}

pub fn cmd_clear(db: &Database, user: &str, yes: bool) -> Result<()> {
    let count = db.count_observations(user)?;
    if count == 0 {
        println!("No steps stored for {}", user);
        return Ok(());
    }

    if !yes {
        print!("⚠️  Delete all {} days for {}? [y/N] ", count, user);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = db.clear_user(user)?;
    println!("🗑️  Deleted {} days for {}", deleted, user);

    Ok(())
}
