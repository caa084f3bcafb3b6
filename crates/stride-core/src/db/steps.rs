//! Step observation operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::Database;
use crate::error::Result;
use crate::models::{ImportStats, Observation, RawObservation, RawSteps, StepPoint, UpsertOutcome};
use crate::series::{parse_date, Series};

/// Dates are stored as ISO strings so they sort chronologically
fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn upsert_on(conn: &Connection, obs: &Observation) -> Result<UpsertOutcome> {
    let date = date_key(obs.date);

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM step_data WHERE date = ? AND user_id = ?",
            params![date, obs.user_id],
            |row| row.get(0),
        )
        .optional()?;

    conn.execute(
        "INSERT INTO step_data (date, steps, user_id) VALUES (?, ?, ?)
         ON CONFLICT(date, user_id) DO UPDATE SET steps = excluded.steps",
        params![date, obs.steps, obs.user_id],
    )?;

    Ok(match existing {
        Some(_) => UpsertOutcome::Updated,
        None => UpsertOutcome::Inserted,
    })
}

impl Database {
    /// Insert or replace the step count for (date, user)
    pub fn upsert_steps(&self, obs: &Observation) -> Result<UpsertOutcome> {
        let conn = self.conn()?;
        let outcome = upsert_on(&conn, obs)?;
        debug!(user = %obs.user_id, date = %obs.date, steps = obs.steps, ?outcome, "Stored steps");
        Ok(outcome)
    }

    /// Upsert a batch of observations atomically
    ///
    /// Either every observation is written or none are.
    pub fn upsert_observations(&self, observations: &[Observation]) -> Result<ImportStats> {
        let conn = self.conn()?;

        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<ImportStats> = (|| {
            let mut stats = ImportStats::default();
            for obs in observations {
                stats.record(upsert_on(&conn, obs)?);
            }
            Ok(stats)
        })();

        match result {
            Ok(stats) => {
                conn.execute("COMMIT", [])?;
                info!(
                    inserted = stats.inserted,
                    updated = stats.updated,
                    "Imported step observations"
                );
                Ok(stats)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// Stored rows for a user as the series builder consumes them
    pub fn list_raw_observations(&self, user_id: &str) -> Result<Vec<RawObservation>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT date, steps FROM step_data WHERE user_id = ? ORDER BY date")?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                let date: String = row.get(0)?;
                let steps: i64 = row.get(1)?;
                Ok(RawObservation {
                    date,
                    steps: RawSteps::Integer(steps),
                    user_id: user_id.to_string(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Load a user's validated history
    pub fn load_series(&self, user_id: &str) -> Result<Series> {
        let rows = self.list_raw_observations(user_id)?;
        Series::from_rows(user_id, rows)
    }

    /// All stored (date, steps) for a user, ascending by date
    pub fn list_steps(&self, user_id: &str) -> Result<Vec<StepPoint>> {
        Ok(self.load_series(user_id)?.points().to_vec())
    }

    /// Distinct user ids with stored data
    pub fn list_users(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT user_id FROM step_data ORDER BY user_id")?;

        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(users)
    }

    pub fn count_observations(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM step_data WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete one day's entry, returning whether a row existed
    pub fn delete_observation(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM step_data WHERE user_id = ? AND date = ?",
            params![user_id, date_key(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Delete every entry for a user, returning how many were removed
    pub fn clear_user(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM step_data WHERE user_id = ?", params![user_id])?;
        info!(user = user_id, deleted, "Cleared step history");
        Ok(deleted)
    }

    /// Most recent stored date for a user
    pub fn last_observation_date(&self, user_id: &str) -> Result<Option<NaiveDate>> {
        let conn = self.conn()?;
        let last: Option<String> = conn.query_row(
            "SELECT MAX(date) FROM step_data WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        last.map(|s| parse_date(&s)).transpose()
    }
}
