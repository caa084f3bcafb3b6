//! Data models for Stride

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User id applied when a request or import does not name one
pub const DEFAULT_USER_ID: &str = "default_user";

/// A validated daily step count for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub steps: u32,
    pub user_id: String,
}

impl Observation {
    pub fn new(date: NaiveDate, steps: u32, user_id: impl Into<String>) -> Self {
        Self {
            date,
            steps,
            user_id: user_id.into(),
        }
    }
}

/// Step value as it arrives from a CSV cell, form field, JSON body, or database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSteps {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RawSteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawSteps::Integer(n) => write!(f, "{}", n),
            RawSteps::Float(x) => write!(f, "{}", x),
            RawSteps::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RawSteps {
    fn from(value: i64) -> Self {
        RawSteps::Integer(value)
    }
}

impl From<u32> for RawSteps {
    fn from(value: u32) -> Self {
        RawSteps::Integer(value as i64)
    }
}

impl From<f64> for RawSteps {
    fn from(value: f64) -> Self {
        RawSteps::Float(value)
    }
}

impl From<&str> for RawSteps {
    fn from(value: &str) -> Self {
        RawSteps::Text(value.to_string())
    }
}

impl From<String> for RawSteps {
    fn from(value: String) -> Self {
        RawSteps::Text(value)
    }
}

/// An unvalidated (date, steps, user_id) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub steps: RawSteps,
    pub user_id: String,
}

impl RawObservation {
    pub fn new(
        date: impl Into<String>,
        steps: impl Into<RawSteps>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            steps: steps.into(),
            user_id: user_id.into(),
        }
    }
}

/// A single (date, steps) point of a user's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPoint {
    pub date: NaiveDate,
    pub steps: u32,
}

/// Result of writing one observation to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Counts from writing a batch of observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub inserted: usize,
    pub updated: usize,
}

impl ImportStats {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_steps_deserializes_any_shape() {
        let n: RawSteps = serde_json::from_str("8123").unwrap();
        assert_eq!(n, RawSteps::Integer(8123));

        let x: RawSteps = serde_json::from_str("8123.0").unwrap();
        assert_eq!(x, RawSteps::Float(8123.0));

        let s: RawSteps = serde_json::from_str("\"8123\"").unwrap();
        assert_eq!(s, RawSteps::Text("8123".to_string()));
    }

    #[test]
    fn test_import_stats_record() {
        let mut stats = ImportStats::default();
        stats.record(UpsertOutcome::Inserted);
        stats.record(UpsertOutcome::Inserted);
        stats.record(UpsertOutcome::Updated);
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_observation_serializes_iso_date() {
        let obs = Observation::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), 4200, "amy");
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["date"], "2024-03-09");
        assert_eq!(json["steps"], 4200);
    }
}
