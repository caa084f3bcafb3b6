//! Series builder
//!
//! Turns raw (date, steps, user_id) rows into a [`Series`]: one user's history,
//! strictly ascending by date with at most one entry per date. Later rows for a
//! date replace earlier ones, matching the store's upsert semantics.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Observation, RawObservation, RawSteps, StepPoint};

/// Date-only formats accepted for observations, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Timestamp formats whose time part is dropped
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a date string into a calendar date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(Error::Validation(format!("Unparseable date: {:?}", s)))
}

/// Parse a raw step value into a non-negative integer
///
/// Integer-valued decimals such as `5000.0` are accepted; fractions,
/// negatives and anything above `u32::MAX` are rejected.
pub fn parse_steps(raw: &RawSteps) -> Result<u32> {
    match raw {
        RawSteps::Integer(n) => integer_steps(*n, raw),
        RawSteps::Float(x) => float_steps(*x, raw),
        RawSteps::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return integer_steps(n, raw);
            }
            match s.parse::<f64>() {
                Ok(x) => float_steps(x, raw),
                Err(_) => Err(invalid_steps(raw)),
            }
        }
    }
}

fn integer_steps(n: i64, raw: &RawSteps) -> Result<u32> {
    u32::try_from(n).map_err(|_| invalid_steps(raw))
}

fn float_steps(x: f64, raw: &RawSteps) -> Result<u32> {
    if !x.is_finite() || x < 0.0 || x.fract() != 0.0 || x > u32::MAX as f64 {
        return Err(invalid_steps(raw));
    }
    Ok(x as u32)
}

fn invalid_steps(raw: &RawSteps) -> Error {
    Error::Validation(format!(
        "Steps must be a non-negative integer, got {:?}",
        raw.to_string()
    ))
}

/// Validate a raw row into an [`Observation`]
pub fn validate(raw: &RawObservation) -> Result<Observation> {
    let date = parse_date(&raw.date)?;
    let steps = parse_steps(&raw.steps)?;
    Ok(Observation::new(date, steps, raw.user_id.clone()))
}

/// A single user's step history, strictly ascending by date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    user_id: String,
    points: Vec<StepPoint>,
}

impl Series {
    /// An empty series for a user
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            points: Vec::new(),
        }
    }

    /// Build a series from raw rows, keeping only rows for `user_id`
    pub fn from_rows<I>(user_id: &str, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = RawObservation>,
    {
        let mut builder = SeriesBuilder::new(user_id);
        for row in rows {
            builder.push_raw(&row)?;
        }
        Ok(builder.build())
    }

    /// Build a series from already-typed points (last write wins per date)
    pub fn from_points<I>(user_id: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = StepPoint>,
    {
        let mut builder = SeriesBuilder::new(user_id);
        for point in points {
            builder.insert(point.date, point.steps);
        }
        builder.build()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn points(&self) -> &[StepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Sum of all step counts
    pub fn total_steps(&self) -> u64 {
        self.points.iter().map(|p| p.steps as u64).sum()
    }

    /// Integer-truncated mean, or `None` when empty
    pub fn mean_steps(&self) -> Option<u32> {
        if self.points.is_empty() {
            return None;
        }
        Some((self.total_steps() / self.points.len() as u64) as u32)
    }

    /// The last `n` points (or all of them when shorter)
    pub fn tail(&self, n: usize) -> &[StepPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Points back as observations tagged with this series' user
    pub fn to_observations(&self) -> Vec<Observation> {
        self.points
            .iter()
            .map(|p| Observation::new(p.date, p.steps, self.user_id.clone()))
            .collect()
    }
}

/// Accumulates rows for one user with upsert semantics
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    user_id: String,
    points: BTreeMap<NaiveDate, u32>,
    skipped: usize,
}

impl SeriesBuilder {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            points: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Validate and add a raw row
    ///
    /// Returns `Ok(false)` when the row belongs to another user. A row that
    /// fails validation leaves the builder unchanged.
    pub fn push_raw(&mut self, raw: &RawObservation) -> Result<bool> {
        if raw.user_id != self.user_id {
            self.skipped += 1;
            return Ok(false);
        }

        let obs = validate(raw)?;
        self.insert(obs.date, obs.steps);
        Ok(true)
    }

    /// Add a validated observation (ignored when it belongs to another user)
    pub fn push(&mut self, obs: &Observation) -> bool {
        if obs.user_id != self.user_id {
            self.skipped += 1;
            return false;
        }
        self.insert(obs.date, obs.steps);
        true
    }

    fn insert(&mut self, date: NaiveDate, steps: u32) {
        if let Some(previous) = self.points.insert(date, steps) {
            debug!(
                user = %self.user_id,
                %date,
                previous,
                steps,
                "Replaced duplicate date in series"
            );
        }
    }

    /// Number of distinct dates accumulated so far
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rows ignored because they were tagged with a different user
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn build(self) -> Series {
        if self.skipped > 0 {
            debug!(
                user = %self.user_id,
                skipped = self.skipped,
                "Ignored rows for other users"
            );
        }

        Series {
            user_id: self.user_id,
            points: self
                .points
                .into_iter()
                .map(|(date, steps)| StepPoint { date, steps })
                .collect(),
        }
    }
}
