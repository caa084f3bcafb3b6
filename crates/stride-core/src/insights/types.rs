//! Core types for step insights

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Full English weekday name ("Monday" ... "Sunday")
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Descriptive statistics and recommendations for one user's series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub total_days: usize,
    pub avg_steps: u32,
    pub max_steps: u32,
    pub max_steps_date: NaiveDate,
    pub min_steps: u32,
    pub min_steps_date: NaiveDate,
    /// Weekday name to integer-truncated mean, only for weekdays present
    pub day_averages: BTreeMap<String, u32>,
    pub most_active_day: String,
    pub least_active_day: String,
    pub recommendations: Vec<String>,
}

/// Running (sum, count) for one weekday
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayStats {
    pub total: u64,
    pub days: u64,
}

impl WeekdayStats {
    pub fn add(&mut self, steps: u32) {
        self.total += steps as u64;
        self.days += 1;
    }

    /// Integer-truncated mean
    pub fn mean(&self) -> u32 {
        if self.days == 0 {
            return 0;
        }
        (self.total / self.days) as u32
    }

    /// Compare exact means without rounding
    pub fn cmp_mean(&self, other: &WeekdayStats) -> Ordering {
        let lhs = self.total as u128 * other.days as u128;
        let rhs = other.total as u128 * self.days as u128;
        lhs.cmp(&rhs)
    }

    /// True when `self`'s exact mean exceeds `other`'s by more than `gap`
    pub fn exceeds_by(&self, other: &WeekdayStats, gap: u32) -> bool {
        if self.days == 0 || other.days == 0 {
            return false;
        }
        let lhs = self.total as i128 * other.days as i128;
        let rhs = other.total as i128 * self.days as i128;
        let scaled_gap = gap as i128 * self.days as i128 * other.days as i128;
        lhs - rhs > scaled_gap
    }
}

/// Kinds of recommendation the rules can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Average below the daily activity target
    LowActivity,
    /// Large gap between the most and least active weekday
    WeekdayConsistency,
    /// Trailing week well below the overall mean
    RecentDecline,
    /// Trailing week well above the overall mean
    RecentImprovement,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::LowActivity => "low_activity",
            RecommendationKind::WeekdayConsistency => "weekday_consistency",
            RecommendationKind::RecentDecline => "recent_decline",
            RecommendationKind::RecentImprovement => "recent_improvement",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecommendationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_activity" => Ok(RecommendationKind::LowActivity),
            "weekday_consistency" => Ok(RecommendationKind::WeekdayConsistency),
            "recent_decline" => Ok(RecommendationKind::RecentDecline),
            "recent_improvement" => Ok(RecommendationKind::RecentImprovement),
            _ => Err(format!("Unknown recommendation kind: {}", s)),
        }
    }
}

/// A recommendation produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

impl Recommendation {
    pub fn new(kind: RecommendationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
