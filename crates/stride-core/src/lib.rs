//! Stride Core Library
//!
//! Shared functionality for the Stride step tracker:
//! - Series builder: validation and de-duplication of daily step rows
//! - Insight generator: descriptive statistics and recommendations
//! - Forecaster: trend plus weekday model for upcoming days
//! - Database access and migrations
//! - CSV import and engine configuration

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod insights;
pub mod models;
pub mod series;

pub use config::{EngineConfig, ForecastConfig, InsightConfig, MIN_OBSERVATIONS};
pub use dashboard::{build_dashboard, Dashboard};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{forecast, future_dates, ForecastPoint, Forecaster, TrendModel};
pub use import::{parse_csv, read_csv_rows};
pub use insights::{generate_insights, InsightGenerator, Insights, Recommendation};
pub use models::{
    ImportStats, Observation, RawObservation, RawSteps, StepPoint, UpsertOutcome, DEFAULT_USER_ID,
};
pub use series::{parse_date, parse_steps, validate, Series, SeriesBuilder};
