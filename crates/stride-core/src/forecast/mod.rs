//! Step Forecaster
//!
//! Predicts daily step counts for future dates.
//!
//! # Algorithm
//!
//! - With at least `min_observations` points: ordinary least squares of steps
//!   against day offset over the most recent `training_window` points, plus
//!   the mean residual of each weekday as a seasonal adjustment.
//! - Below that (or before any training): the historical mean, repeated.
//!
//! Predictions are rounded and never negative.

pub mod forecaster;
pub mod model;

pub use forecaster::{forecast, future_dates, ForecastPoint, Forecaster};
pub use model::TrendModel;
