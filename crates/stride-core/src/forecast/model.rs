//! Trend model: least-squares line over day offsets plus weekday adjustment

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::StepPoint;

/// A fitted trend model
///
/// Fits `steps = intercept + slope * t` where `t` is days since the first
/// training date, then stores the mean residual of each weekday. Dates are
/// used directly so gaps in the history are handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    origin: NaiveDate,
    trained_through: NaiveDate,
    intercept: f64,
    slope: f64,
    /// Mean residual per weekday, indexed from Monday
    weekday_offsets: [f64; 7],
    observations: usize,
    baseline: u32,
}

impl TrendModel {
    /// Fit on points sorted ascending by date (at least two)
    pub fn fit(points: &[StepPoint]) -> Result<Self> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) if points.len() >= 2 => (first, last),
            _ => {
                return Err(Error::InsufficientData(format!(
                    "Trend fit needs at least 2 observations, got {}",
                    points.len()
                )))
            }
        };

        let origin = first.date;
        let xs: Vec<f64> = points
            .iter()
            .map(|p| (p.date - origin).num_days() as f64)
            .collect();
        let ys: Vec<f64> = points.iter().map(|p| p.steps as f64).collect();

        let n = points.len() as f64;
        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
        let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() < 1e-10 {
            return Err(Error::InsufficientData(
                "Trend fit needs observations on distinct dates".to_string(),
            ));
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;

        let mut residual_sums = [0.0f64; 7];
        let mut residual_counts = [0u32; 7];
        for (p, (x, y)) in points.iter().zip(xs.iter().zip(&ys)) {
            let idx = p.date.weekday().num_days_from_monday() as usize;
            residual_sums[idx] += y - (intercept + slope * x);
            residual_counts[idx] += 1;
        }

        let mut weekday_offsets = [0.0f64; 7];
        for (idx, offset) in weekday_offsets.iter_mut().enumerate() {
            if residual_counts[idx] > 0 {
                *offset = residual_sums[idx] / residual_counts[idx] as f64;
            }
        }

        let total: u64 = points.iter().map(|p| p.steps as u64).sum();

        Ok(Self {
            origin,
            trained_through: last.date,
            intercept,
            slope,
            weekday_offsets,
            observations: points.len(),
            baseline: (total / points.len() as u64) as u32,
        })
    }

    /// Predicted steps for a date, rounded and clipped at zero
    pub fn predict_at(&self, date: NaiveDate) -> u32 {
        let t = (date - self.origin).num_days() as f64;
        let idx = date.weekday().num_days_from_monday() as usize;
        let value = self.intercept + self.slope * t + self.weekday_offsets[idx];

        if !value.is_finite() {
            return self.baseline;
        }
        value.round().clamp(0.0, u32::MAX as f64) as u32
    }

    /// Change in steps per day
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Mean residual for each weekday, Monday first
    pub fn weekday_offsets(&self) -> &[f64; 7] {
        &self.weekday_offsets
    }

    /// Last date included in training
    pub fn trained_through(&self) -> NaiveDate {
        self.trained_through
    }

    /// Number of observations used in fitting
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Integer-truncated mean of the training window
    pub fn baseline(&self) -> u32 {
        self.baseline
    }
}
