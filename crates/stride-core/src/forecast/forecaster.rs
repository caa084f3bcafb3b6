//! Forecaster - owns an optional fitted model and turns it into predictions

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ForecastConfig, MAX_HORIZON};
use crate::error::{Error, Result};
use crate::series::Series;

use super::model::TrendModel;

/// One predicted day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_steps: u32,
}

/// `horizon` consecutive dates following `after`
pub fn future_dates(after: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|i| {
            after.checked_add_days(Days::new(i)).ok_or_else(|| {
                Error::Validation(format!("Cannot forecast {} days past {}", horizon, after))
            })
        })
        .collect()
}

/// Train on the full history and forecast `horizon` days past its last date
pub fn forecast(
    history: &Series,
    horizon: usize,
    config: &ForecastConfig,
) -> Result<Vec<ForecastPoint>> {
    Forecaster::new(config.clone())
        .train(history)
        .forecast(history, horizon)
}

/// Step forecaster
///
/// The fitted state is a plain value: [`Forecaster::train`] returns a new
/// forecaster and leaves `self` untouched, so callers that cache one can swap
/// it atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecaster {
    config: ForecastConfig,
    model: Option<TrendModel>,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&TrendModel> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Whether `history` is long enough for training
    pub fn can_train(&self, history: &Series) -> bool {
        history.len() >= self.config.min_observations
    }

    /// Fit on the most recent `training_window` observations
    ///
    /// Histories shorter than `min_observations` leave the current model in
    /// place.
    pub fn train(&self, history: &Series) -> Self {
        if !self.can_train(history) {
            debug!(
                user = history.user_id(),
                observations = history.len(),
                required = self.config.min_observations,
                "Skipping training, not enough observations"
            );
            return self.clone();
        }

        let window = history.tail(self.config.training_window);
        match TrendModel::fit(window) {
            Ok(model) => {
                info!(
                    user = history.user_id(),
                    observations = model.observations(),
                    slope = model.slope(),
                    trained_through = %model.trained_through(),
                    "Trained step forecaster"
                );
                Self {
                    config: self.config.clone(),
                    model: Some(model),
                }
            }
            Err(e) => {
                warn!(user = history.user_id(), error = %e, "Training failed, keeping previous model");
                self.clone()
            }
        }
    }

    /// One prediction per requested date
    ///
    /// `future_dates` must be strictly increasing and after the last history
    /// date. Without a fitted model every date gets the historical mean.
    pub fn predict(&self, history: &Series, future_dates: &[NaiveDate]) -> Result<Vec<u32>> {
        if future_dates.is_empty() {
            return Ok(Vec::new());
        }

        if future_dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Validation(
                "Forecast dates must be strictly increasing".to_string(),
            ));
        }

        if let Some(anchor) = self.anchor(history) {
            if future_dates[0] <= anchor {
                return Err(Error::Validation(format!(
                    "Forecast dates must be after {}, got {}",
                    anchor, future_dates[0]
                )));
            }
        }

        if let Some(model) = &self.model {
            return Ok(future_dates.iter().map(|d| model.predict_at(*d)).collect());
        }

        match history.mean_steps() {
            Some(baseline) => {
                debug!(
                    user = history.user_id(),
                    baseline,
                    "No fitted model, predicting historical mean"
                );
                Ok(vec![baseline; future_dates.len()])
            }
            None => Err(Error::InsufficientData(format!(
                "No step history for user {} and no fitted model",
                history.user_id()
            ))),
        }
    }

    /// Predict `horizon` consecutive days after the last known date
    pub fn forecast(&self, history: &Series, horizon: usize) -> Result<Vec<ForecastPoint>> {
        if horizon == 0 || horizon > MAX_HORIZON {
            return Err(Error::Validation(format!(
                "Forecast horizon must be between 1 and {}, got {}",
                MAX_HORIZON, horizon
            )));
        }

        let last = self.anchor(history).ok_or_else(|| {
            Error::InsufficientData(format!(
                "No step history for user {} and no fitted model",
                history.user_id()
            ))
        })?;

        let dates = future_dates(last, horizon)?;
        let predictions = self.predict(history, &dates)?;

        Ok(dates
            .into_iter()
            .zip(predictions)
            .map(|(date, predicted_steps)| ForecastPoint {
                date,
                predicted_steps,
            })
            .collect())
    }

    /// Latest date known from the history or, failing that, the model
    fn anchor(&self, history: &Series) -> Option<NaiveDate> {
        let model_last = self.model.as_ref().map(|m| m.trained_through());
        match (history.last_date(), model_last) {
            (Some(h), Some(m)) => Some(h.max(m)),
            (h, m) => h.or(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepPoint;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn series_of(steps: &[u32]) -> Series {
        Series::from_points(
            "u",
            steps.iter().enumerate().map(|(i, &s)| StepPoint {
                date: start() + Duration::days(i as i64),
                steps: s,
            }),
        )
    }

    #[test]
    fn test_short_history_predicts_baseline() {
        let history = series_of(&[4000, 5000, 6001]);
        let forecaster = Forecaster::default().train(&history);
        assert!(!forecaster.is_trained());

        let dates = future_dates(history.last_date().unwrap(), 2).unwrap();
        let predictions = forecaster.predict(&history, &dates).unwrap();
        assert_eq!(predictions, vec![5000, 5000]);
    }

    #[test]
    fn test_empty_history_without_model_fails() {
        let empty = Series::empty("u");
        let err = Forecaster::default()
            .predict(&empty, &[start()])
            .unwrap_err();
        assert!(err.is_insufficient_data());

        let err = Forecaster::default().forecast(&empty, 7).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_empty_history_uses_previous_model() {
        let history = series_of(&[6000; 10]);
        let trained = Forecaster::default().train(&history);
        assert!(trained.is_trained());

        let points = trained.forecast(&Series::empty("u"), 3).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, history.last_date().unwrap() + Duration::days(1));
        assert!(points.iter().all(|p| p.predicted_steps == 6000));
    }

    #[test]
    fn test_train_below_threshold_keeps_model() {
        let trained = Forecaster::default().train(&series_of(&[8000; 14]));
        let retrained = trained.train(&series_of(&[100, 200, 300]));
        assert_eq!(retrained.model(), trained.model());
    }

    #[test]
    fn test_train_threshold_is_inclusive() {
        assert!(!Forecaster::default().train(&series_of(&[5000; 6])).is_trained());
        assert!(Forecaster::default().train(&series_of(&[5000; 7])).is_trained());
    }

    #[test]
    fn test_train_leaves_receiver_untrained() {
        let untrained = Forecaster::default();
        let _trained = untrained.train(&series_of(&[8000; 14]));
        assert!(!untrained.is_trained());
    }

    #[test]
    fn test_training_window_uses_recent_points() {
        let config = ForecastConfig {
            training_window: 7,
            ..ForecastConfig::default()
        };
        let mut steps = vec![20000; 30];
        steps.extend([3000; 7]);
        let trained = Forecaster::new(config).train(&series_of(&steps));

        let model = trained.model().unwrap();
        assert_eq!(model.observations(), 7);
        assert_eq!(model.baseline(), 3000);
    }

    #[test]
    fn test_linear_trend_extrapolates() {
        let steps: Vec<u32> = (0..28).map(|i| 4000 + 50 * i).collect();
        let history = series_of(&steps);
        let points = forecast(&history, 3, &ForecastConfig::default()).unwrap();

        let predicted: Vec<u32> = points.iter().map(|p| p.predicted_steps).collect();
        assert_eq!(predicted, vec![5400, 5450, 5500]);
    }

    #[test]
    fn test_length_and_non_negative_for_any_history() {
        for len in 1..40usize {
            let steps: Vec<u32> = (0..len as u32).map(|i| (i * 3571) % 15000).collect();
            let history = series_of(&steps);
            let forecaster = Forecaster::default().train(&history);
            for horizon in [1usize, 7, 30] {
                let dates = future_dates(history.last_date().unwrap(), horizon).unwrap();
                let predictions = forecaster.predict(&history, &dates).unwrap();
                assert_eq!(predictions.len(), horizon);
            }
        }
    }

    #[test]
    fn test_collapsing_trend_clips_to_zero() {
        let steps: Vec<u32> = (0..14).map(|i| 14000 - 1000 * i).collect();
        let points = forecast(&series_of(&steps), 30, &ForecastConfig::default()).unwrap();
        assert_eq!(points.len(), 30);
        assert_eq!(points.last().unwrap().predicted_steps, 0);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let history = series_of(&[3000, 9000, 4000, 12000, 7000, 6500, 8000, 10000, 2000]);
        let forecaster = Forecaster::default().train(&history);
        let dates = future_dates(history.last_date().unwrap(), 10).unwrap();
        assert_eq!(
            forecaster.predict(&history, &dates).unwrap(),
            forecaster.predict(&history, &dates).unwrap()
        );
    }

    #[test]
    fn test_predict_rejects_bad_dates() {
        let history = series_of(&[5000; 10]);
        let forecaster = Forecaster::default().train(&history);
        let last = history.last_date().unwrap();

        let err = forecaster
            .predict(&history, &[last + Duration::days(2), last + Duration::days(1)])
            .unwrap_err();
        assert!(err.is_validation());

        let err = forecaster.predict(&history, &[last]).unwrap_err();
        assert!(err.is_validation());

        assert!(forecaster.predict(&history, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_forecast_horizon_bounds() {
        let history = series_of(&[5000; 10]);
        let forecaster = Forecaster::default();
        assert!(forecaster.forecast(&history, 0).unwrap_err().is_validation());
        assert!(forecaster
            .forecast(&history, MAX_HORIZON + 1)
            .unwrap_err()
            .is_validation());
        assert_eq!(forecaster.forecast(&history, MAX_HORIZON).unwrap().len(), MAX_HORIZON);
    }

    #[test]
    fn test_future_dates_consecutive() {
        let dates = future_dates(start(), 3).unwrap();
        assert_eq!(
            dates,
            vec![
                start() + Duration::days(1),
                start() + Duration::days(2),
                start() + Duration::days(3)
            ]
        );
        assert!(future_dates(start(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_future_dates_past_calendar_end_rejected() {
        let near_end = NaiveDate::MAX - Duration::days(2);
        assert_eq!(future_dates(near_end, 2).unwrap().len(), 2);
        assert!(future_dates(near_end, 3).unwrap_err().is_validation());
    }
}
