//! Dashboard view: history, insights and the upcoming forecast in one payload

use serde::Serialize;

use crate::error::Result;
use crate::forecast::{ForecastPoint, Forecaster};
use crate::insights::{InsightGenerator, Insights};
use crate::models::StepPoint;
use crate::series::Series;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user_id: String,
    pub has_data: bool,
    pub history: Vec<StepPoint>,
    pub insights: Option<Insights>,
    pub forecast: Vec<ForecastPoint>,
}

/// Assemble the dashboard for a series
///
/// An empty series yields `has_data: false` rather than an error.
pub fn build_dashboard(
    series: &Series,
    generator: &InsightGenerator,
    forecaster: &Forecaster,
    horizon: usize,
) -> Result<Dashboard> {
    if series.is_empty() {
        return Ok(Dashboard {
            user_id: series.user_id().to_string(),
            has_data: false,
            history: Vec::new(),
            insights: None,
            forecast: Vec::new(),
        });
    }

    let insights = generator.generate(series)?;
    let forecast = forecaster.forecast(series, horizon)?;

    Ok(Dashboard {
        user_id: series.user_id().to_string(),
        has_data: true,
        history: series.points().to_vec(),
        insights: Some(insights),
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_empty_dashboard() {
        let dashboard = build_dashboard(
            &Series::empty("u"),
            &InsightGenerator::default(),
            &Forecaster::default(),
            7,
        )
        .unwrap();
        assert!(!dashboard.has_data);
        assert!(dashboard.insights.is_none());
        assert!(dashboard.forecast.is_empty());
    }

    #[test]
    fn test_dashboard_with_data() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let series = Series::from_points(
            "u",
            (0..10).map(|i| StepPoint {
                date: start + Duration::days(i),
                steps: 9000,
            }),
        );
        let forecaster = Forecaster::default().train(&series);

        let dashboard =
            build_dashboard(&series, &InsightGenerator::default(), &forecaster, 7).unwrap();
        assert!(dashboard.has_data);
        assert_eq!(dashboard.history.len(), 10);
        assert_eq!(dashboard.forecast.len(), 7);
        assert_eq!(dashboard.insights.unwrap().avg_steps, 9000);
    }
}
