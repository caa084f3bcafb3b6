//! Insight, forecast and dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, UserQuery};
use stride_core::{build_dashboard, Dashboard, ForecastPoint, InsightGenerator, Insights};

/// Query parameters for forecasts
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub user_id: Option<String>,
    /// Days to predict (defaults to the configured horizon)
    pub days: Option<usize>,
}

/// GET /api/insights - Statistics and recommendations for a user
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Insights>, AppError> {
    let series = state.db.load_series(params.user_id())?;
    if series.is_empty() {
        return Err(AppError::not_found("No data available"));
    }

    let insights = InsightGenerator::new(state.engine.insights.clone()).generate(&series)?;
    Ok(Json(insights))
}

/// GET /api/predict?days=N - Forecast the days after the last stored date
///
/// Users below the training threshold get their historical mean.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictQuery>,
) -> Result<Json<Vec<ForecastPoint>>, AppError> {
    let user = UserQuery {
        user_id: params.user_id,
    };
    let series = state.db.load_series(user.user_id())?;
    if series.is_empty() {
        return Err(AppError::not_found("Not enough data for prediction"));
    }

    let days = params.days.unwrap_or(state.engine.forecast.horizon);
    let forecaster = state.forecaster_for(&series);
    let points = forecaster.forecast(&series, days)?;

    Ok(Json(points))
}

/// GET /api/dashboard - History, insights and forecast in one response
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let series = state.db.load_series(params.user_id())?;
    let forecaster = state.forecaster_for(&series);
    let generator = InsightGenerator::new(state.engine.insights.clone());

    let dashboard = build_dashboard(
        &series,
        &generator,
        &forecaster,
        state.engine.forecast.horizon,
    )?;
    Ok(Json(dashboard))
}
