//! Step history handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, UserQuery};
use stride_core::{
    parse_date, validate, RawObservation, RawSteps, StepPoint, UpsertOutcome, DEFAULT_USER_ID,
};

/// Request body for a manual entry
#[derive(Debug, Deserialize)]
pub struct AddStepsRequest {
    pub date: String,
    /// Integer, integer-valued float, or numeric string
    pub steps: RawSteps,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddStepsResponse {
    pub user_id: String,
    pub date: String,
    pub steps: u32,
    pub outcome: UpsertOutcome,
    pub total_days: usize,
    pub model_trained: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub user_id: String,
    pub deleted: usize,
}

/// GET /api/steps - All stored (date, steps) for a user, ascending
pub async fn list_steps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<StepPoint>>, AppError> {
    let points = state.db.list_steps(params.user_id())?;
    Ok(Json(points))
}

/// GET /api/users - Users with stored data
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.db.list_users()?))
}

/// POST /api/steps - Add or replace one day's steps
pub async fn add_steps(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddStepsRequest>,
) -> Result<Json<AddStepsResponse>, AppError> {
    let user_id = req
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_USER_ID)
        .to_string();

    let obs = validate(&RawObservation::new(req.date, req.steps, user_id.as_str()))?;
    let outcome = state.db.upsert_steps(&obs)?;
    let model_trained = state.retrain(&user_id)?;
    let total_days = state.db.count_observations(&user_id)?;

    info!(user = %user_id, date = %obs.date, steps = obs.steps, ?outcome, "Manual entry");

    Ok(Json(AddStepsResponse {
        user_id,
        date: obs.date.format("%Y-%m-%d").to_string(),
        steps: obs.steps,
        outcome,
        total_days,
        model_trained,
    }))
}

/// DELETE /api/steps/:date - Remove one day's entry
pub async fn delete_steps(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
    Query(params): Query<UserQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let user_id = params.user_id();
    let date = parse_date(&date)?;

    if !state.db.delete_observation(user_id, date)? {
        return Err(AppError::not_found(&format!(
            "No entry for {} on {}",
            user_id, date
        )));
    }

    state.invalidate(user_id);
    state.retrain(user_id)?;

    Ok(Json(DeleteResponse {
        user_id: user_id.to_string(),
        deleted: 1,
    }))
}

/// DELETE /api/steps - Remove a user's whole history
pub async fn clear_steps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let user_id = params.user_id();
    let deleted = state.db.clear_user(user_id)?;
    state.invalidate(user_id);

    Ok(Json(DeleteResponse {
        user_id: user_id.to_string(),
        deleted,
    }))
}
