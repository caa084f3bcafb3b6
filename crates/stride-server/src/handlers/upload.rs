//! CSV upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use stride_core::{parse_csv, DEFAULT_USER_ID};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub user_id: String,
    pub inserted: usize,
    pub updated: usize,
    pub total_days: usize,
    pub model_trained: bool,
}

/// POST /api/upload - Import a step CSV
///
/// Expects multipart form with:
/// - file: CSV file with `date` and `steps` columns (required, max 10MB)
/// - user_id: owner of the rows (optional, defaults to `default_user`)
///
/// A file with any invalid row is rejected without storing anything.
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let is_csv = field
                    .file_name()
                    .map(|f| f.to_ascii_lowercase().ends_with(".csv"))
                    .unwrap_or(false);
                if !is_csv {
                    return Err(AppError::bad_request(
                        "Invalid file type. Please upload a CSV file.",
                    ));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "user_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read user_id"))?;
                let value = value.trim();
                if !value.is_empty() {
                    user_id = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let user_id = user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string());

    let observations = parse_csv(file_data.as_slice(), &user_id)?;
    let stats = state.db.upsert_observations(&observations)?;
    let model_trained = state.retrain(&user_id)?;
    let total_days = state.db.count_observations(&user_id)?;

    info!(
        user = %user_id,
        inserted = stats.inserted,
        updated = stats.updated,
        model_trained,
        "CSV upload processed"
    );

    Ok(Json(UploadResponse {
        user_id,
        inserted: stats.inserted,
        updated: stats.updated,
        total_days,
        model_trained,
    }))
}
