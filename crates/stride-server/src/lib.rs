//! Stride Web Server
//!
//! Axum-based REST API for the Stride step tracker.
//!
//! - Step history listing, manual entry and CSV upload
//! - Insights, forecasts and a combined dashboard per user
//! - Per-user forecaster cache, retrained after writes
//! - Restrictive CORS policy and security headers

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use stride_core::{Database, EngineConfig, Forecaster, Series, DEFAULT_USER_ID};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub engine: EngineConfig,
    /// Latest forecaster per user. Entries are replaced, never mutated.
    forecasters: RwLock<HashMap<String, Arc<Forecaster>>>,
    /// Held across load, train and store so a slower retrain cannot
    /// overwrite a model fitted on newer history
    training: Mutex<()>,
}

impl AppState {
    pub fn new(db: Database, engine: EngineConfig) -> Self {
        Self {
            db,
            engine,
            forecasters: RwLock::new(HashMap::new()),
            training: Mutex::new(()),
        }
    }

    fn cached(&self, user_id: &str) -> Option<Arc<Forecaster>> {
        let cache = self.forecasters.read().unwrap_or_else(|e| e.into_inner());
        cache.get(user_id).cloned()
    }

    fn store(&self, user_id: &str, forecaster: Arc<Forecaster>) {
        let mut cache = self.forecasters.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(user_id.to_string(), forecaster);
    }

    /// Forecaster for a user, training on `history` when nothing fitted is cached
    pub fn forecaster_for(&self, history: &Series) -> Arc<Forecaster> {
        let user_id = history.user_id();
        if let Some(cached) = self.cached(user_id).filter(|f| f.is_trained()) {
            return cached;
        }

        let _guard = self.training.lock().unwrap_or_else(|e| e.into_inner());
        // A retrain may have finished while we waited
        if let Some(cached) = self.cached(user_id).filter(|f| f.is_trained()) {
            return cached;
        }

        let trained = Arc::new(Forecaster::new(self.engine.forecast.clone()).train(history));
        if trained.is_trained() {
            self.store(user_id, trained.clone());
        }
        trained
    }

    /// Retrain from stored history once the user has enough observations
    ///
    /// Returns whether a model was fitted.
    pub fn retrain(&self, user_id: &str) -> stride_core::Result<bool> {
        let count = self.db.count_observations(user_id)?;
        if count < self.engine.forecast.min_observations {
            debug!(user = user_id, count, "Not enough observations to retrain");
            return Ok(false);
        }

        let _guard = self.training.lock().unwrap_or_else(|e| e.into_inner());
        let history = self.db.load_series(user_id)?;
        let current = self
            .cached(user_id)
            .unwrap_or_else(|| Arc::new(Forecaster::new(self.engine.forecast.clone())));
        let trained = Arc::new(current.train(&history));
        let fitted = trained.is_trained();
        self.store(user_id, trained);
        Ok(fitted)
    }

    /// Drop a user's cached forecaster after history was removed
    pub fn invalidate(&self, user_id: &str) {
        let mut cache = self.forecasters.write().unwrap_or_else(|e| e.into_inner());
        cache.remove(user_id);
    }
}

/// `?user_id=` query parameter shared by the per-user endpoints
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_USER_ID)
    }
}

/// Create the application router
pub fn create_router(db: Database, engine: EngineConfig, config: ServerConfig) -> Router {
    let state = Arc::new(AppState::new(db, engine));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/users", get(handlers::list_users))
        .route(
            "/steps",
            get(handlers::list_steps)
                .post(handlers::add_steps)
                .delete(handlers::clear_steps),
        )
        .route("/steps/:date", delete(handlers::delete_steps))
        .route(
            "/upload",
            post(handlers::upload_csv).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        )
        .route("/insights", get(handlers::get_insights))
        .route("/predict", get(handlers::predict))
        .route("/dashboard", get(handlers::get_dashboard));

    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server with default configuration
pub async fn serve(db: Database, engine: EngineConfig, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, engine, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    engine: EngineConfig,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(db, engine, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error response
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<stride_core::Error> for AppError {
    fn from(err: stride_core::Error) -> Self {
        use stride_core::Error;

        match err {
            Error::Validation(msg) | Error::Import(msg) => Self::bad_request(&msg),
            Error::Csv(e) => Self::bad_request(&format!("Invalid CSV: {}", e)),
            Error::InsufficientData(msg) => Self::not_found(&msg),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(other.into()),
            },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
