use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use opening_trainer_core::Error;

use crate::AppState;

pub mod backup;
pub mod progress;
pub mod training;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/openings", get(training::list_openings))
        .route("/api/session", get(training::current_session))
        .route("/api/session/start", post(training::start_session))
        .route("/api/session/move", post(training::play_move))
        .route("/api/session/hint", get(training::hint))
        .route("/api/session/reset", post(training::reset_session))
        .route("/api/stats", get(progress::stats))
        .route("/api/progress/:id", get(progress::opening_progress))
        .route("/api/reviews/due", get(progress::due_reviews))
        .route("/api/achievements", get(progress::achievements))
        .route("/api/daily", get(progress::daily_challenge))
        .route("/api/backup", get(backup::export).post(backup::import))
        .route("/api/reset", post(backup::reset_progress))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "OK"
}

/// Locks a mutex, recovering the data if a handler panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Core(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Core(e) => match e {
                Error::UnsupportedBackupVersion(_) | Error::Json(_) | Error::InvalidLine { .. } => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                Error::UnknownOpening(_) => (StatusCode::NOT_FOUND, e.to_string()),
                Error::Database(_) | Error::Io(_) => {
                    tracing::error!(error = %e, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
