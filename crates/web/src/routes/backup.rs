use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use opening_trainer_core::storage::{backup_file_name, ImportSummary};

use super::{lock, ApiResult};
use crate::AppState;

/// Current progress as a downloadable backup file.
pub async fn export(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ledger = lock(&state.ledger);
    let now = Utc::now();
    let data = ledger.export_backup(now);
    let disposition = format!("attachment; filename=\"{}\"", backup_file_name(now.date_naive()));

    ([(header::CONTENT_DISPOSITION, disposition)], Json(data))
}

/// Restores a backup sent as the raw request body.
pub async fn import(State(state): State<Arc<AppState>>, body: String) -> ApiResult<Json<ImportSummary>> {
    let mut ledger = lock(&state.ledger);
    let summary = ledger.import_backup(&body)?;
    Ok(Json(summary))
}

pub async fn reset_progress(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    let mut session = lock(&state.session);
    let mut ledger = lock(&state.ledger);
    ledger.reset_all()?;
    *session = None;
    Ok(StatusCode::NO_CONTENT)
}
