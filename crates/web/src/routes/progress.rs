use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use opening_trainer_core::progress::{level_from_total_xp, level_title, Achievement, DailyChallenge, LevelInfo};
use opening_trainer_core::review::ReviewCard;
use opening_trainer_core::storage::{OpeningProgress, UserStats};

use super::{lock, ApiError, ApiResult};
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: UserStats,
    pub level: LevelInfo,
    pub title: &'static str,
    pub overall_accuracy: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningProgressResponse {
    pub opening_id: String,
    pub progress: Option<OpeningProgress>,
    pub review_card: Option<ReviewCard>,
    pub schedule: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReview {
    pub opening_id: String,
    pub name: String,
    pub schedule: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponse {
    pub challenge: DailyChallenge,
    pub opening_name: Option<String>,
    pub available: bool,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let ledger = lock(&state.ledger);
    let stats = ledger.user_stats();
    let level = level_from_total_xp(stats.total_xp);

    Json(StatsResponse {
        overall_accuracy: stats.overall_accuracy(),
        title: level_title(level.level),
        level,
        stats,
    })
}

pub async fn opening_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OpeningProgressResponse>> {
    let ledger = lock(&state.ledger);
    if ledger.repertoire().get(&id).is_none() {
        return Err(ApiError::NotFound(format!("unknown opening: {}", id)));
    }

    let review_card = ledger.review_card(&id);
    Ok(Json(OpeningProgressResponse {
        progress: ledger.opening_progress(&id),
        schedule: review_card.as_ref().map(|card| card.schedule_text(Utc::now())),
        review_card,
        opening_id: id,
    }))
}

pub async fn due_reviews(State(state): State<Arc<AppState>>) -> Json<Vec<DueReview>> {
    let ledger = lock(&state.ledger);
    let now = Utc::now();

    let due = ledger
        .due_openings(now)
        .into_iter()
        .filter_map(|id| {
            let opening = ledger.repertoire().get(&id)?;
            let card = ledger.review_card(&id)?;
            Some(DueReview {
                name: opening.name.clone(),
                schedule: card.schedule_text(now),
                opening_id: id,
            })
        })
        .collect();

    Json(due)
}

pub async fn achievements(State(state): State<Arc<AppState>>) -> Json<Vec<Achievement>> {
    let ledger = lock(&state.ledger);
    Json(ledger.achievement_status(Utc::now()))
}

pub async fn daily_challenge(State(state): State<Arc<AppState>>) -> ApiResult<Json<DailyResponse>> {
    let mut ledger = lock(&state.ledger);
    let challenge = ledger
        .daily_challenge(Utc::now().date_naive())?
        .ok_or_else(|| ApiError::NotFound("no openings available".to_string()))?;

    let opening_name = challenge
        .challenge_opening(ledger.repertoire())
        .map(|opening| opening.name.clone());

    Ok(Json(DailyResponse {
        available: challenge.is_available(),
        opening_name,
        challenge,
    }))
}
