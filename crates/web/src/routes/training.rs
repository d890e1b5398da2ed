use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use opening_trainer_core::progress::SessionOutcome;
use opening_trainer_core::storage::MasteryBand;
use opening_trainer_core::training::{MoveAttempt, SessionTally};
use opening_trainer_core::{Color, Difficulty, ProgressLedger, SqliteStore, Square, TrainingSession};

use super::{lock, ApiError, ApiResult};
use crate::AppState;

// ============================================================================
// VIEWS
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub main_line: Vec<String>,
    pub key_ideas: Vec<String>,
    pub completed_count: u32,
    pub mastery_percent: Option<u32>,
    pub mastery: Option<MasteryBand>,
    pub due: bool,
    pub schedule: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub opening_id: String,
    pub opening_name: String,
    /// FEN piece placement.
    pub board: String,
    pub side_to_move: Color,
    pub move_index: usize,
    pub total_moves: usize,
    pub complete: bool,
    pub tally: SessionTally,
    pub history: Vec<String>,
}

impl From<&TrainingSession> for SessionView {
    fn from(session: &TrainingSession) -> Self {
        let (move_index, total_moves) = session.progress();
        Self {
            opening_id: session.opening().id.clone(),
            opening_name: session.opening().name.clone(),
            board: session.board().to_fen_placement(),
            side_to_move: session.side_to_move(),
            move_index,
            total_moves,
            complete: session.is_complete(),
            tally: session.tally(),
            history: session.history().to_vec(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub attempt: MoveAttempt,
    pub session: SessionView,
    /// Present once the move finished the line.
    pub outcome: Option<SessionOutcome>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub session: SessionView,
    /// Present when the abandoned attempt was recorded.
    pub outcome: Option<SessionOutcome>,
}

#[derive(Serialize)]
pub struct HintResponse {
    pub hint: Option<String>,
}

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub opening_id: String,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
}

fn parse_square(text: &str) -> ApiResult<Square> {
    Square::parse(text.trim()).ok_or_else(|| ApiError::BadRequest(format!("invalid square: {}", text)))
}

/// Records a session left part way through as incomplete, spending a daily
/// attempt if it was today's challenge.
fn record_abandoned(
    ledger: &mut ProgressLedger<SqliteStore>,
    opening_id: &str,
    tally: SessionTally,
) -> ApiResult<SessionOutcome> {
    let now = Utc::now();
    let outcome =
        ledger.record_session_at(opening_id, tally.moves_played, tally.correct_moves, false, now)?;

    let today = now.date_naive();
    if let Some(challenge) = ledger.daily_challenge(today)? {
        if challenge.opening_id == opening_id && !challenge.completed {
            ledger.use_daily_attempt(today)?;
        }
    }
    Ok(outcome)
}

/// Records a finished line the ledger has not seen yet. A failed write leaves
/// it pending so the next request on the session retries it.
fn settle_completion(
    ledger: &mut ProgressLedger<SqliteStore>,
    session: &mut TrainingSession,
) -> ApiResult<Option<SessionOutcome>> {
    let Some(tally) = session.unrecorded_completion() else {
        return Ok(None);
    };
    let outcome =
        ledger.record_session(&session.opening().id, tally.moves_played, tally.correct_moves, true)?;
    session.mark_recorded();
    Ok(Some(outcome))
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn list_openings(State(state): State<Arc<AppState>>) -> Json<Vec<OpeningSummary>> {
    let ledger = lock(&state.ledger);
    let now = Utc::now();
    let progress = ledger.all_opening_progress();

    let openings = ledger
        .repertoire()
        .iter()
        .map(|opening| {
            let record = progress.get(&opening.id);
            let card = ledger.review_card(&opening.id);
            OpeningSummary {
                id: opening.id.clone(),
                name: opening.name.clone(),
                description: opening.description.clone(),
                difficulty: opening.difficulty,
                main_line: opening.main_line.clone(),
                key_ideas: opening.key_ideas.clone(),
                completed_count: record.map(|p| p.completed_count).unwrap_or(0),
                mastery_percent: record.map(|p| p.average_accuracy),
                mastery: record.map(|p| p.mastery_band()),
                due: card.as_ref().map(|c| c.is_due(now)).unwrap_or(false),
                schedule: card.map(|c| c.schedule_text(now)),
            }
        })
        .collect();

    Json(openings)
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> ApiResult<Json<SessionView>> {
    let mut session = lock(&state.session);
    let mut ledger = lock(&state.ledger);

    let opening = ledger
        .repertoire()
        .get(&req.opening_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("unknown opening: {}", req.opening_id)))?;

    if let Some(previous) = session.as_mut() {
        settle_completion(&mut ledger, previous)?;
        if let Some(tally) = previous.reset() {
            let id = previous.opening().id.clone();
            record_abandoned(&mut ledger, &id, tally)?;
        }
    }

    tracing::debug!(opening = %opening.id, "session started");
    let started = TrainingSession::new(opening);
    let view = SessionView::from(&started);
    *session = Some(started);
    Ok(Json(view))
}

pub async fn current_session(State(state): State<Arc<AppState>>) -> ApiResult<Json<SessionView>> {
    let session = lock(&state.session);
    session
        .as_ref()
        .map(|s| Json(SessionView::from(s)))
        .ok_or_else(|| ApiError::NotFound("no active session".to_string()))
}

pub async fn hint(State(state): State<Arc<AppState>>) -> ApiResult<Json<HintResponse>> {
    let session = lock(&state.session);
    let session = session
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("no active session".to_string()))?;
    Ok(Json(HintResponse { hint: session.hint() }))
}

pub async fn play_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<MoveResponse>> {
    let from = parse_square(&req.from)?;
    let to = parse_square(&req.to)?;

    let mut session = lock(&state.session);
    let session = session
        .as_mut()
        .ok_or_else(|| ApiError::NotFound("no active session".to_string()))?;

    let Some(attempt) = session.play_click(from, to) else {
        settle_completion(&mut lock(&state.ledger), session)?;
        return Err(ApiError::Conflict("line already complete".to_string()));
    };

    let outcome = if attempt.correct && session.is_complete() {
        settle_completion(&mut lock(&state.ledger), session)?
    } else {
        None
    };

    Ok(Json(MoveResponse {
        attempt,
        session: SessionView::from(&*session),
        outcome,
    }))
}

pub async fn reset_session(State(state): State<Arc<AppState>>) -> ApiResult<Json<ResetResponse>> {
    let mut session = lock(&state.session);
    let session = session
        .as_mut()
        .ok_or_else(|| ApiError::NotFound("no active session".to_string()))?;

    let mut ledger = lock(&state.ledger);
    let completed = settle_completion(&mut ledger, session)?;
    let outcome = match session.reset() {
        Some(tally) => {
            let id = session.opening().id.clone();
            Some(record_abandoned(&mut ledger, &id, tally)?)
        }
        None => completed,
    };

    Ok(Json(ResetResponse {
        session: SessionView::from(&*session),
        outcome,
    }))
}
