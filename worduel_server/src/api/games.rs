//! Game (duel session) API handlers.
//!
//! Responses are always projected for the caller: the word of a live round
//! is only visible to the player who set it.
//!
//! # Examples
//!
//! Set the word for the current round:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/games/<id>/set-word \
//!   -H "X-Player-Id: alice" \
//!   -H "Content-Type: application/json" \
//!   -d '{"word": "crane"}'
//! ```
//!
//! Guess:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/games/<id>/guess \
//!   -H "X-Player-Id: bob" \
//!   -H "Content-Type: application/json" \
//!   -d '{"guess": "slate"}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use worduel::{
    DuelSession, GameError, GuessOutcome, RoundState, Verdict,
    game::{GuessResult, SessionStatus},
};

use super::{
    AppState,
    errors::{ApiError, ApiResult},
    invites::rejected,
    middleware::Player,
};
use crate::metrics;

/// Words offered when the client does not ask for a count
pub const DEFAULT_WORD_OPTIONS: usize = 4;

/// A session as one participant sees it
#[derive(Debug, Serialize)]
pub struct GameView {
    #[serde(flatten)]
    pub session: DuelSession,
    /// Verdicts for every guess of the live round
    pub current_guesses: Vec<GuessResult>,
    /// Best-known status per letter for the live round
    pub letter_hints: BTreeMap<char, Verdict>,
}

impl GameView {
    pub fn for_player(session: &DuelSession, viewer: &str) -> Self {
        let current_guesses = session
            .current_round_state()
            .map(RoundState::scored_guesses)
            .unwrap_or_default();
        Self {
            session: session.view_for(viewer),
            current_guesses,
            letter_hints: session.letter_hints(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WordOptionsQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WordOptionsResponse {
    pub words: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetWordRequest {
    pub word: String,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub guess: String,
}

/// Sessions the caller takes part in, newest first.
pub async fn list_games(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
) -> ApiResult<Json<Vec<GameView>>> {
    let sessions = state.manager.list_sessions(player.as_str()).await?;
    Ok(Json(
        sessions
            .iter()
            .map(|s| GameView::for_player(s, player.as_str()))
            .collect(),
    ))
}

/// Candidate words for a word-setter, `count` clamped to 1..=10.
pub async fn word_options(
    State(state): State<AppState>,
    Query(query): Query<WordOptionsQuery>,
) -> Json<WordOptionsResponse> {
    let count = query.count.unwrap_or(DEFAULT_WORD_OPTIONS);
    Json(WordOptionsResponse {
        words: state.manager.list_pending_word_options(count),
    })
}

/// Get one session. Only its participants may look at it.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a participant
/// - `404 Not Found`: no such session
pub async fn get_game(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<GameView>> {
    let session = state.manager.get_session(session_id).await?;
    if !session.is_participant(player.as_str()) {
        return Err(ApiError::from(GameError::NotAuthorized(player.0)));
    }
    Ok(Json(GameView::for_player(&session, player.as_str())))
}

/// Word-setter chooses the word for the live round.
///
/// # Errors
///
/// - `400 Bad Request`: not five letters A-Z
/// - `403 Forbidden`: caller is not this round's setter
/// - `409 Conflict`: word already set, session over, or concurrent update
pub async fn set_word(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SetWordRequest>,
) -> ApiResult<Json<RoundState>> {
    let round = state
        .manager
        .set_round_word(session_id, player.as_str(), &request.word)
        .await
        .map_err(|e| rejected("set_word", &player, e))?;
    Ok(Json(round))
}

/// Guesser submits a guess for the live round.
///
/// # Errors
///
/// - `400 Bad Request`: wrong length or non-letters; no attempt is used
/// - `403 Forbidden`: caller is not this round's guesser
/// - `409 Conflict`: no word yet, round finished, session over, or
///   concurrent update
pub async fn submit_guess(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GuessRequest>,
) -> ApiResult<Json<GuessOutcome>> {
    let outcome = state
        .manager
        .submit_guess(session_id, player.as_str(), &request.guess)
        .await
        .map_err(|e| rejected("submit_guess", &player, e))?;

    metrics::guesses_submitted_total();
    if outcome.round_complete {
        metrics::rounds_completed_total(&outcome.round.outcome().to_string());
    }
    if outcome.session.status() == SessionStatus::Completed {
        metrics::sessions_finished_total("completed");
    }

    Ok(Json(outcome.view_for(player.as_str())))
}

/// Caller abandons the session.
pub async fn forfeit(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<GameView>> {
    let session = state
        .manager
        .forfeit(session_id, player.as_str())
        .await
        .map_err(|e| rejected("forfeit", &player, e))?;

    metrics::sessions_finished_total("abandoned");
    Ok(Json(GameView::for_player(&session, player.as_str())))
}
