//! Invite API handlers.
//!
//! All endpoints act on behalf of the player in `X-Player-Id`.
//!
//! # Examples
//!
//! Challenge a friend to three rounds:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/invites \
//!   -H "X-Player-Id: alice" \
//!   -H "Content-Type: application/json" \
//!   -d '{"receiver_id": "bob", "total_rounds": 3, "message": "rematch?"}'
//! ```
//!
//! Accept it:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/invites/<id>/respond \
//!   -H "X-Player-Id: bob" \
//!   -H "Content-Type: application/json" \
//!   -d '{"accept": true}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use worduel::{Invite, InviteResponse, invite::InviteLists};
use uuid::Uuid;

use super::{
    AppState,
    errors::{ApiError, ApiResult},
    games::GameView,
    middleware::Player,
};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub receiver_id: String,
    pub message: Option<String>,
    /// One of 3, 5, 10, 25; defaults to 5
    pub total_rounds: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub invite: Invite,
    /// The new game, present when the invite was accepted
    pub game: Option<GameView>,
}

/// Send an invite.
///
/// # Response
///
/// Returns `201 Created` with the pending invite.
///
/// # Errors
///
/// - `400 Bad Request`: self-invite, unsupported round count, message too long
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
    Json(request): Json<CreateInviteRequest>,
) -> ApiResult<(StatusCode, Json<Invite>)> {
    let invite = state
        .manager
        .create_invite(
            player.as_str(),
            request.receiver_id.trim(),
            request.message,
            request.total_rounds,
        )
        .await
        .map_err(|e| rejected("create_invite", &player, e))?;

    metrics::invites_created_total();
    Ok((StatusCode::CREATED, Json(invite)))
}

/// Invites the caller sent and received, newest first.
pub async fn list_my_invites(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
) -> ApiResult<Json<InviteLists>> {
    Ok(Json(state.manager.list_invites(player.as_str()).await?))
}

/// Accept or decline an invite addressed to the caller.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the receiver
/// - `404 Not Found`: no such invite
/// - `409 Conflict`: invite already resolved, or answered concurrently
pub async fn respond_to_invite(
    State(state): State<AppState>,
    Extension(player): Extension<Player>,
    Path(invite_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> ApiResult<Json<RespondResponse>> {
    let response = state
        .manager
        .resolve_invite(invite_id, request.accept, player.as_str())
        .await
        .map_err(|e| rejected("respond_to_invite", &player, e))?;

    metrics::invites_resolved_total(&response.invite().status.to_string());

    let body = match response {
        InviteResponse::Declined(invite) => RespondResponse { invite, game: None },
        InviteResponse::Accepted { invite, session } => RespondResponse {
            invite,
            game: Some(GameView::for_player(&session, player.as_str())),
        },
    };
    Ok(Json(body))
}

/// Log a rejected command and convert it for the response
pub(super) fn rejected(operation: &str, player: &Player, err: worduel::DuelError) -> ApiError {
    let err = ApiError(err);
    logging::log_rejected_command(
        operation,
        player.as_str(),
        err.status().as_u16(),
        &err.0.to_string(),
    );
    err
}
