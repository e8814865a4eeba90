//! Identity middleware for player endpoints.
//!
//! Authentication is delegated to whatever sits in front of this server:
//! the caller's player id arrives in the `X-Player-Id` header and is trusted
//! as-is. The middleware only checks that it is present and well formed,
//! then injects it into request extensions for downstream handlers.
//!
//! # Extracting the Player
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use worduel_server::api::middleware::Player;
//!
//! async fn handler(Extension(player): Extension<Player>) -> String {
//!     format!("Playing as {}", player.as_str())
//! }
//! # let _ = handler;
//! ```

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::errors::ErrorResponse;

/// Header carrying the caller's player id
pub const PLAYER_ID_HEADER: &str = "x-player-id";

/// Longest accepted player id
pub const MAX_PLAYER_ID_LEN: usize = 64;

/// Authenticated caller, as injected by [`identity_middleware`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player(pub String);

impl Player {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate a raw header value into a player id
fn parse_player_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_PLAYER_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    valid.then(|| id.to_string())
}

/// Reject requests without a usable `X-Player-Id` and inject [`Player`].
///
/// # Behavior
///
/// - **Success**: header valid → injects `Player` → calls next handler
/// - **Missing or malformed header**: returns `401 Unauthorized`
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let player = request
        .headers()
        .get(PLAYER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_player_id);

    match player {
        Some(id) => {
            request.extensions_mut().insert(Player(id));
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Missing or invalid X-Player-Id header".to_string(),
                code: "unauthenticated".to_string(),
            }),
        )
            .into_response(),
    }
}
