//! Mapping of service errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use worduel::{DuelError, GameError};

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Internal error text carried on a 5xx response so the request ID
/// middleware can log it next to the request ID. Never serialized.
#[derive(Clone, Debug)]
pub struct ServerErrorDetail(pub String);

/// Handler error: a service error rendered with a client-safe message
#[derive(Debug)]
pub struct ApiError(pub DuelError);

impl<E> From<E> for ApiError
where
    E: Into<DuelError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DuelError::SessionNotFound(_) | DuelError::InviteNotFound(_) => StatusCode::NOT_FOUND,
            DuelError::ConcurrentModification => StatusCode::CONFLICT,
            DuelError::Database(_)
            | DuelError::Serialization(_)
            | DuelError::InvalidRules(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DuelError::Game(err) => match err {
                GameError::NotAuthorized(_) => StatusCode::FORBIDDEN,
                GameError::InviteAlreadyResolved(_)
                | GameError::RoundAlreadyFinished
                | GameError::RoundAlreadyStarted
                | GameError::WordNotSet
                | GameError::SessionNotActive => StatusCode::CONFLICT,
                GameError::InvalidGuessLength { .. }
                | GameError::InvalidGuess
                | GameError::InvalidWord
                | GameError::SelfInvite
                | GameError::MessageTooLong { .. }
                | GameError::UnsupportedRoundCount(_) => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match &self.0 {
            DuelError::SessionNotFound(_) => "session_not_found",
            DuelError::InviteNotFound(_) => "invite_not_found",
            DuelError::ConcurrentModification => "concurrent_modification",
            DuelError::Database(_) | DuelError::Serialization(_) | DuelError::InvalidRules(_) => {
                "internal"
            }
            DuelError::Game(err) => match err {
                GameError::InvalidGuessLength { .. } => "invalid_guess_length",
                GameError::InvalidGuess => "invalid_guess",
                GameError::InvalidWord => "invalid_word",
                GameError::NotAuthorized(_) => "not_authorized",
                GameError::RoundAlreadyFinished => "round_already_finished",
                GameError::RoundAlreadyStarted => "round_already_started",
                GameError::WordNotSet => "word_not_set",
                GameError::InviteAlreadyResolved(_) => "invite_already_resolved",
                GameError::SessionNotActive => "session_not_active",
                GameError::SelfInvite => "self_invite",
                GameError::MessageTooLong { .. } => "message_too_long",
                GameError::UnsupportedRoundCount(_) => "unsupported_round_count",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.0.client_message(),
            code: self.code().to_string(),
        };

        let mut response = (status, Json(body)).into_response();
        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(ServerErrorDetail(self.0.to_string()));
        }
        response
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
