//! Duel service error types.

use thiserror::Error;

use crate::{game::GameError, game::SessionId, invite::InviteId};

/// Errors returned by the duel service and its repositories
#[derive(Debug, Error)]
pub enum DuelError {
    /// The engine rejected the command
    #[error(transparent)]
    Game(#[from] GameError),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Invite not found
    #[error("Invite not found: {0}")]
    InviteNotFound(InviteId),

    /// Rules failed validation when the service was built
    #[error("Invalid duel rules: {0}")]
    InvalidRules(String),

    /// Record changed since it was read; reload and retry
    #[error("Record was modified concurrently, reload and retry")]
    ConcurrentModification,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DuelError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage errors are sanitized so SQL and document layouts stay internal.
    pub fn client_message(&self) -> String {
        match self {
            DuelError::Database(_) | DuelError::Serialization(_) | DuelError::InvalidRules(_) => {
                "Internal server error".to_string()
            }
            DuelError::SessionNotFound(_) => "Game not found".to_string(),
            DuelError::InviteNotFound(_) => "Invite not found".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the caller should reload state and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DuelError::ConcurrentModification)
    }
}

/// Result type for duel service operations
pub type DuelResult<T> = Result<T, DuelError>;
