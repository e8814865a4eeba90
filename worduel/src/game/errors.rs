//! Engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PlayerId;
use crate::invite::InviteStatus;

/// Rejections produced by the duel engine.
///
/// Every variant is returned before any state is touched, so a rejected
/// command leaves the session or invite exactly as it was.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("guess must be exactly {expected} letters, got {actual}")]
    InvalidGuessLength { expected: usize, actual: usize },
    #[error("guess must contain only letters")]
    InvalidGuess,
    #[error("word must be exactly 5 letters A-Z")]
    InvalidWord,
    #[error("{0} is not allowed to do that")]
    NotAuthorized(PlayerId),
    #[error("round already finished")]
    RoundAlreadyFinished,
    #[error("round word already chosen")]
    RoundAlreadyStarted,
    #[error("waiting for the word-setter to choose a word")]
    WordNotSet,
    #[error("invite already {0}")]
    InviteAlreadyResolved(InviteStatus),
    #[error("session is no longer active")]
    SessionNotActive,
    #[error("can't invite yourself")]
    SelfInvite,
    #[error("invite message longer than {max} characters")]
    MessageTooLong { max: usize },
    #[error("unsupported round count {0}, expected one of 3, 5, 10, 25")]
    UnsupportedRoundCount(u32),
}

/// Result type for engine transitions
pub type GameResult<T> = Result<T, GameError>;
