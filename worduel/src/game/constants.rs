//! Fixed dimensions of a duel.

/// Letters in every target word and guess.
pub const WORD_LENGTH: usize = 5;

/// Guesses allowed per round unless the rules say otherwise.
pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

/// Upper bound for a configured attempt limit.
pub const MAX_ATTEMPTS_LIMIT: usize = 10;

/// Longest message a player may attach to an invite.
pub const MAX_INVITE_MESSAGE_CHARS: usize = 280;

/// Most word suggestions a setter may request at once.
pub const MAX_WORD_OPTIONS: usize = 10;
