//! Duel engine - scoring, rounds and the session state machine.
//!
//! Everything here is synchronous and deterministic: a transition either
//! applies completely or returns a [`GameError`] and leaves its input as it
//! was. Persistence, identity and transport live outside this module.
//!
//! - [`scorer`]: per-letter verdicts for a guess
//! - [`letters`]: best-known status per letter, recomputed on demand
//! - [`round`]: one setter/guesser round
//! - [`session`]: the multi-round duel aggregate
//! - [`rules`]: round counts, points curve and role policy

pub mod constants;
pub mod errors;
pub mod letters;
pub mod round;
pub mod rules;
pub mod scorer;
pub mod session;

/// Opaque participant identifier supplied by the identity collaborator.
pub type PlayerId = String;

pub use errors::{GameError, GameResult};
pub use letters::best_status;
pub use round::{RoundHistory, RoundOutcome, RoundState, normalize_word};
pub use rules::{DuelRules, FirstSetter, RoundAward, RoundCount, ScoringPolicy};
pub use scorer::{GuessResult, LetterResult, Verdict, is_solved, score};
pub use session::{DuelSession, GuessReport, MatchOutcome, SessionId, SessionStatus};
