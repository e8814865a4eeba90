//! # Worduel
//!
//! A two-player, multi-round word-guessing duel engine.
//!
//! Players take turns: in each round one of them (the word-setter) picks a
//! hidden five-letter word and the other (the guesser) has a limited number
//! of attempts to find it. Each guess is scored letter by letter as
//! `correct`, `present` or `absent`. Points go to the guesser for solving
//! early, the roles swap, and after a fixed number of rounds the player with
//! more points wins.
//!
//! ## Architecture
//!
//! The engine is a set of pure state machines. Every transition validates
//! the command first and either applies completely or returns an error,
//! leaving state untouched:
//!
//! - **Invite**: pending → accepted / declined / expired
//! - **Round**: awaiting_word → in_progress → guessed / exhausted
//! - **Session**: waiting → in_progress → completed / abandoned
//!
//! The [`duel::DuelManager`] service loads aggregates from a repository,
//! applies a transition and writes them back with an optimistic version
//! check, so concurrent commands on one session cannot both win.
//!
//! ## Core Modules
//!
//! - [`game`]: scorer, letter tracker, round and session state machines
//! - [`invite`]: invite lifecycle and session creation
//! - [`words`]: candidate target words for setters
//! - [`db`]: in-memory and PostgreSQL storage
//! - [`duel`]: the async service over engine + storage
//! - [`stats`]: player statistics and leaderboard
//!
//! ## Example
//!
//! ```
//! use worduel::game::{score, Verdict};
//!
//! let result = score("ERASE", "SPEED").unwrap();
//! assert_eq!(result[0].verdict, Verdict::Present);
//! assert_eq!(result[1].verdict, Verdict::Absent);
//! ```

/// Core engine: scoring, rounds and the session state machine.
pub mod game;
pub use game::{
    DuelRules, DuelSession, GameError, GameResult, PlayerId, RoundCount, RoundState, Verdict,
    constants,
};

/// Invite lifecycle.
pub mod invite;
pub use invite::{Invite, InviteLedger, InviteResponse, InviteStatus};

/// Word suggestions.
pub mod words;

/// Storage backends.
pub mod db;

/// Persistence-backed duel service.
pub mod duel;
pub use duel::{DuelError, DuelManager, DuelResult, GuessOutcome};

/// Derived player statistics.
pub mod stats;
pub use stats::{LeaderboardEntry, PlayerStats};
