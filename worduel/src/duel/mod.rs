//! Duel service: persistence-backed operations over the engine.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{DuelError, DuelResult};
pub use manager::DuelManager;
pub use models::GuessOutcome;
