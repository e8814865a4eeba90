//! Service-level result types.

use serde::Serialize;

use crate::game::{DuelSession, GuessResult, RoundState};

/// Everything a guess changed, returned by [`super::DuelManager::submit_guess`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuessOutcome {
    /// The round the guess was applied to; the finished round when it completed
    pub round: RoundState,
    /// Verdicts for the submitted guess
    pub result: GuessResult,
    /// Whether this guess finished the round
    pub round_complete: bool,
    /// Session as stored after the guess
    pub session: DuelSession,
}

impl GuessOutcome {
    /// Projection for `viewer` that keeps a live round's word hidden.
    pub fn view_for(&self, viewer: &str) -> GuessOutcome {
        let round = if self.round_complete || self.round.word_setter() == viewer {
            self.round.clone()
        } else {
            self.round.redacted()
        };
        GuessOutcome {
            round,
            result: self.result,
            round_complete: self.round_complete,
            session: self.session.view_for(viewer),
        }
    }
}
