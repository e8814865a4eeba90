//! A single round: one word-setter, one guesser, one hidden word.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use super::{
    PlayerId,
    constants::WORD_LENGTH,
    errors::{GameError, GameResult},
    letters::best_status,
    rules::RoundAward,
    scorer::{GuessResult, Verdict, is_solved, score},
};

/// Where a round is in its lifecycle.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    AwaitingWord,
    InProgress,
    Guessed,
    Exhausted,
}

impl RoundOutcome {
    pub fn is_finished(self) -> bool {
        matches!(self, RoundOutcome::Guessed | RoundOutcome::Exhausted)
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundOutcome::AwaitingWord => write!(f, "awaiting_word"),
            RoundOutcome::InProgress => write!(f, "in_progress"),
            RoundOutcome::Guessed => write!(f, "guessed"),
            RoundOutcome::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// The live round of a duel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundState {
    round: u32,
    word_setter: PlayerId,
    guesser: PlayerId,
    target_word: Option<String>,
    guesses: Vec<String>,
    max_attempts: usize,
    outcome: RoundOutcome,
}

impl RoundState {
    pub(crate) fn new(
        round: u32,
        word_setter: PlayerId,
        guesser: PlayerId,
        max_attempts: usize,
    ) -> Self {
        Self {
            round,
            word_setter,
            guesser,
            target_word: None,
            guesses: Vec::new(),
            max_attempts,
            outcome: RoundOutcome::AwaitingWord,
        }
    }

    /// Word-setter chooses the hidden word, opening the round for guesses.
    pub fn set_word(&mut self, actor: &str, word: &str) -> GameResult<()> {
        if actor != self.word_setter {
            return Err(GameError::NotAuthorized(actor.to_string()));
        }
        if self.outcome != RoundOutcome::AwaitingWord {
            return Err(GameError::RoundAlreadyStarted);
        }
        let word = normalize_word(word).ok_or(GameError::InvalidWord)?;

        self.target_word = Some(word);
        self.outcome = RoundOutcome::InProgress;
        Ok(())
    }

    /// Guesser submits one guess.
    ///
    /// A malformed guess is rejected without consuming an attempt.
    pub fn submit_guess(&mut self, actor: &str, guess: &str) -> GameResult<GuessResult> {
        if actor != self.guesser {
            return Err(GameError::NotAuthorized(actor.to_string()));
        }
        match self.outcome {
            RoundOutcome::AwaitingWord => return Err(GameError::WordNotSet),
            RoundOutcome::Guessed | RoundOutcome::Exhausted => {
                return Err(GameError::RoundAlreadyFinished);
            }
            RoundOutcome::InProgress => {}
        }

        let guess = normalize_guess(guess)?;
        let target = self.target_word.as_deref().ok_or(GameError::WordNotSet)?;
        let result = score(&guess, target)?;

        self.guesses.push(guess);
        if is_solved(&result) {
            self.outcome = RoundOutcome::Guessed;
        } else if self.guesses.len() >= self.max_attempts {
            self.outcome = RoundOutcome::Exhausted;
        }

        Ok(result)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn word_setter(&self) -> &str {
        &self.word_setter
    }

    pub fn guesser(&self) -> &str {
        &self.guesser
    }

    /// The hidden word, once chosen.
    pub fn target_word(&self) -> Option<&str> {
        self.target_word.as_deref()
    }

    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn outcome(&self) -> RoundOutcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    pub fn attempts_used(&self) -> usize {
        self.guesses.len()
    }

    pub fn attempts_remaining(&self) -> usize {
        self.max_attempts.saturating_sub(self.guesses.len())
    }

    /// Verdicts for every stored guess, recomputed from the target.
    pub fn scored_guesses(&self) -> Vec<GuessResult> {
        rescore(self.target_word.as_deref(), &self.guesses)
    }

    /// Keyboard hints for this round.
    pub fn letter_hints(&self) -> BTreeMap<char, Verdict> {
        best_status(self.scored_guesses())
    }

    /// Copy of the round with the hidden word removed.
    pub(crate) fn redacted(&self) -> Self {
        Self {
            target_word: None,
            ..self.clone()
        }
    }

    pub(crate) fn into_history(self, award: RoundAward, now: DateTime<Utc>) -> RoundHistory {
        RoundHistory {
            round: self.round,
            word_setter: self.word_setter,
            guesser: self.guesser,
            target_word: self.target_word.unwrap_or_default(),
            guesses: self.guesses,
            outcome: self.outcome,
            guesser_points: award.guesser_points,
            setter_points: award.setter_points,
            completed_at: now,
        }
    }
}

/// Snapshot of a finished round and the points it awarded.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundHistory {
    pub round: u32,
    pub word_setter: PlayerId,
    pub guesser: PlayerId,
    pub target_word: String,
    pub guesses: Vec<String>,
    pub outcome: RoundOutcome,
    pub guesser_points: u32,
    pub setter_points: u32,
    pub completed_at: DateTime<Utc>,
}

impl RoundHistory {
    /// Verdicts for every guess in the round, recomputed from the target.
    pub fn scored_guesses(&self) -> Vec<GuessResult> {
        rescore(Some(&self.target_word), &self.guesses)
    }

    /// Attempts the guesser used.
    pub fn attempts(&self) -> usize {
        self.guesses.len()
    }
}

fn rescore(target: Option<&str>, guesses: &[String]) -> Vec<GuessResult> {
    let Some(target) = target else {
        return Vec::new();
    };
    guesses
        .iter()
        .filter_map(|guess| score(guess, target).ok())
        .collect()
}

/// Canonical form of a target word: five ASCII letters, uppercased.
pub fn normalize_word(word: &str) -> Option<String> {
    let word = word.trim();
    if word.chars().count() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(word.to_ascii_uppercase())
    } else {
        None
    }
}

fn normalize_guess(guess: &str) -> GameResult<String> {
    let guess = guess.trim();
    let actual = guess.chars().count();
    if actual != WORD_LENGTH {
        return Err(GameError::InvalidGuessLength {
            expected: WORD_LENGTH,
            actual,
        });
    }
    if !guess.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(GameError::InvalidGuess);
    }
    Ok(guess.to_ascii_uppercase())
}
