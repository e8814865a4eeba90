//! Duel configuration: round counts, attempt limit, points and role policy.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    constants::{DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT},
    errors::GameError,
    round::RoundOutcome,
};

/// Number of rounds in a duel. Only these lengths are offered.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RoundCount {
    Three,
    #[default]
    Five,
    Ten,
    TwentyFive,
}

impl RoundCount {
    pub const ALL: [RoundCount; 4] = [
        RoundCount::Three,
        RoundCount::Five,
        RoundCount::Ten,
        RoundCount::TwentyFive,
    ];

    pub fn get(self) -> u32 {
        match self {
            RoundCount::Three => 3,
            RoundCount::Five => 5,
            RoundCount::Ten => 10,
            RoundCount::TwentyFive => 25,
        }
    }
}

impl TryFrom<u32> for RoundCount {
    type Error = GameError;

    fn try_from(rounds: u32) -> Result<Self, Self::Error> {
        match rounds {
            3 => Ok(RoundCount::Three),
            5 => Ok(RoundCount::Five),
            10 => Ok(RoundCount::Ten),
            25 => Ok(RoundCount::TwentyFive),
            other => Err(GameError::UnsupportedRoundCount(other)),
        }
    }
}

impl From<RoundCount> for u32 {
    fn from(count: RoundCount) -> Self {
        count.get()
    }
}

impl fmt::Display for RoundCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Who chooses the word in round 1.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSetter {
    /// The player who sent the invite sets first and the invitee guesses.
    #[default]
    Inviter,
    /// The player who accepted the invite sets first.
    Invitee,
}

impl std::str::FromStr for FirstSetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inviter" => Ok(FirstSetter::Inviter),
            "invitee" => Ok(FirstSetter::Invitee),
            other => Err(format!("unknown first setter '{other}'")),
        }
    }
}

/// Points handed out when a round finishes.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundAward {
    pub guesser_points: u32,
    pub setter_points: u32,
}

/// Points curve and consolation policy.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScoringPolicy {
    /// Guesser points indexed by attempts used minus one.
    pub points_by_attempt: Vec<u32>,
    /// Points the word-setter earns when the guesser runs out of attempts.
    pub exhausted_setter_points: u32,
}

impl ScoringPolicy {
    /// Linear curve from `max_attempts` points down to 1, plus a single
    /// consolation point for the setter on an exhausted round.
    ///
    /// For six attempts the curve is `[6, 5, 4, 3, 2, 1]`.
    pub fn standard(max_attempts: usize) -> Self {
        Self {
            points_by_attempt: (1..=max_attempts as u32).rev().collect(),
            exhausted_setter_points: 1,
        }
    }

    /// Same curve, but an exhausted round is worth nothing to anyone.
    pub fn without_consolation(mut self) -> Self {
        self.exhausted_setter_points = 0;
        self
    }

    /// Points for a guesser who solved the word on attempt `attempts`.
    pub fn guesser_points(&self, attempts: usize) -> u32 {
        attempts
            .checked_sub(1)
            .and_then(|idx| self.points_by_attempt.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Award for a finished round. Unfinished outcomes award nothing.
    pub fn award(&self, outcome: RoundOutcome, attempts: usize) -> RoundAward {
        match outcome {
            RoundOutcome::Guessed => RoundAward {
                guesser_points: self.guesser_points(attempts),
                setter_points: 0,
            },
            RoundOutcome::Exhausted => RoundAward {
                guesser_points: 0,
                setter_points: self.exhausted_setter_points,
            },
            RoundOutcome::AwaitingWord | RoundOutcome::InProgress => RoundAward::default(),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::standard(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Complete rule set a session is created with.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DuelRules {
    /// Guesses allowed per round
    pub max_attempts: usize,
    /// Points curve and consolation policy
    pub scoring: ScoringPolicy,
    /// Round-1 word-setter convention
    pub first_setter: FirstSetter,
}

impl Default for DuelRules {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            scoring: ScoringPolicy::standard(DEFAULT_MAX_ATTEMPTS),
            first_setter: FirstSetter::Inviter,
        }
    }
}

impl DuelRules {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(format!(
                "Max attempts must be between 1 and {MAX_ATTEMPTS_LIMIT}"
            ));
        }

        if self.scoring.points_by_attempt.len() != self.max_attempts {
            return Err(format!(
                "Points curve has {} entries but max attempts is {}",
                self.scoring.points_by_attempt.len(),
                self.max_attempts
            ));
        }

        if self
            .scoring
            .points_by_attempt
            .windows(2)
            .any(|pair| pair[0] < pair[1])
        {
            return Err("Points curve must not reward extra attempts".to_string());
        }

        if self.scoring.points_by_attempt.last() == Some(&0) {
            return Err("A solved round must be worth at least 1 point".to_string());
        }

        Ok(())
    }
}
