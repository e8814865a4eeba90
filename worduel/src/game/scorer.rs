//! Per-letter scoring of a guess against a target word.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    constants::WORD_LENGTH,
    errors::{GameError, GameResult},
};

/// Outcome of comparing one guessed letter with the target.
///
/// Variants are declared in ascending precedence so `Ord` gives
/// `Absent < Present < Correct`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Absent,
    Present,
    Correct,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Absent => write!(f, "absent"),
            Verdict::Present => write!(f, "present"),
            Verdict::Correct => write!(f, "correct"),
        }
    }
}

/// A guessed letter paired with its verdict.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LetterResult {
    pub letter: char,
    pub verdict: Verdict,
}

/// Verdicts for a full guess, one per position.
pub type GuessResult = [LetterResult; WORD_LENGTH];

/// Score `guess` against `target`.
///
/// Both words are uppercased first. Exact matches are claimed before
/// displaced ones, and displaced matches claim target letters left to right,
/// so a repeated guess letter is only `Present` as many times as the target
/// has unclaimed copies of it.
///
/// # Errors
///
/// Returns [`GameError::InvalidGuessLength`] if either word is not exactly
/// five characters long.
///
/// # Examples
///
/// ```
/// use worduel::game::{score, Verdict};
///
/// let result = score("lolly", "ALLOY").unwrap();
/// let verdicts: Vec<Verdict> = result.iter().map(|r| r.verdict).collect();
/// assert_eq!(
///     verdicts,
///     [Verdict::Present, Verdict::Present, Verdict::Correct, Verdict::Absent, Verdict::Correct]
/// );
/// ```
pub fn score(guess: &str, target: &str) -> GameResult<GuessResult> {
    let guess = to_letters(guess)?;
    let target = to_letters(target)?;
    Ok(score_letters(&guess, &target))
}

/// Score two already-normalized words.
pub fn score_letters(guess: &[char; WORD_LENGTH], target: &[char; WORD_LENGTH]) -> GuessResult {
    let mut verdicts = [Verdict::Absent; WORD_LENGTH];
    let mut consumed = [false; WORD_LENGTH];

    for i in 0..WORD_LENGTH {
        if guess[i] == target[i] {
            verdicts[i] = Verdict::Correct;
            consumed[i] = true;
        }
    }

    for i in 0..WORD_LENGTH {
        if verdicts[i] == Verdict::Correct {
            continue;
        }
        if let Some(j) = (0..WORD_LENGTH).find(|&j| !consumed[j] && target[j] == guess[i]) {
            verdicts[i] = Verdict::Present;
            consumed[j] = true;
        }
    }

    std::array::from_fn(|i| LetterResult {
        letter: guess[i],
        verdict: verdicts[i],
    })
}

/// Whether every position of a scored guess is `Correct`.
pub fn is_solved(result: &GuessResult) -> bool {
    result.iter().all(|r| r.verdict == Verdict::Correct)
}

fn to_letters(word: &str) -> GameResult<[char; WORD_LENGTH]> {
    let letters: Vec<char> = word.chars().map(|c| c.to_ascii_uppercase()).collect();
    let actual = letters.len();
    letters
        .try_into()
        .map_err(|_| GameError::InvalidGuessLength {
            expected: WORD_LENGTH,
            actual,
        })
}
