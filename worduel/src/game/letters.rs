//! Best-known letter status, recomputed from scored guesses.

use std::collections::BTreeMap;

use super::scorer::{LetterResult, Verdict};

/// Fold scored guesses into the best verdict seen for each letter.
///
/// Precedence is `Correct > Present > Absent`; a later, weaker verdict for a
/// letter never replaces a stronger one. The map is never cached, callers
/// rebuild it from the guess history whenever they need it.
pub fn best_status<I, R>(scored_guesses: I) -> BTreeMap<char, Verdict>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[LetterResult]>,
{
    let mut best = BTreeMap::new();
    for guess in scored_guesses {
        for result in guess.as_ref() {
            best.entry(result.letter)
                .and_modify(|current: &mut Verdict| *current = (*current).max(result.verdict))
                .or_insert(result.verdict);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scorer::score;

    #[test]
    fn test_empty_history_has_no_hints() {
        let none: Vec<[LetterResult; 5]> = Vec::new();
        assert!(best_status(none).is_empty());
    }

    #[test]
    fn test_correct_is_never_downgraded() {
        // A is correct in CRANE, absent in the later guess's second A slot.
        let first = score("CRANE", "CRAMP").unwrap();
        let second = score("AAAAA", "CRAMP").unwrap();
        let hints = best_status([first, second]);

        assert_eq!(hints[&'A'], Verdict::Correct);
        assert_eq!(hints[&'C'], Verdict::Correct);
        assert_eq!(hints[&'N'], Verdict::Absent);
    }

    #[test]
    fn test_present_upgrades_to_correct() {
        let first = score("RATES", "CRANE").unwrap();
        let second = score("CRANE", "CRANE").unwrap();

        let hints = best_status([&first]);
        assert_eq!(hints[&'R'], Verdict::Present);

        let hints = best_status([&first, &second]);
        assert_eq!(hints[&'R'], Verdict::Correct);
        assert_eq!(hints[&'T'], Verdict::Absent);
    }

    #[test]
    fn test_order_of_guesses_does_not_matter() {
        let a = score("SLATE", "PLANT").unwrap();
        let b = score("PLANK", "PLANT").unwrap();
        assert_eq!(best_status([a, b]), best_status([b, a]));
    }
}
