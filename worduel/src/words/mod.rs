//! Word suggestions for word-setters.
//!
//! The engine never consults a dictionary to validate guesses; this module
//! only offers setters a handful of candidates to pick from.

mod list;

use rand::{Rng, seq::IndexedRandom};

pub use list::TARGET_WORDS;

/// Source of candidate target words.
pub trait WordSource: Send + Sync {
    /// Up to `count` distinct uppercase five-letter words.
    fn candidates(&self, count: usize) -> Vec<String>;
}

/// Word source backed by a fixed list, sampled uniformly.
#[derive(Clone, Debug)]
pub struct EmbeddedWordList {
    words: Vec<String>,
}

impl EmbeddedWordList {
    /// The bundled list.
    pub fn new() -> Self {
        Self::from_words(TARGET_WORDS.iter().copied())
    }

    /// A custom list. Entries that are not five ASCII letters are skipped
    /// and duplicates collapse.
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut words: Vec<String> = words
            .into_iter()
            .filter_map(crate::game::normalize_word)
            .collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Draw `count` distinct words using `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<String> {
        self.words.choose_multiple(rng, count).cloned().collect()
    }
}

impl Default for EmbeddedWordList {
    fn default() -> Self {
        Self::new()
    }
}

impl WordSource for EmbeddedWordList {
    fn candidates(&self, count: usize) -> Vec<String> {
        self.sample(&mut rand::rng(), count)
    }
}
