//! Target and distractor selection
//!
//! Pure functions of the word table and an injected RNG.

use rand::Rng;

use crate::vocab::{Vocabulary, VocabularyEntry};

/// Resampling budget before falling back to a scan
pub const DISTRACTOR_ATTEMPTS: u32 = 10;

/// Uniform pick over the whole table
pub fn pick_target<'v, R: Rng>(vocab: &'v Vocabulary, rng: &mut R) -> &'v VocabularyEntry {
    let entries = vocab.entries();
    &entries[rng.random_range(0..entries.len())]
}

/// Uniform pick of a wrong answer for `excluding`
///
/// Resamples up to [`DISTRACTOR_ATTEMPTS`] times, then takes the first
/// non-matching entry from a random starting point. If every entry matches,
/// the duplicate is accepted rather than looping.
pub fn pick_distractor<'v, R: Rng>(
    vocab: &'v Vocabulary,
    excluding: &VocabularyEntry,
    rng: &mut R,
) -> &'v VocabularyEntry {
    let entries = vocab.entries();
    let len = entries.len();

    for _ in 0..DISTRACTOR_ATTEMPTS {
        let candidate = &entries[rng.random_range(0..len)];
        if !candidate.same_answer(excluding) {
            return candidate;
        }
    }

    let start = rng.random_range(0..len);
    let fallback = (0..len)
        .map(|offset| &entries[(start + offset) % len])
        .find(|entry| !entry.same_answer(excluding));

    match fallback {
        Some(entry) => entry,
        None => {
            log::warn!(
                "no distractor differs from '{}'; accepting duplicate",
                excluding.english
            );
            &entries[start]
        }
    }
}
