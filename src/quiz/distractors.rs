use rand::Rng;

use super::sampler::shuffle;
use super::{Direction, QuizError};
use crate::content::Entry;

/// Incorrect options shown next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

/// Draws `k` wrong answers for `target` from the rest of `pool`.
///
/// Candidates whose text equals the correct answer, or a distractor already
/// taken, are skipped; the result is never padded.
pub fn distractors<R: Rng + ?Sized>(
    target: &Entry,
    pool: &[Entry],
    direction: Direction,
    k: usize,
    rng: &mut R,
) -> Result<Vec<String>, QuizError> {
    let candidates = pool
        .iter()
        .filter(|e| e.id != target.id)
        .map(|e| direction.answer(e))
        .collect::<Vec<_>>();
    pick_distinct(direction.answer(target), &candidates, k, rng)
}

/// Shuffles `candidates` and keeps the first `k` distinct values that differ from `correct`.
pub fn pick_distinct<R: Rng + ?Sized>(
    correct: &str,
    candidates: &[&str],
    k: usize,
    rng: &mut R,
) -> Result<Vec<String>, QuizError> {
    let mut picked: Vec<String> = Vec::with_capacity(k);
    for text in shuffle(candidates, rng) {
        if picked.len() == k {
            break;
        }
        if text == correct || picked.iter().any(|p| p == text) {
            continue;
        }
        picked.push(text.to_string());
    }

    if picked.len() < k {
        return Err(QuizError::NotEnoughDistractors {
            needed: k,
            found: picked.len(),
        });
    }
    Ok(picked)
}
