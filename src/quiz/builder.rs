use rand::Rng;

use super::distractors::{distractors, pick_distinct, DISTRACTOR_COUNT};
use super::sampler::shuffle;
use super::{Direction, Question, QuizError};
use crate::content::{Entry, PronounSlot, Tense};

/// Combines the target's answer with its distractors into a shuffled question.
pub fn build<R: Rng + ?Sized>(
    target: &Entry,
    distractors: Vec<String>,
    direction: Direction,
    rng: &mut R,
) -> Question {
    let correct_answer = direction.answer(target).to_string();

    // Shuffle so the correct answer isn't always the first one
    let mut options = Vec::with_capacity(distractors.len() + 1);
    options.push(correct_answer.clone());
    options.extend(distractors);
    let options = shuffle(&options, rng);

    Question::new(
        target.id,
        direction.prompt(target).to_string(),
        correct_answer,
        options,
    )
}

/// One vocabulary question per selected entry, distractors drawn from `pool`.
pub fn build_batch<R: Rng + ?Sized>(
    selected: &[Entry],
    pool: &[Entry],
    direction: Direction,
    rng: &mut R,
) -> Result<Vec<Question>, QuizError> {
    selected
        .iter()
        .map(|target| {
            let wrong = distractors(target, pool, direction, DISTRACTOR_COUNT, rng)?;
            Ok(build(target, wrong, direction, rng))
        })
        .collect()
}

/// Asks for the form of `verb` in `tense` for the pronoun in `slot`.
///
/// Distractors are the other distinct forms of the same tense row; the
/// present tense repeats a form (2nd masc. and 3rd fem. singular), so the
/// row is deduplicated before drawing.
pub fn build_conjugation<R: Rng + ?Sized>(
    verb: &Entry,
    tense: Tense,
    slot: PronounSlot,
    rng: &mut R,
) -> Result<Question, QuizError> {
    let paradigm = verb
        .paradigm
        .as_ref()
        .ok_or(QuizError::MissingParadigm(verb.id))?;
    let correct_answer = paradigm.form(tense, slot).to_string();
    let row = paradigm
        .forms(tense)
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>();
    let wrong = pick_distinct(&correct_answer, &row, DISTRACTOR_COUNT, rng)?;

    let mut options = Vec::with_capacity(DISTRACTOR_COUNT + 1);
    options.push(correct_answer.clone());
    options.extend(wrong);

    let prompt = format!(
        "{} + {} ({})",
        slot.pronoun().arabic,
        verb.base_form(),
        tense.arabic()
    );
    Ok(Question::new(
        verb.id,
        prompt,
        correct_answer,
        shuffle(&options, rng),
    ))
}

/// One conjugation question per selected verb, each with a random pronoun slot.
pub fn build_conjugation_batch<R: Rng + ?Sized>(
    verbs: &[Entry],
    tense: Tense,
    rng: &mut R,
) -> Result<Vec<Question>, QuizError> {
    verbs
        .iter()
        .map(|verb| {
            let slot = PronounSlot::ALL[rng.gen_range(0..PronounSlot::ALL.len())];
            build_conjugation(verb, tense, slot, rng)
        })
        .collect()
}
