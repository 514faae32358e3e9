//! Multiple-choice quiz run: setup, one question at a time, then the result.
//!
//! All questions are generated in one batch when the session starts. Each
//! confirmed answer is appended to the answer log exactly once, and the final
//! result is reduced from that log only.

use std::collections::HashSet;

use log::{debug, info};
use rand::Rng;

use super::builder::{build_batch, build_conjugation_batch};
use super::distractors::DISTRACTOR_COUNT;
use super::sampler::{clamp_count, sample, MULTIPLE_CHOICE_FLOOR};
use super::scorer::{score, AnswerRecord, QuizResult};
use super::{Direction, Question, QuizError};
use crate::content::{Entry, Tense};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QuizMode {
    /// Translate the headword in the given direction.
    Vocabulary(Direction),
    /// Pick the conjugated form for a pronoun.
    Conjugation(Tense),
}

impl Default for QuizMode {
    fn default() -> Self {
        QuizMode::Vocabulary(Direction::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    pub category: String,
    pub count: usize,
    pub mode: QuizMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            category: crate::content::store::ALL_CATEGORY.to_string(),
            count: 10,
            mode: QuizMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Active,
    Result,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Active => "active",
            Phase::Result => "result",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
enum AnswerState {
    Unanswered,
    Selected(String),
    Confirmed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
struct ActiveQuiz {
    questions: Vec<Question>,
    current_index: usize,
    answer: AnswerState,
    answers: Vec<AnswerRecord>,
}

impl ActiveQuiz {
    fn current(&self) -> &Question {
        &self.questions[self.current_index]
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
enum Stage {
    Setup,
    Active(ActiveQuiz),
    Result(QuizResult),
}

/// What the learner sees right after confirming an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub submitted: String,
    pub correct_answer: String,
}

/// Outcome of [`QuizSession::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next { index: usize, total: usize },
    Finished(QuizResult),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    config: SessionConfig,
    stage: Stage,
}

impl QuizSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            stage: Stage::Setup,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Setup => Phase::Setup,
            Stage::Active(_) => Phase::Active,
            Stage::Result(_) => Phase::Result,
        }
    }

    fn wrong_phase(&self, action: &'static str) -> QuizError {
        QuizError::WrongPhase {
            action,
            phase: self.phase().name(),
        }
    }

    pub fn set_config(&mut self, config: SessionConfig) -> Result<(), QuizError> {
        match self.stage {
            Stage::Setup => {
                self.config = config;
                Ok(())
            }
            _ => Err(self.wrong_phase("change the setup")),
        }
    }

    /// Whether [`QuizSession::start`] would accept `pool`.
    pub fn can_start(&self, pool: &[Entry]) -> bool {
        self.stage == Stage::Setup && checked_pool(pool, self.config.mode).is_ok()
    }

    /// Generates every question up front and enters the active phase.
    pub fn start<R: Rng + ?Sized>(&mut self, pool: &[Entry], rng: &mut R) -> Result<(), QuizError> {
        if self.stage != Stage::Setup {
            return Err(self.wrong_phase("start"));
        }

        let pool = checked_pool(pool, self.config.mode)?;
        let count = clamp_count(self.config.count, MULTIPLE_CHOICE_FLOOR, pool.len());
        let selected = sample(&pool, count, rng);
        let questions = match self.config.mode {
            QuizMode::Vocabulary(direction) => build_batch(&selected, &pool, direction, rng)?,
            QuizMode::Conjugation(tense) => build_conjugation_batch(&selected, tense, rng)?,
        };

        info!(
            "Quiz started: category '{}', {:?}, {} questions",
            self.config.category,
            self.config.mode,
            questions.len()
        );
        self.config.count = count;
        self.stage = Stage::Active(ActiveQuiz {
            questions,
            current_index: 0,
            answer: AnswerState::Unanswered,
            answers: Vec::with_capacity(count),
        });
        Ok(())
    }

    pub fn questions(&self) -> &[Question] {
        match &self.stage {
            Stage::Active(active) => &active.questions,
            _ => &[],
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match &self.stage {
            Stage::Active(active) => Some(active.current()),
            _ => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.stage {
            Stage::Active(active) => Some(active.current_index),
            _ => None,
        }
    }

    /// `(current_index, total)` while active.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.stage {
            Stage::Active(active) => Some((active.current_index, active.questions.len())),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&str> {
        match &self.stage {
            Stage::Active(ActiveQuiz {
                answer: AnswerState::Selected(option) | AnswerState::Confirmed(option),
                ..
            }) => Some(option.as_str()),
            _ => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(
            &self.stage,
            Stage::Active(ActiveQuiz {
                answer: AnswerState::Confirmed(_),
                ..
            })
        )
    }

    /// Picks an option for the current question; can be changed until confirmed.
    pub fn select(&mut self, option: &str) -> Result<(), QuizError> {
        let Stage::Active(active) = &mut self.stage else {
            return Err(self.wrong_phase("select an option"));
        };
        if let AnswerState::Confirmed(_) = active.answer {
            return Err(QuizError::AlreadyConfirmed);
        }
        if !active.current().offers(option) {
            return Err(QuizError::UnknownOption(option.to_string()));
        }
        active.answer = AnswerState::Selected(option.to_string());
        Ok(())
    }

    pub fn can_confirm(&self) -> bool {
        matches!(
            &self.stage,
            Stage::Active(ActiveQuiz {
                answer: AnswerState::Selected(_),
                ..
            })
        )
    }

    /// Records the selected option; exactly one record per question.
    pub fn confirm(&mut self) -> Result<Feedback, QuizError> {
        let Stage::Active(active) = &mut self.stage else {
            return Err(self.wrong_phase("confirm"));
        };
        let submitted = match &active.answer {
            AnswerState::Unanswered => return Err(QuizError::NoSelection),
            AnswerState::Confirmed(_) => return Err(QuizError::AlreadyConfirmed),
            AnswerState::Selected(option) => option.clone(),
        };

        let question = active.current().clone();
        let is_correct = question.is_correct(&submitted);
        debug!(
            "Question {} answered with '{}' (correct: {})",
            active.current_index + 1,
            submitted,
            is_correct
        );

        let feedback = Feedback {
            is_correct,
            submitted: submitted.clone(),
            correct_answer: question.correct_answer.clone(),
        };
        active.answers.push(AnswerRecord {
            question,
            submitted: submitted.clone(),
            is_correct,
        });
        active.answer = AnswerState::Confirmed(submitted);
        Ok(feedback)
    }

    /// Select and confirm in one go.
    pub fn answer(&mut self, option: &str) -> Result<Feedback, QuizError> {
        self.select(option)?;
        self.confirm()
    }

    pub fn can_advance(&self) -> bool {
        self.is_confirmed()
    }

    /// Moves to the next question, or scores the quiz after the last one.
    pub fn advance(&mut self) -> Result<Step, QuizError> {
        let Stage::Active(active) = &mut self.stage else {
            return Err(self.wrong_phase("advance"));
        };
        if !matches!(active.answer, AnswerState::Confirmed(_)) {
            return Err(QuizError::NotConfirmed);
        }

        if !active.is_last() {
            active.current_index += 1;
            active.answer = AnswerState::Unanswered;
            return Ok(Step::Next {
                index: active.current_index,
                total: active.questions.len(),
            });
        }

        let total = active.questions.len();
        let answers = std::mem::take(&mut active.answers);
        debug_assert_eq!(answers.len(), total);
        let result = score(answers, total);
        info!(
            "Quiz finished: {}/{} correct = {}%",
            result.correct, result.total, result.percentage
        );
        self.stage = Stage::Result(result.clone());
        Ok(Step::Finished(result))
    }

    /// Answers recorded so far, or the full log once the result is in.
    pub fn answers(&self) -> &[AnswerRecord] {
        match &self.stage {
            Stage::Setup => &[],
            Stage::Active(active) => &active.answers,
            Stage::Result(result) => &result.answers,
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.stage {
            Stage::Result(result) => Some(result),
            _ => None,
        }
    }

    /// Drops questions and answers and goes back to setup, keeping the configuration.
    pub fn reset(&mut self) {
        self.stage = Stage::Setup;
    }
}

/// Entries a quiz in `mode` can ask about. Conjugation needs a paradigm
/// whose row has enough distinct forms for the options.
pub fn usable_entries(pool: &[Entry], mode: QuizMode) -> Vec<Entry> {
    match mode {
        QuizMode::Vocabulary(_) => pool.to_vec(),
        QuizMode::Conjugation(tense) => pool
            .iter()
            .filter(|e| {
                e.paradigm.as_ref().map_or(false, |p| {
                    p.forms(tense).iter().collect::<HashSet<_>>().len() > DISTRACTOR_COUNT
                })
            })
            .cloned()
            .collect(),
    }
}

fn checked_pool(pool: &[Entry], mode: QuizMode) -> Result<Vec<Entry>, QuizError> {
    let usable = usable_entries(pool, mode);
    if usable.len() < MULTIPLE_CHOICE_FLOOR {
        return Err(QuizError::NotEnoughEntries {
            available: usable.len(),
            required: MULTIPLE_CHOICE_FLOOR,
        });
    }
    // Every target needs three other distinct answer texts.
    if let QuizMode::Vocabulary(direction) = mode {
        let distinct = usable
            .iter()
            .map(|e| direction.answer(e))
            .collect::<HashSet<_>>()
            .len();
        if distinct <= DISTRACTOR_COUNT {
            return Err(QuizError::NotEnoughDistractors {
                needed: DISTRACTOR_COUNT,
                found: distinct.saturating_sub(1),
            });
        }
    }
    Ok(usable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn verbs() -> Vec<Entry> {
        ContentStore::builtin().unwrap().verbs().to_vec()
    }

    fn vocabulary_session(count: usize) -> QuizSession {
        QuizSession::new(SessionConfig {
            category: "verbs".into(),
            count,
            mode: QuizMode::Vocabulary(Direction::ArabicToGerman),
        })
    }

    #[test]
    fn start_generates_clamped_batch() {
        let pool = verbs();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut session = vocabulary_session(30);
        session.start(&pool, &mut rng).unwrap();
        assert_eq!(session.questions().len(), pool.len());
        assert_eq!(session.config().count, pool.len());

        let mut session = vocabulary_session(1);
        session.start(&pool, &mut rng).unwrap();
        assert_eq!(session.questions().len(), MULTIPLE_CHOICE_FLOOR);

        let ids = session.questions().iter().map(|q| q.entry_id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), MULTIPLE_CHOICE_FLOOR);
    }

    #[test]
    fn start_refuses_small_pools() {
        let pool = verbs()[..3].to_vec();
        let mut session = vocabulary_session(5);
        assert!(!session.can_start(&pool));
        assert_eq!(
            session.start(&pool, &mut ChaCha8Rng::seed_from_u64(1)),
            Err(QuizError::NotEnoughEntries {
                available: 3,
                required: 4
            })
        );
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn confirm_needs_a_selection() {
        let mut session = vocabulary_session(4);
        session.start(&verbs(), &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        assert!(!session.can_confirm());
        assert_eq!(session.confirm(), Err(QuizError::NoSelection));
        assert_eq!(session.advance(), Err(QuizError::NotConfirmed));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn selection_is_mutable_until_confirmed() {
        let mut session = vocabulary_session(4);
        session.start(&verbs(), &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let question = session.current_question().unwrap().clone();
        let wrong = question
            .options
            .iter()
            .find(|o| **o != question.correct_answer)
            .unwrap()
            .clone();

        session.select(&wrong).unwrap();
        session.select(&question.correct_answer).unwrap();
        assert_eq!(session.selection(), Some(question.correct_answer.as_str()));

        let feedback = session.confirm().unwrap();
        assert!(feedback.is_correct);
        assert_eq!(session.select(&wrong), Err(QuizError::AlreadyConfirmed));
        assert_eq!(session.confirm(), Err(QuizError::AlreadyConfirmed));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut session = vocabulary_session(4);
        session.start(&verbs(), &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        assert_eq!(
            session.select("fliegen"),
            Err(QuizError::UnknownOption("fliegen".into()))
        );
    }

    #[test]
    fn wrong_answer_reveals_correct_one() {
        let mut session = vocabulary_session(4);
        session.start(&verbs(), &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let question = session.current_question().unwrap().clone();
        let wrong = question
            .options
            .iter()
            .find(|o| **o != question.correct_answer)
            .unwrap()
            .clone();
        let feedback = session.answer(&wrong).unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.submitted, wrong);
        assert_eq!(feedback.correct_answer, question.correct_answer);
    }

    #[test]
    fn full_run_records_every_question_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut session = vocabulary_session(6);
        session.start(&verbs(), &mut rng).unwrap();
        let questions = session.questions().to_vec();

        let mut finished = None;
        for (i, question) in questions.iter().enumerate() {
            assert_eq!(session.progress(), Some((i, questions.len())));
            // every other answer wrong
            let pick = if i % 2 == 0 {
                question.correct_answer.clone()
            } else {
                question
                    .options
                    .iter()
                    .find(|o| **o != question.correct_answer)
                    .unwrap()
                    .clone()
            };
            session.answer(&pick).unwrap();
            match session.advance().unwrap() {
                Step::Next { index, total } => {
                    assert_eq!(index, i + 1);
                    assert_eq!(total, questions.len());
                }
                Step::Finished(result) => finished = Some(result),
            }
        }

        let result = finished.unwrap();
        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(result.answers.len(), questions.len());
        for (record, question) in result.answers.iter().zip(&questions) {
            assert_eq!(&record.question, question);
        }
        assert_eq!(result.correct, 3);
        assert_eq!(result.percentage, 50);
        assert_eq!(session.result(), Some(&result));
        assert_eq!(session.answers().len(), questions.len());
    }

    #[test]
    fn reset_returns_to_setup() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut session = vocabulary_session(4);
        session.start(&verbs(), &mut rng).unwrap();
        assert_eq!(session.start(&verbs(), &mut rng), Err(QuizError::WrongPhase {
            action: "start",
            phase: "active",
        }));

        session.reset();
        assert_eq!(session.phase(), Phase::Setup);
        assert!(session.questions().is_empty());
        assert!(session.answers().is_empty());
        assert!(session.current_question().is_none());

        session.start(&verbs(), &mut rng).unwrap();
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn config_is_locked_outside_setup() {
        let mut session = vocabulary_session(4);
        let config = SessionConfig {
            count: 5,
            ..session.config().clone()
        };
        session.set_config(config).unwrap();
        session.start(&verbs(), &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        assert!(matches!(
            session.set_config(SessionConfig::default()),
            Err(QuizError::WrongPhase { .. })
        ));
    }

    #[test]
    fn start_predicate_counts_distinct_answers() {
        // five entries, but only three distinct Arabic answers
        let pool = vec![
            Entry::new(1, "بَيْتٌ", "Haus"),
            Entry::new(2, "بَيْتٌ", "Gebäude"),
            Entry::new(3, "بَابٌ", "Tür"),
            Entry::new(4, "بَابٌ", "Tor"),
            Entry::new(5, "قَلَمٌ", "Stift"),
        ];
        let mut session = QuizSession::new(SessionConfig {
            category: "house".into(),
            count: 5,
            mode: QuizMode::Vocabulary(Direction::GermanToArabic),
        });
        assert!(!session.can_start(&pool));
        assert_eq!(
            session.start(&pool, &mut ChaCha8Rng::seed_from_u64(10)),
            Err(QuizError::NotEnoughDistractors { needed: 3, found: 2 })
        );

        // the German side is distinct, so the other direction works
        let config = SessionConfig {
            mode: QuizMode::Vocabulary(Direction::ArabicToGerman),
            ..session.config().clone()
        };
        session.set_config(config).unwrap();
        assert!(session.can_start(&pool));
        session.start(&pool, &mut ChaCha8Rng::seed_from_u64(10)).unwrap();
        assert_eq!(session.questions().len(), 5);
    }

    #[test]
    fn start_predicate_agrees_with_start_for_conjugation() {
        let mut pool = verbs();
        for verb in pool.iter_mut() {
            if let Some(paradigm) = verb.paradigm.as_mut() {
                let first = paradigm.present[0].clone();
                paradigm.present = std::array::from_fn(|_| first.clone());
            }
        }
        let mut session = QuizSession::new(SessionConfig {
            category: "verbs".into(),
            count: 5,
            mode: QuizMode::Conjugation(Tense::Present),
        });
        assert!(usable_entries(&pool, session.config().mode).is_empty());
        assert!(!session.can_start(&pool));
        assert!(session.start(&pool, &mut ChaCha8Rng::seed_from_u64(11)).is_err());

        let mut session = QuizSession::new(SessionConfig {
            mode: QuizMode::Conjugation(Tense::Past),
            ..session.config().clone()
        });
        assert!(session.can_start(&pool));
        assert!(session.start(&pool, &mut ChaCha8Rng::seed_from_u64(11)).is_ok());
    }

    #[test]
    fn conjugation_mode_skips_entries_without_paradigm() {
        let mut pool = verbs();
        pool.push(Entry::new(99, "بَيْتٌ", "Haus"));
        let mut session = QuizSession::new(SessionConfig {
            category: "verbs".into(),
            count: 30,
            mode: QuizMode::Conjugation(Tense::Present),
        });
        session.start(&pool, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(session.questions().len(), verbs().len());
        assert!(session.questions().iter().all(|q| q.entry_id != 99));
    }
}
