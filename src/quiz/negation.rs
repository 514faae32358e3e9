//! Negation drill: choose لا, لن or لم from the ending of a present-tense verb.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use rand::Rng;

use super::cursor::Cursor;
use super::flashcards::LearnProgress;
use super::sampler::{clamp_count, sample, NEGATION_FLOOR};
use super::QuizError;
use crate::content::Entry;

/// Exercises offered when no count is configured.
pub const DEFAULT_NEGATION_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NegationParticle {
    La,
    Lan,
    Lam,
}

impl NegationParticle {
    pub const ALL: [NegationParticle; 3] = [
        NegationParticle::La,
        NegationParticle::Lan,
        NegationParticle::Lam,
    ];

    pub fn arabic(&self) -> &'static str {
        match self {
            NegationParticle::La => "لا",
            NegationParticle::Lan => "لن",
            NegationParticle::Lam => "لم",
        }
    }

    /// The time reference the particle negates.
    pub fn german(&self) -> &'static str {
        match self {
            NegationParticle::La => "Gegenwart",
            NegationParticle::Lan => "Zukunft",
            NegationParticle::Lam => "Vergangenheit",
        }
    }

    /// Accepts the bare particle, with or without its vowel mark.
    pub fn from_arabic(text: &str) -> Option<Self> {
        let bare = text
            .trim()
            .chars()
            .filter(|c| !is_ending_mark(*c))
            .collect::<String>();
        Self::ALL.into_iter().find(|p| p.arabic() == bare)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ending {
    pub label: &'static str,
    pub diacritic: char,
    pub particle: NegationParticle,
}

// Damma goes with لا, fatha with لن, sukun with لم.
pub const ENDINGS: [Ending; 3] = [
    Ending {
        label: "Damma (ُ)",
        diacritic: '\u{064F}',
        particle: NegationParticle::La,
    },
    Ending {
        label: "Fatha (َ)",
        diacritic: '\u{064E}',
        particle: NegationParticle::Lan,
    },
    Ending {
        label: "Sukun (ْ)",
        diacritic: '\u{0652}',
        particle: NegationParticle::Lam,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegationExercise {
    pub id: u32,
    pub german: String,
    /// Present-tense form carrying the exercise ending.
    pub present: String,
    pub ending: Ending,
}

impl NegationExercise {
    pub fn correct(&self) -> NegationParticle {
        self.ending.particle
    }
}

// Tanwin, short vowels and sukun; shadda (U+0651) is left alone.
fn is_ending_mark(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0650}' | '\u{0652}')
}

/// Present-tense half of a "past – present" headword.
pub fn extract_present(arabic: &str) -> String {
    let parts = arabic
        .split(|c| c == '–' || c == '-')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    if parts.len() >= 2 {
        parts[1].to_string()
    } else {
        arabic.trim().to_string()
    }
}

/// Replaces the last vowel mark of `form` by `diacritic`, appending it when there is none.
pub fn set_ending(form: &str, diacritic: char) -> String {
    let mut chars = form.chars().collect::<Vec<_>>();
    match chars.iter().rposition(|c| is_ending_mark(*c)) {
        Some(last) => chars[last] = diacritic,
        None => chars.push(diacritic),
    }
    chars.into_iter().collect()
}

/// Samples `count` verbs and gives them the three endings in turn.
pub fn build_exercises<R: Rng + ?Sized>(
    verbs: &[Entry],
    count: usize,
    rng: &mut R,
) -> Vec<NegationExercise> {
    sample(verbs, count, rng)
        .into_iter()
        .enumerate()
        .map(|(index, verb)| {
            let ending = ENDINGS[index % ENDINGS.len()];
            NegationExercise {
                id: verb.id,
                german: verb.german,
                present: set_ending(&extract_present(&verb.arabic), ending.diacritic),
                ending,
            }
        })
        .collect()
}

/// One row of the drill overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseRow<'a> {
    pub index: usize,
    pub exercise: &'a NegationExercise,
    pub answer: Option<NegationParticle>,
    pub learned: bool,
}

impl ExerciseRow<'_> {
    pub fn is_correct(&self) -> Option<bool> {
        self.answer.map(|a| a == self.exercise.correct())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegationDrill {
    verbs: Vec<Entry>,
    count: usize,
    exercises: Vec<NegationExercise>,
    cursor: Cursor,
    answers: HashMap<u32, NegationParticle>,
    learned: HashSet<u32>,
}

impl NegationDrill {
    pub fn new<R: Rng + ?Sized>(verbs: &[Entry], count: usize, rng: &mut R) -> Result<Self, QuizError> {
        if verbs.is_empty() {
            return Err(QuizError::EmptyDeck);
        }
        let mut drill = Self {
            verbs: verbs.to_vec(),
            count: 0,
            exercises: Vec::new(),
            cursor: Cursor::new(0),
            answers: HashMap::new(),
            learned: HashSet::new(),
        };
        drill.load(count, rng);
        Ok(drill)
    }

    fn load<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let count = clamp_count(count, NEGATION_FLOOR, self.verbs.len());
        self.exercises = build_exercises(&self.verbs, count, rng);
        self.count = count;
        self.cursor = Cursor::new(self.exercises.len());
        self.answers.clear();
        self.learned.clear();
        info!("Negation drill loaded with {} exercises", count);
    }

    /// Allowed range for [`NegationDrill::set_count`].
    pub fn count_bounds(&self) -> (usize, usize) {
        (NEGATION_FLOOR.min(self.verbs.len()), self.verbs.len())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Rebuilds the drill with a new (clamped) count and clears all progress.
    pub fn set_count<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.load(count, rng);
    }

    /// Reshuffles with the current count and clears all progress.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.load(self.count, rng);
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn exercises(&self) -> &[NegationExercise] {
        &self.exercises
    }

    pub fn current(&self) -> &NegationExercise {
        &self.exercises[self.cursor.index()]
    }

    /// Sets (or changes) the answer for the current exercise.
    pub fn answer(&mut self, particle: NegationParticle) -> bool {
        let exercise = self.current();
        let id = exercise.id;
        let correct = exercise.correct() == particle;
        debug!("Negation exercise {} answered with {:?} (correct: {})", id, particle, correct);
        self.answers.insert(id, particle);
        correct
    }

    pub fn selected(&self) -> Option<NegationParticle> {
        self.answers.get(&self.current().id).copied()
    }

    pub fn is_current_correct(&self) -> Option<bool> {
        self.selected().map(|p| p == self.current().correct())
    }

    pub fn next(&mut self) {
        self.cursor.next();
    }

    pub fn prev(&mut self) {
        self.cursor.prev();
    }

    pub fn jump(&mut self, index: usize) -> Result<(), QuizError> {
        if self.cursor.jump(index) {
            Ok(())
        } else {
            Err(QuizError::OutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    pub fn can_mark_learned(&self) -> bool {
        self.selected().is_some() && !self.learned.contains(&self.current().id)
    }

    /// Marks the current exercise as learned and moves on. Needs an answer
    /// first; returns whether the exercise was newly added.
    pub fn mark_learned(&mut self) -> Result<bool, QuizError> {
        if self.selected().is_none() {
            return Err(QuizError::NoSelection);
        }
        let id = self.current().id;
        let inserted = self.learned.insert(id);
        self.next();
        Ok(inserted)
    }

    pub fn progress(&self) -> LearnProgress {
        LearnProgress::new(self.learned.len(), self.exercises.len())
    }

    pub fn rows(&self) -> Vec<ExerciseRow<'_>> {
        self.exercises
            .iter()
            .enumerate()
            .map(|(index, exercise)| ExerciseRow {
                index,
                exercise,
                answer: self.answers.get(&exercise.id).copied(),
                learned: self.learned.contains(&exercise.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn verbs() -> Vec<Entry> {
        ContentStore::builtin().unwrap().verbs().to_vec()
    }

    #[test]
    fn present_is_second_half() {
        assert_eq!(extract_present("كَتَبَ – يَكتُبُ"), "يَكتُبُ");
        assert_eq!(extract_present("فَتَحَ - يَفتَحُ"), "يَفتَحُ");
        assert_eq!(extract_present(" يَكتُبُ "), "يَكتُبُ");
    }

    #[test]
    fn ending_replaces_last_mark() {
        assert_eq!(set_ending("يَكتُبُ", '\u{0652}'), "يَكتُبْ");
        assert_eq!(set_ending("يَكتُبُ", '\u{064E}'), "يَكتُبَ");
        assert_eq!(set_ending("يكتب", '\u{064F}'), "يكتبُ");
    }

    #[test]
    fn shadda_is_kept() {
        // yamuddu: the final damma follows the shadda
        let form = "\u{064A}\u{064E}\u{0645}\u{064F}\u{062F}\u{0651}\u{064F}";
        let expected = "\u{064A}\u{064E}\u{0645}\u{064F}\u{062F}\u{0651}\u{0652}";
        assert_eq!(set_ending(form, '\u{0652}'), expected);
    }

    #[test]
    fn particles_parse_with_or_without_marks() {
        assert_eq!(NegationParticle::from_arabic("لا"), Some(NegationParticle::La));
        assert_eq!(NegationParticle::from_arabic("لَنْ"), Some(NegationParticle::Lan));
        assert_eq!(NegationParticle::from_arabic(" لم "), Some(NegationParticle::Lam));
        assert_eq!(NegationParticle::from_arabic("ما"), None);
    }

    #[test]
    fn exercises_rotate_endings() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let exercises = build_exercises(&verbs(), 6, &mut rng);
        assert_eq!(exercises.len(), 6);
        for (i, exercise) in exercises.iter().enumerate() {
            assert_eq!(exercise.ending, ENDINGS[i % 3]);
            assert!(exercise.present.ends_with(exercise.ending.diacritic));
        }
        assert_eq!(exercises[0].correct(), NegationParticle::La);
        assert_eq!(exercises[1].correct(), NegationParticle::Lan);
        assert_eq!(exercises[2].correct(), NegationParticle::Lam);
    }

    #[test]
    fn count_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut drill = NegationDrill::new(&verbs(), 1, &mut rng).unwrap();
        assert_eq!(drill.len(), NEGATION_FLOOR);
        drill.set_count(100, &mut rng);
        assert_eq!(drill.len(), verbs().len());
        assert_eq!(drill.count_bounds(), (3, 8));

        let drill = NegationDrill::new(&verbs()[..2], 9, &mut rng).unwrap();
        assert_eq!(drill.len(), 2);
    }

    #[test]
    fn answers_can_change_and_learning_needs_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut drill = NegationDrill::new(&verbs(), 3, &mut rng).unwrap();
        assert!(!drill.can_mark_learned());
        assert_eq!(drill.mark_learned(), Err(QuizError::NoSelection));

        let correct = drill.current().correct();
        let wrong = NegationParticle::ALL.into_iter().find(|p| *p != correct).unwrap();
        assert!(!drill.answer(wrong));
        assert_eq!(drill.is_current_correct(), Some(false));
        assert!(drill.answer(correct));
        assert_eq!(drill.is_current_correct(), Some(true));

        assert_eq!(drill.mark_learned(), Ok(true));
        assert_eq!(drill.index(), 1);
        drill.prev();
        assert!(!drill.can_mark_learned());
        assert_eq!(drill.mark_learned(), Ok(false));
        assert_eq!(drill.progress().learned, 1);
    }

    #[test]
    fn navigation_wraps_forward_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut drill = NegationDrill::new(&verbs(), 3, &mut rng).unwrap();
        drill.prev();
        assert_eq!(drill.index(), 0);
        drill.next();
        drill.next();
        drill.next();
        assert_eq!(drill.index(), 0);
        drill.jump(2).unwrap();
        assert_eq!(drill.index(), 2);
        assert_eq!(drill.jump(3), Err(QuizError::OutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn reset_clears_progress_and_keeps_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut drill = NegationDrill::new(&verbs(), 5, &mut rng).unwrap();
        drill.answer(NegationParticle::La);
        drill.mark_learned().unwrap();
        drill.reset(&mut rng);
        assert_eq!(drill.len(), 5);
        assert_eq!(drill.index(), 0);
        assert_eq!(drill.progress().learned, 0);
        assert!(drill.rows().iter().all(|row| row.answer.is_none() && !row.learned));
    }

    #[test]
    fn rows_report_answers() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut drill = NegationDrill::new(&verbs(), 3, &mut rng).unwrap();
        let correct = drill.current().correct();
        drill.answer(correct);
        let rows = drill.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].is_correct(), Some(true));
        assert_eq!(rows[1].is_correct(), None);
    }
}
