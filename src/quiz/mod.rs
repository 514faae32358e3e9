pub mod builder;
pub mod cursor;
pub mod distractors;
pub mod flashcards;
pub mod negation;
pub mod sampler;
pub mod scorer;
pub mod session;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::content::Entry;

pub use flashcards::FlashcardDeck;
pub use negation::{NegationDrill, NegationParticle};
pub use scorer::{AnswerRecord, Grade, QuizResult};
pub use session::{Feedback, Phase, QuizMode, QuizSession, SessionConfig, Step};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("need at least {required} entries, only {available} available")]
    NotEnoughEntries { available: usize, required: usize },
    #[error("need {needed} distinct distractors, found {found}")]
    NotEnoughDistractors { needed: usize, found: usize },
    #[error("'{0}' is not one of the offered options")]
    UnknownOption(String),
    #[error("no option selected")]
    NoSelection,
    #[error("the current question is already confirmed")]
    AlreadyConfirmed,
    #[error("the current question is not confirmed yet")]
    NotConfirmed,
    #[error("cannot {action} while the session is in the {phase} phase")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },
    #[error("there are no cards to study")]
    EmptyDeck,
    #[error("entry {0} has no conjugation paradigm")]
    MissingParadigm(u32),
    #[error("index {index} is out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
}

/// Which language is shown as the prompt and which one is expected as the answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    #[default]
    ArabicToGerman,
    GermanToArabic,
}

impl Direction {
    pub fn prompt<'a>(&self, entry: &'a Entry) -> &'a str {
        match self {
            Direction::ArabicToGerman => &entry.arabic,
            Direction::GermanToArabic => &entry.german,
        }
    }

    pub fn answer<'a>(&self, entry: &'a Entry) -> &'a str {
        match self {
            Direction::ArabicToGerman => &entry.german,
            Direction::GermanToArabic => &entry.arabic,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Direction::ArabicToGerman => "ar-de",
            Direction::GermanToArabic => "de-ar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::ArabicToGerman => "Arabisch → Deutsch",
            Direction::GermanToArabic => "Deutsch → Arabisch",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ar-de" | "Arabisch → Deutsch" => Ok(Direction::ArabicToGerman),
            "de-ar" | "Deutsch → Arabisch" => Ok(Direction::GermanToArabic),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// One multiple-choice question, fixed once the session has started.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub entry_id: u32,
    pub prompt: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

impl Question {
    pub fn new(entry_id: u32, prompt: String, correct_answer: String, options: Vec<String>) -> Self {
        Self {
            entry_id,
            prompt,
            correct_answer,
            options,
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn offers(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}
