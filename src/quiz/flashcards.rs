use std::collections::HashSet;

use log::debug;
use rand::Rng;

use super::cursor::Cursor;
use super::sampler::shuffle;
use super::scorer::percentage;
use super::{Direction, QuizError};
use crate::content::Entry;

/// Learned cards over the deck size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnProgress {
    pub learned: usize,
    pub total: usize,
    pub percentage: u32,
}

impl LearnProgress {
    pub fn new(learned: usize, total: usize) -> Self {
        Self {
            learned,
            total,
            percentage: percentage(learned, total),
        }
    }
}

/// Circular flashcard review with a growing set of learned cards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlashcardDeck {
    cards: Vec<Entry>,
    cursor: Cursor,
    flipped: bool,
    learned: HashSet<u32>,
    direction: Direction,
}

impl FlashcardDeck {
    pub fn new<R: Rng + ?Sized>(
        entries: &[Entry],
        direction: Direction,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if entries.is_empty() {
            return Err(QuizError::EmptyDeck);
        }
        Ok(Self {
            cards: shuffle(entries, rng),
            cursor: Cursor::new(entries.len()),
            flipped: false,
            learned: HashSet::new(),
            direction,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn cards(&self) -> &[Entry] {
        &self.cards
    }

    pub fn current(&self) -> &Entry {
        &self.cards[self.cursor.index()]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.flipped = false;
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Text on the question side of the current card.
    pub fn front(&self) -> &str {
        self.direction.prompt(self.current())
    }

    /// Text on the answer side of the current card.
    pub fn back(&self) -> &str {
        self.direction.answer(self.current())
    }

    pub fn next(&mut self) {
        self.flipped = false;
        self.cursor.next();
    }

    pub fn prev(&mut self) {
        self.flipped = false;
        self.cursor.prev();
    }

    pub fn is_learned(&self, id: u32) -> bool {
        self.learned.contains(&id)
    }

    pub fn current_is_learned(&self) -> bool {
        self.is_learned(self.current().id)
    }

    /// Marks the current card as learned and moves on. Returns whether the
    /// card was newly added.
    pub fn mark_learned(&mut self) -> bool {
        let id = self.current().id;
        let inserted = self.learned.insert(id);
        debug!("Card {} marked as learned (new: {})", id, inserted);
        self.next();
        inserted
    }

    pub fn learned_count(&self) -> usize {
        self.learned.len()
    }

    pub fn progress(&self) -> LearnProgress {
        LearnProgress::new(self.learned.len(), self.cards.len())
    }

    /// Forgets learned cards, reshuffles and starts over at the first card.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.learned.clear();
        self.cards = shuffle(&self.cards, rng);
        self.cursor.rewind();
        self.flipped = false;
    }
}
