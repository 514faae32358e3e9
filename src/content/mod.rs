pub mod store;

pub use store::{Category, ContentError, ContentStore};

/// Number of pronoun slots a paradigm row is aligned to.
pub const PARADIGM_SLOTS: usize = 6;

/// One learnable vocabulary or verb record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub id: u32,
    pub arabic: String,
    pub german: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paradigm: Option<Paradigm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antonym: Option<Antonym>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl Entry {
    pub fn new(id: u32, arabic: impl Into<String>, german: impl Into<String>) -> Self {
        Self {
            id,
            arabic: arabic.into(),
            german: german.into(),
            paradigm: None,
            antonym: None,
            emoji: None,
        }
    }

    pub fn with_paradigm(mut self, paradigm: Paradigm) -> Self {
        self.paradigm = Some(paradigm);
        self
    }

    pub fn with_antonym(mut self, antonym: Antonym) -> Self {
        self.antonym = Some(antonym);
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Same entry under a shifted id, used when collections are merged.
    /// `None` when the shifted id does not fit into `u32`.
    pub fn remapped(&self, offset: u32) -> Option<Self> {
        Some(Self {
            id: self.id.checked_add(offset)?,
            ..self.clone()
        })
    }

    /// The first part of a "past – present" headword, or the whole headword.
    pub fn base_form(&self) -> &str {
        self.arabic
            .split(|c| c == '–' || c == '-')
            .map(str::trim)
            .find(|part| !part.is_empty())
            .unwrap_or(self.arabic.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Antonym {
    pub arabic: String,
    pub german: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Tense {
    Past,
    Present,
}

impl Tense {
    pub fn arabic(&self) -> &'static str {
        match self {
            Tense::Past => "الماضي",
            Tense::Present => "المضارع",
        }
    }

    pub fn german(&self) -> &'static str {
        match self {
            Tense::Past => "Vergangenheit",
            Tense::Present => "Gegenwart",
        }
    }
}

/// Conjugated forms of a verb, each row indexed by [`PronounSlot`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Paradigm {
    pub past: [String; PARADIGM_SLOTS],
    pub present: [String; PARADIGM_SLOTS],
}

impl Paradigm {
    pub fn forms(&self, tense: Tense) -> &[String; PARADIGM_SLOTS] {
        match tense {
            Tense::Past => &self.past,
            Tense::Present => &self.present,
        }
    }

    pub fn form(&self, tense: Tense, slot: PronounSlot) -> &str {
        &self.forms(tense)[slot.index()]
    }
}

/// The fixed six-slot pronoun order used by every paradigm row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PronounSlot {
    FirstSingular,
    FirstPlural,
    SecondMasculine,
    SecondFeminine,
    ThirdMasculine,
    ThirdFeminine,
}

impl PronounSlot {
    pub const ALL: [PronounSlot; PARADIGM_SLOTS] = [
        PronounSlot::FirstSingular,
        PronounSlot::FirstPlural,
        PronounSlot::SecondMasculine,
        PronounSlot::SecondFeminine,
        PronounSlot::ThirdMasculine,
        PronounSlot::ThirdFeminine,
    ];

    pub fn index(&self) -> usize {
        match self {
            PronounSlot::FirstSingular => 0,
            PronounSlot::FirstPlural => 1,
            PronounSlot::SecondMasculine => 2,
            PronounSlot::SecondFeminine => 3,
            PronounSlot::ThirdMasculine => 4,
            PronounSlot::ThirdFeminine => 5,
        }
    }

    pub fn pronoun(&self) -> &'static Pronoun {
        &PRONOUNS[self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pronoun {
    pub arabic: &'static str,
    pub german: &'static str,
    pub person: &'static str,
}

pub static PRONOUNS: [Pronoun; PARADIGM_SLOTS] = [
    Pronoun { arabic: "أنا", german: "ich", person: "1. Sg" },
    Pronoun { arabic: "نحن", german: "wir", person: "1. Pl" },
    Pronoun { arabic: "أنتَ", german: "du (m)", person: "2. Sg m" },
    Pronoun { arabic: "أنتِ", german: "du (w)", person: "2. Sg w" },
    Pronoun { arabic: "هو", german: "er", person: "3. Sg m" },
    Pronoun { arabic: "هي", german: "sie", person: "3. Sg w" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_form_takes_past_part() {
        let entry = Entry::new(1, "كَتَبَ – يَكتُبُ", "schreiben");
        assert_eq!(entry.base_form(), "كَتَبَ");

        let noun = Entry::new(2, " بَيْتٌ ", "Haus");
        assert_eq!(noun.base_form(), "بَيْتٌ");
    }

    #[test]
    fn slots_follow_pronoun_table() {
        for (i, slot) in PronounSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
        assert_eq!(PronounSlot::ThirdFeminine.pronoun().arabic, "هي");
        assert_eq!(PronounSlot::FirstPlural.pronoun().german, "wir");
    }

    #[test]
    fn remapped_keeps_content() {
        let entry = Entry::new(3, "نَصَرَ", "helfen").with_emoji("🤝");
        let moved = entry.remapped(1000).unwrap();
        assert_eq!(moved.id, 1003);
        assert_eq!(moved.german, "helfen");
        assert_eq!(moved.emoji.as_deref(), Some("🤝"));
    }

    #[test]
    fn remapped_refuses_overflow() {
        let entry = Entry::new(u32::MAX - 10, "نَصَرَ", "helfen");
        assert!(entry.remapped(1000).is_none());
        assert_eq!(entry.remapped(10).map(|e| e.id), Some(u32::MAX));
    }
}
