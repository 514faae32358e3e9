use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use super::{Antonym, Entry, Paradigm, Pronoun, PARADIGM_SLOTS, PRONOUNS};

const BUILTIN_VOCABULARY: &str = include_str!("../../data/vocabulary.json");

pub const ALL_CATEGORY: &str = "all";
pub const VERBS_CATEGORY: &str = "verbs";
pub const GRAMMAR_CATEGORY: &str = "grammar";
pub const ANTONYMS_CATEGORY: &str = "antonyms";
pub const PARTICLES_CATEGORY: &str = "particles";

// Offsets applied when every collection is merged into the "all" category.
const VERB_ID_OFFSET: u32 = 1000;
const GRAMMAR_ID_OFFSET: u32 = 2000;
const ANTONYM_ID_OFFSET: u32 = 3000;

/// Question counts offered in the quiz setup.
pub const QUESTION_COUNTS: [usize; 5] = [5, 10, 15, 20, 30];

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to open vocabulary file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed vocabulary data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate id {id} in collection '{collection}'")]
    DuplicateId { collection: String, id: u32 },
    #[error("id {id} in collection '{collection}' overflows when merged into 'all'")]
    IdOverflow { collection: String, id: u32 },
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub name: String,
    pub name_arabic: String,
}

#[derive(Debug, serde::Deserialize)]
struct RawVocabulary {
    #[serde(default)]
    categories: Vec<RawCategory>,
    #[serde(default)]
    nouns: HashMap<String, Vec<RawItem>>,
    #[serde(default)]
    verbs: Vec<RawVerb>,
    #[serde(default)]
    grammar: Vec<RawItem>,
    #[serde(default)]
    antonyms: Vec<RawAntonym>,
    #[serde(default)]
    particles: BTreeMap<String, Vec<RawItem>>,
}

#[derive(Debug, serde::Deserialize)]
struct RawCategory {
    id: String,
    name: String,
    #[serde(rename = "nameAr")]
    name_arabic: String,
}

#[derive(Debug, serde::Deserialize)]
struct RawItem {
    id: u32,
    arabic: String,
    german: String,
    emoji: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct RawVerb {
    id: u32,
    arabic: String,
    german: String,
    emoji: Option<String>,
    past: Option<[String; PARADIGM_SLOTS]>,
    present: Option<[String; PARADIGM_SLOTS]>,
}

#[derive(Debug, serde::Deserialize)]
struct RawAntonym {
    id: u32,
    arabic: String,
    german: String,
    opposite: String,
    #[serde(rename = "oppositeGerman")]
    opposite_german: String,
    emoji: Option<String>,
}

impl From<RawItem> for Entry {
    fn from(raw: RawItem) -> Self {
        Entry {
            emoji: raw.emoji,
            ..Entry::new(raw.id, raw.arabic, raw.german)
        }
    }
}

impl From<RawVerb> for Entry {
    fn from(raw: RawVerb) -> Self {
        let paradigm = match (raw.past, raw.present) {
            (Some(past), Some(present)) => Some(Paradigm { past, present }),
            _ => None,
        };
        Entry {
            paradigm,
            emoji: raw.emoji,
            ..Entry::new(raw.id, raw.arabic, raw.german)
        }
    }
}

impl From<RawAntonym> for Entry {
    fn from(raw: RawAntonym) -> Self {
        Entry {
            antonym: Some(Antonym {
                arabic: raw.opposite,
                german: raw.opposite_german,
            }),
            emoji: raw.emoji,
            ..Entry::new(raw.id, raw.arabic, raw.german)
        }
    }
}

/// Read-only vocabulary collections, selectable by category key.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    categories: Vec<Category>,
    nouns: HashMap<String, Vec<Entry>>,
    verbs: Vec<Entry>,
    grammar: Vec<Entry>,
    antonyms: Vec<Entry>,
    particles: Vec<Entry>,
}

impl ContentStore {
    /// The dataset compiled into the binary.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json_str(BUILTIN_VOCABULARY)
    }

    pub fn open(path: &Path) -> Result<Self, ContentError> {
        let file = File::open(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!("Loaded vocabulary from {:?}", path);
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ContentError> {
        let raw: RawVocabulary = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let raw: RawVocabulary = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawVocabulary) -> Result<Self, ContentError> {
        let categories = raw
            .categories
            .into_iter()
            .map(|c| Category {
                key: c.id,
                name: c.name,
                name_arabic: c.name_arabic,
            })
            .collect::<Vec<_>>();

        let mut nouns = HashMap::new();
        for (key, items) in raw.nouns {
            nouns.insert(key, items.into_iter().map(Entry::from).collect::<Vec<_>>());
        }

        let store = Self {
            categories,
            nouns,
            verbs: raw.verbs.into_iter().map(Entry::from).collect(),
            grammar: raw.grammar.into_iter().map(Entry::from).collect(),
            antonyms: raw.antonyms.into_iter().map(Entry::from).collect(),
            // BTreeMap keeps the group order stable
            particles: raw
                .particles
                .into_values()
                .flatten()
                .map(Entry::from)
                .collect(),
        };
        store.validate()?;

        info!(
            "Content store ready: {} noun categories, {} verbs, {} grammar terms, {} antonyms, {} particles",
            store.nouns.len(),
            store.verbs.len(),
            store.grammar.len(),
            store.antonyms.len(),
            store.particles.len()
        );
        Ok(store)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let all_nouns = self.all_nouns();
        let collections: [(&str, Vec<&Entry>); 5] = [
            ("nouns", all_nouns),
            (VERBS_CATEGORY, self.verbs.iter().collect()),
            (GRAMMAR_CATEGORY, self.grammar.iter().collect()),
            (ANTONYMS_CATEGORY, self.antonyms.iter().collect()),
            (PARTICLES_CATEGORY, self.particles.iter().collect()),
        ];
        for (collection, entries) in collections {
            let mut seen = HashSet::new();
            for entry in entries {
                if !seen.insert(entry.id) {
                    return Err(ContentError::DuplicateId {
                        collection: collection.to_string(),
                        id: entry.id,
                    });
                }
            }
        }

        // Offsets alone do not keep the merged ids apart, e.g. noun 1001 and verb 1.
        let mut seen = HashSet::new();
        for entry in self.merged()? {
            if !seen.insert(entry.id) {
                return Err(ContentError::DuplicateId {
                    collection: ALL_CATEGORY.to_string(),
                    id: entry.id,
                });
            }
        }
        Ok(())
    }

    /// Nouns as-is, then verbs, grammar and antonyms under their offsets.
    fn merged(&self) -> Result<Vec<Entry>, ContentError> {
        let mut all = self.all_nouns().into_iter().cloned().collect::<Vec<_>>();
        let shifted = [
            (VERBS_CATEGORY, &self.verbs, VERB_ID_OFFSET),
            (GRAMMAR_CATEGORY, &self.grammar, GRAMMAR_ID_OFFSET),
            (ANTONYMS_CATEGORY, &self.antonyms, ANTONYM_ID_OFFSET),
        ];
        for (collection, entries, offset) in shifted {
            for entry in entries {
                let moved = entry.remapped(offset).ok_or_else(|| ContentError::IdOverflow {
                    collection: collection.to_string(),
                    id: entry.id,
                })?;
                all.push(moved);
            }
        }
        Ok(all)
    }

    fn all_nouns(&self) -> Vec<&Entry> {
        let mut out = Vec::new();
        for category in &self.categories {
            if let Some(items) = self.nouns.get(&category.key) {
                out.extend(items.iter());
            }
        }
        // Noun groups without a category header still count.
        let mut orphans = self
            .nouns
            .keys()
            .filter(|key| !self.categories.iter().any(|c| &c.key == *key))
            .collect::<Vec<_>>();
        orphans.sort();
        for key in orphans {
            out.extend(self.nouns[key].iter());
        }
        out
    }

    /// Selectable categories: "all", the noun categories, then the fixed collections.
    pub fn categories(&self) -> Vec<Category> {
        let mut out = vec![Category {
            key: ALL_CATEGORY.to_string(),
            name: "Alle Vokabeln".to_string(),
            name_arabic: "جميع المفردات".to_string(),
        }];
        out.extend(self.categories.iter().cloned());
        let fixed = [
            (VERBS_CATEGORY, "Verben", "الأفعال"),
            (GRAMMAR_CATEGORY, "Grammatik", "القواعد"),
            (ANTONYMS_CATEGORY, "Gegensätze", "الأضداد"),
            (PARTICLES_CATEGORY, "Partikeln", "الحروف"),
        ];
        for (key, name, name_arabic) in fixed {
            out.push(Category {
                key: key.to_string(),
                name: name.to_string(),
                name_arabic: name_arabic.to_string(),
            });
        }
        out
    }

    pub fn category_by_name(&self, name: &str) -> Option<Category> {
        self.categories()
            .into_iter()
            .find(|c| c.name == name || c.key == name)
    }

    /// Entries of one category. "all" merges nouns, verbs, grammar and antonyms
    /// with offset ids so they stay unique.
    pub fn entries(&self, category: &str) -> Result<Vec<Entry>, ContentError> {
        let entries = match category {
            ALL_CATEGORY => self.merged()?,
            VERBS_CATEGORY => self.verbs.clone(),
            GRAMMAR_CATEGORY => self.grammar.clone(),
            ANTONYMS_CATEGORY => self.antonyms.clone(),
            PARTICLES_CATEGORY => self.particles.clone(),
            other => self
                .nouns
                .get(other)
                .cloned()
                .ok_or_else(|| ContentError::UnknownCategory(other.to_string()))?,
        };
        Ok(entries)
    }

    /// Entries of `category` whose Arabic text contains `term`, or whose German
    /// text contains it ignoring case. A blank term lists the whole category.
    pub fn search(&self, category: &str, term: &str) -> Result<Vec<Entry>, ContentError> {
        let term = term.trim();
        let needle = term.to_lowercase();
        Ok(self
            .entries(category)?
            .into_iter()
            .filter(|e| e.arabic.contains(term) || e.german.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn verbs(&self) -> &[Entry] {
        &self.verbs
    }

    /// Verbs that carry a full paradigm.
    pub fn conjugable_verbs(&self) -> Vec<Entry> {
        self.verbs
            .iter()
            .filter(|v| v.paradigm.is_some())
            .cloned()
            .collect()
    }

    pub fn pronouns(&self) -> &'static [Pronoun] {
        &PRONOUNS
    }
}

/// Count choices that do not exceed the number of available entries.
pub fn question_counts(available: usize) -> Vec<usize> {
    QUESTION_COUNTS
        .iter()
        .copied()
        .filter(|n| *n <= available)
        .collect()
}
