use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::content::{ContentError, ContentStore};
use crate::quiz::negation::DEFAULT_NEGATION_COUNT;
use crate::quiz::Direction;

pub const VOCABULARY_PATH_VAR: &str = "TRAINER_VOCABULARY_PATH";
pub const DEFAULT_DIRECTION_VAR: &str = "TRAINER_DEFAULT_DIRECTION";
pub const NEGATION_COUNT_VAR: &str = "TRAINER_NEGATION_COUNT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Vocabulary JSON replacing the built-in dataset.
    pub vocabulary_path: Option<PathBuf>,
    pub default_direction: Direction,
    pub negation_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocabulary_path: None,
            default_direction: Direction::default(),
            negation_count: DEFAULT_NEGATION_COUNT,
        }
    }
}

impl Config {
    /// Reads the process environment (call `dotenv()` beforehand to pick up a `.env` file).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(VOCABULARY_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.vocabulary_path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup(DEFAULT_DIRECTION_VAR) {
            config.default_direction = value.parse().map_err(|reason| ConfigError::Invalid {
                key: DEFAULT_DIRECTION_VAR,
                value: value.clone(),
                reason,
            })?;
        }

        if let Some(value) = lookup(NEGATION_COUNT_VAR) {
            config.negation_count = match value.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: NEGATION_COUNT_VAR,
                        value,
                        reason: "must be at least 1".to_string(),
                    })
                }
                Ok(count) => count,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: NEGATION_COUNT_VAR,
                        value: value.clone(),
                        reason: e.to_string(),
                    })
                }
            };
        }

        Ok(config)
    }

    /// The configured vocabulary file, or the built-in dataset.
    pub fn load_content(&self) -> Result<ContentStore, ContentError> {
        match &self.vocabulary_path {
            Some(path) => ContentStore::open(path),
            None => {
                info!("Using built-in vocabulary");
                ContentStore::builtin()
            }
        }
    }
}
