pub mod config;
pub mod content;
pub mod quiz;
pub mod render;

pub use config::{Config, ConfigError};
pub use content::{ContentError, ContentStore, Entry};
pub use quiz::{Direction, Question, QuizError};
