//! Topic identifiers and their normalization rules.
//!
//! Topics are the unique key of the content store. Lookups and uniqueness
//! checks must not depend on how a topic was typed, so every entry point
//! funnels through [`Topic::parse`]: trim, lowercase, and collapse internal
//! whitespace runs to single spaces. `"  Photosynthesis "` and
//! `"photosynthesis"` name the same record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while normalizing a topic identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("topic is empty")]
    Empty,
}

/// A normalized topic identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Normalize the provided human-typed topic.
    pub fn parse(input: &str) -> Result<Self, TopicError> {
        let normalized = input
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        if normalized.is_empty() {
            return Err(TopicError::Empty);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Topic {
    type Error = TopicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::parse(&value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}
