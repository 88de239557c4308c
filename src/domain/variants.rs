//! Variant selectors and the tagged entry type validated at the store boundary.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::content::{AudioNarration, SimplifiedVersion, VideoExplainer, VisualMap};
use crate::domain::error::DomainError;
use crate::domain::types::{ReadingLevel, VariantKind, VideoSource, VisualMapFormat};

/// Identifies one variant within a kind's sub-collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantSelector {
    Simplified(ReadingLevel),
    VisualMap(VisualMapFormat),
    Audio { language: String },
    Video(VideoSource),
}

impl VariantSelector {
    pub fn kind(&self) -> VariantKind {
        match self {
            VariantSelector::Simplified(_) => VariantKind::Simplified,
            VariantSelector::VisualMap(_) => VariantKind::VisualMap,
            VariantSelector::Audio { .. } => VariantKind::Audio,
            VariantSelector::Video(_) => VariantKind::Video,
        }
    }

    /// Build a selector from wire tokens, e.g. `("simplified", "easy")`.
    /// Unknown kinds and enum values are validation errors.
    pub fn from_parts(kind: &str, selector: &str) -> Result<Self, DomainError> {
        match kind {
            "simplified" => ReadingLevel::try_from(selector)
                .map(Self::Simplified)
                .map_err(|()| {
                    DomainError::validation(format!("unknown reading level `{selector}`"))
                }),
            "visual_map" => VisualMapFormat::try_from(selector)
                .map(Self::VisualMap)
                .map_err(|()| {
                    DomainError::validation(format!("unknown visual map format `{selector}`"))
                }),
            "audio" => {
                if selector.trim().is_empty() {
                    return Err(DomainError::validation("narration language is empty"));
                }
                Ok(Self::Audio {
                    language: selector.trim().to_string(),
                })
            }
            "video" => VideoSource::try_from(selector)
                .map(Self::Video)
                .map_err(|()| {
                    DomainError::validation(format!("unknown video source `{selector}`"))
                }),
            _ => Err(DomainError::validation(format!(
                "unknown variant kind `{kind}`"
            ))),
        }
    }

    /// Canonical selector token, used in cache keys and API responses.
    pub fn key(&self) -> String {
        match self {
            VariantSelector::Simplified(level) => level.as_str().to_string(),
            VariantSelector::VisualMap(format) => format.as_str().to_string(),
            VariantSelector::Audio { language } => language.to_lowercase(),
            VariantSelector::Video(source) => source.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for VariantSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.key())
    }
}

/// One entry destined for (or read from) a variant sub-collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariantEntry {
    Simplified(SimplifiedVersion),
    VisualMap(VisualMap),
    Audio(AudioNarration),
    Video(VideoExplainer),
}

impl VariantEntry {
    pub fn kind(&self) -> VariantKind {
        match self {
            VariantEntry::Simplified(_) => VariantKind::Simplified,
            VariantEntry::VisualMap(_) => VariantKind::VisualMap,
            VariantEntry::Audio(_) => VariantKind::Audio,
            VariantEntry::Video(_) => VariantKind::Video,
        }
    }

    pub fn created_at(&self) -> OffsetDateTime {
        match self {
            VariantEntry::Simplified(entry) => entry.created_at,
            VariantEntry::VisualMap(entry) => entry.created_at,
            VariantEntry::Audio(entry) => entry.created_at,
            VariantEntry::Video(entry) => entry.created_at,
        }
    }

    pub fn matches(&self, selector: &VariantSelector) -> bool {
        match (self, selector) {
            (VariantEntry::Simplified(entry), VariantSelector::Simplified(level)) => {
                entry.level == *level
            }
            (VariantEntry::VisualMap(entry), VariantSelector::VisualMap(format)) => {
                entry.format == *format
            }
            (VariantEntry::Audio(entry), VariantSelector::Audio { language }) => {
                entry.language.eq_ignore_ascii_case(language)
            }
            (VariantEntry::Video(entry), VariantSelector::Video(source)) => {
                entry.source == *source
            }
            _ => false,
        }
    }

    /// Reject structurally empty entries before they reach storage.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            VariantEntry::Simplified(entry) => {
                ensure_non_blank(&entry.text, "simplified text")?;
            }
            VariantEntry::VisualMap(entry) => {
                ensure_non_blank(&entry.data, "visual map data")?;
            }
            VariantEntry::Audio(entry) => {
                ensure_non_blank(&entry.language, "narration language")?;
                ensure_non_blank(&entry.voice, "narration voice")?;
                ensure_non_blank(&entry.url, "narration url")?;
            }
            VariantEntry::Video(entry) => {
                ensure_non_blank(&entry.url, "explainer url")?;
            }
        }
        Ok(())
    }
}

fn ensure_non_blank(value: &str, field: &'static str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is empty")));
    }
    Ok(())
}
