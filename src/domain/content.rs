//! Content records mirrored from persistent storage.
//!
//! Field names are camelCase on the wire (serde rename) because existing
//! persisted records use them; any storage engine must preserve both the
//! names and the sub-collection ordering. Sub-collections are append-only
//! from the resolver's perspective and the first entry per selector is
//! canonical.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::topic::Topic;
use crate::domain::types::{ReadingLevel, VideoSource, VisualMapFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: Uuid,
    pub topic: Topic,
    pub original_text: String,
    #[serde(default)]
    pub simplified_versions: Vec<SimplifiedVersion>,
    #[serde(default)]
    pub visual_maps: Vec<VisualMap>,
    #[serde(default)]
    pub audio_narrations: Vec<AudioNarration>,
    #[serde(default)]
    pub video_explainers: Vec<VideoExplainer>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub media: MediaAttachments,
    pub created_by: Option<Uuid>,
    pub last_updated_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ContentRecord {
    /// First simplified rendition for the level, in insertion order.
    pub fn find_simplified(&self, level: ReadingLevel) -> Option<&SimplifiedVersion> {
        self.simplified_versions
            .iter()
            .find(|entry| entry.level == level)
    }

    /// First visual map for the format, in insertion order.
    pub fn find_visual_map(&self, format: VisualMapFormat) -> Option<&VisualMap> {
        self.visual_maps.iter().find(|entry| entry.format == format)
    }

    /// First narration for the language, in insertion order. Language tags
    /// compare case-insensitively ("en-US" matches "en-us").
    pub fn find_audio(&self, language: &str) -> Option<&AudioNarration> {
        self.audio_narrations
            .iter()
            .find(|entry| entry.language.eq_ignore_ascii_case(language))
    }

    /// First explainer from the source, in insertion order.
    pub fn find_video(&self, source: VideoSource) -> Option<&VideoExplainer> {
        self.video_explainers
            .iter()
            .find(|entry| entry.source == source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedVersion {
    pub level: ReadingLevel,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualMap {
    pub format: VisualMapFormat,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioNarration {
    pub language: String,
    pub voice: String,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoExplainer {
    pub source: VideoSource,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Non-variant media attached to a record by its editors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachments {
    #[serde(default)]
    pub image_urls: Vec<String>,
}
