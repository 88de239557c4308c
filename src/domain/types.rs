//! Shared domain enumerations aligned with persisted variant entries.

use serde::{Deserialize, Serialize};

/// Reading difficulty of a simplified text rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingLevel {
    Easy,
    Moderate,
    Advanced,
}

impl ReadingLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingLevel::Easy => "easy",
            ReadingLevel::Moderate => "moderate",
            ReadingLevel::Advanced => "advanced",
        }
    }
}

impl TryFrom<&str> for ReadingLevel {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "easy" => Ok(ReadingLevel::Easy),
            "moderate" => Ok(ReadingLevel::Moderate),
            "advanced" => Ok(ReadingLevel::Advanced),
            _ => Err(()),
        }
    }
}

/// Data format of a visual concept map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualMapFormat {
    Mermaid,
    JsonGraph,
    TextOutline,
}

impl VisualMapFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            VisualMapFormat::Mermaid => "mermaid",
            VisualMapFormat::JsonGraph => "json_graph",
            VisualMapFormat::TextOutline => "text_outline",
        }
    }
}

impl TryFrom<&str> for VisualMapFormat {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "mermaid" => Ok(VisualMapFormat::Mermaid),
            "json_graph" => Ok(VisualMapFormat::JsonGraph),
            "text_outline" => Ok(VisualMapFormat::TextOutline),
            _ => Err(()),
        }
    }
}

/// Origin of a video explainer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    Youtube,
    Vimeo,
    CustomUpload,
    Generated,
}

impl VideoSource {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoSource::Youtube => "youtube",
            VideoSource::Vimeo => "vimeo",
            VideoSource::CustomUpload => "custom_upload",
            VideoSource::Generated => "generated",
        }
    }
}

impl TryFrom<&str> for VideoSource {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "youtube" => Ok(VideoSource::Youtube),
            "vimeo" => Ok(VideoSource::Vimeo),
            "custom_upload" => Ok(VideoSource::CustomUpload),
            "generated" => Ok(VideoSource::Generated),
            _ => Err(()),
        }
    }
}

/// Kind of alternate representation held in a content sub-collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Simplified,
    VisualMap,
    Audio,
    Video,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Simplified => "simplified",
            VariantKind::VisualMap => "visual_map",
            VariantKind::Audio => "audio",
            VariantKind::Video => "video",
        }
    }
}

/// Caller role supplied by the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Creator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Creator => "creator",
            Role::Admin => "admin",
        }
    }

    /// Creators and admins both manage all content; there is no per-author
    /// restriction.
    pub fn can_manage_content(self) -> bool {
        matches!(self, Role::Creator | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "creator" => Ok(Role::Creator),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}
