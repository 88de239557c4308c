//! Shared request and response types for the chiaro learning-content core.
//!
//! Page and controller code talks to the core services through these shapes.
//! Field names are camelCase on the wire so existing persisted records and
//! frontend consumers keep working unchanged.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One resolved alternate representation of a topic's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantResponse {
    pub topic: String,
    /// Variant kind: `simplified`, `visual_map`, `audio`, or `video`.
    pub kind: String,
    /// Selector within the kind (reading level, map format, language, source).
    pub selector: String,
    /// The stored entry, serialized with its persisted field names.
    pub payload: serde_json::Value,
    pub from_cache: bool,
}

/// Condensed content row for management listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub id: Uuid,
    pub topic: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub simplified_count: u32,
    pub visual_map_count: u32,
    pub audio_count: u32,
    pub video_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Paginated listing envelope returned by the query service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListResponse {
    pub items: Vec<ContentSummary>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub topic: String,
    pub original_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Partial update; omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
}

/// Machine-readable error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// One of `not_found`, `conflict`, `forbidden`, `validation`,
    /// `generation_failed`, `unavailable`, `internal`.
    pub kind: String,
    pub message: String,
}
