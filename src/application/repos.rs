//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::audit::AuditLogRecord;
use crate::domain::content::{AudioNarration, ContentRecord, VideoExplainer};
use crate::domain::topic::Topic;
use crate::domain::variants::VariantEntry;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentQueryFilter {
    /// Case-insensitive substring over topic, tags, and original text.
    pub search: Option<String>,
    /// Exact match against the tags set.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Topic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Listing order; ties are always broken by creation order ascending so
/// pagination stays deterministic across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ContentSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateContentParams {
    pub topic: Topic,
    pub original_text: String,
    pub tags: Vec<String>,
    pub image_urls: Vec<String>,
    pub created_by: Option<Uuid>,
}

/// Partial update; `None` fields are left untouched. Provided collections
/// replace the stored ones wholesale.
#[derive(Debug, Clone, Default)]
pub struct UpdateContentParams {
    pub original_text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub audio_narrations: Option<Vec<AudioNarration>>,
    pub video_explainers: Option<Vec<VideoExplainer>>,
    pub updated_by: Option<Uuid>,
}

impl UpdateContentParams {
    pub fn is_empty(&self) -> bool {
        self.original_text.is_none()
            && self.tags.is_none()
            && self.image_urls.is_none()
            && self.audio_narrations.is_none()
            && self.video_explainers.is_none()
    }
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn find_by_topic(&self, topic: &Topic) -> Result<Option<ContentRecord>, RepoError>;

    async fn list_contents(
        &self,
        filter: &ContentQueryFilter,
        sort: ContentSort,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ContentRecord>, RepoError>;

    async fn count_contents(&self, filter: &ContentQueryFilter) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait ContentWriteRepo: Send + Sync {
    async fn create_content(&self, params: CreateContentParams) -> Result<ContentRecord, RepoError>;

    /// Atomically push `entry` onto its kind's sub-collection and refresh
    /// `updatedAt`. Appends to different sub-collections or selectors must
    /// not lose each other.
    async fn append_variant(
        &self,
        topic: &Topic,
        entry: VariantEntry,
    ) -> Result<ContentRecord, RepoError>;

    async fn update_content(
        &self,
        topic: &Topic,
        params: UpdateContentParams,
    ) -> Result<ContentRecord, RepoError>;

    /// Hard delete; irreversible. `NotFound` when the topic is absent.
    async fn delete_content(&self, topic: &Topic) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AuditRepo: Send + Sync {
    async fn append_log(&self, record: AuditLogRecord) -> Result<(), RepoError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogRecord>, RepoError>;
}
