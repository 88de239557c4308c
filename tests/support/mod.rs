//! Shared in-memory fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use chiaro::application::access::Actor;
use chiaro::application::repos::{
    AuditRepo, ContentQueryFilter, ContentRepo, ContentSort, ContentWriteRepo,
    CreateContentParams, RepoError, SortDirection, SortField, UpdateContentParams,
};
use chiaro::application::resolver::{GeneratedPayload, GeneratorError, VariantGenerator};
use chiaro::domain::audit::AuditLogRecord;
use chiaro::domain::content::{ContentRecord, MediaAttachments};
use chiaro::domain::topic::Topic;
use chiaro::domain::types::Role;
use chiaro::domain::variants::{VariantEntry, VariantSelector};

/// Content store with the same observable semantics as the Postgres
/// adapter, backed by a record vector in insertion order.
#[derive(Default)]
pub struct MemoryContentStore {
    records: RwLock<Vec<ContentRecord>>,
}

impl MemoryContentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self, topic: &Topic) -> Option<ContentRecord> {
        self.records
            .read()
            .unwrap()
            .iter()
            .find(|record| record.topic == *topic)
            .cloned()
    }
}

#[async_trait]
impl ContentRepo for MemoryContentStore {
    async fn find_by_topic(&self, topic: &Topic) -> Result<Option<ContentRecord>, RepoError> {
        Ok(self.snapshot(topic))
    }

    async fn list_contents(
        &self,
        filter: &ContentQueryFilter,
        sort: ContentSort,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ContentRecord>, RepoError> {
        let records = self.records.read().unwrap();
        let mut matching: Vec<ContentRecord> = records
            .iter()
            .filter(|record| matches_filter(record, filter))
            .cloned()
            .collect();

        // Stable sort keeps insertion order for equal keys, mirroring the
        // `seq ASC` tie-break in SQL.
        matching.sort_by(|a, b| {
            let ordering = match sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Topic => a.topic.as_str().cmp(b.topic.as_str()),
            };
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Ok(matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect())
    }

    async fn count_contents(&self, filter: &ContentQueryFilter) -> Result<u64, RepoError> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|record| matches_filter(record, filter))
            .count() as u64)
    }
}

#[async_trait]
impl ContentWriteRepo for MemoryContentStore {
    async fn create_content(&self, params: CreateContentParams) -> Result<ContentRecord, RepoError> {
        let mut records = self.records.write().unwrap();
        if records.iter().any(|record| record.topic == params.topic) {
            return Err(RepoError::Duplicate {
                constraint: "contents_topic_key".to_string(),
            });
        }

        let now = OffsetDateTime::now_utc();
        let record = ContentRecord {
            id: Uuid::new_v4(),
            topic: params.topic,
            original_text: params.original_text,
            simplified_versions: Vec::new(),
            visual_maps: Vec::new(),
            audio_narrations: Vec::new(),
            video_explainers: Vec::new(),
            tags: params.tags,
            media: MediaAttachments {
                image_urls: params.image_urls,
            },
            created_by: params.created_by,
            last_updated_by: params.created_by,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn append_variant(
        &self,
        topic: &Topic,
        entry: VariantEntry,
    ) -> Result<ContentRecord, RepoError> {
        entry.validate().map_err(|err| RepoError::InvalidInput {
            message: err.to_string(),
        })?;

        let mut records = self.records.write().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.topic == *topic)
            .ok_or(RepoError::NotFound)?;

        match entry {
            VariantEntry::Simplified(value) => record.simplified_versions.push(value),
            VariantEntry::VisualMap(value) => record.visual_maps.push(value),
            VariantEntry::Audio(value) => record.audio_narrations.push(value),
            VariantEntry::Video(value) => record.video_explainers.push(value),
        }
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn update_content(
        &self,
        topic: &Topic,
        params: UpdateContentParams,
    ) -> Result<ContentRecord, RepoError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.topic == *topic)
            .ok_or(RepoError::NotFound)?;

        if let Some(original_text) = params.original_text {
            record.original_text = original_text;
        }
        if let Some(tags) = params.tags {
            record.tags = tags;
        }
        if let Some(image_urls) = params.image_urls {
            record.media.image_urls = image_urls;
        }
        if let Some(audio_narrations) = params.audio_narrations {
            record.audio_narrations = audio_narrations;
        }
        if let Some(video_explainers) = params.video_explainers {
            record.video_explainers = video_explainers;
        }
        record.last_updated_by = params.updated_by;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_content(&self, topic: &Topic) -> Result<(), RepoError> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|record| record.topic != *topic);
        if records.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

fn matches_filter(record: &ContentRecord, filter: &ContentQueryFilter) -> bool {
    if let Some(tag) = filter.tag.as_ref() {
        if !record.tags.iter().any(|candidate| candidate == tag) {
            return false;
        }
    }

    if let Some(search) = filter.search.as_ref() {
        let needle = search.to_lowercase();
        let in_topic = record.topic.as_str().contains(&needle);
        let in_text = record.original_text.to_lowercase().contains(&needle);
        let in_tags = record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle));
        if !(in_topic || in_text || in_tags) {
            return false;
        }
    }

    true
}

#[derive(Default)]
pub struct MemoryAuditRepo {
    pub entries: Mutex<Vec<AuditLogRecord>>,
}

impl MemoryAuditRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AuditRepo for MemoryAuditRepo {
    async fn append_log(&self, record: AuditLogRecord) -> Result<(), RepoError> {
        self.entries.lock().unwrap().push(record);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogRecord>, RepoError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().rev().take(limit as usize).cloned().collect())
    }
}

type RespondFn =
    dyn Fn(&str, &VariantSelector) -> Result<GeneratedPayload, GeneratorError> + Send + Sync;

/// Generator stub with a call counter and a scripted response.
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    respond: Box<RespondFn>,
}

impl ScriptedGenerator {
    pub fn with(
        respond: impl Fn(&str, &VariantSelector) -> Result<GeneratedPayload, GeneratorError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
        })
    }

    /// Produces a plausible payload for every selector kind.
    pub fn echoing() -> Arc<Self> {
        Self::with(|original_text, selector| {
            Ok(match selector {
                VariantSelector::Simplified(level) => GeneratedPayload::Simplified {
                    text: format!("{} [{}]", original_text, level.as_str()),
                },
                VariantSelector::VisualMap(format) => GeneratedPayload::VisualMap {
                    data: format!("outline of: {original_text}"),
                    notes: Some(format!("format {}", format.as_str())),
                },
                VariantSelector::Audio { language } => GeneratedPayload::Audio {
                    voice: "nova".to_string(),
                    url: format!("https://cdn.example/{language}/narration.mp3"),
                },
                VariantSelector::Video(source) => GeneratedPayload::Video {
                    source: *source,
                    url: "https://videos.example/explainer".to_string(),
                    title: Some("Explainer".to_string()),
                    description: None,
                },
            })
        })
    }

    pub fn failing(reason: &'static str) -> Arc<Self> {
        Self::with(move |_, _| Err(GeneratorError::Backend(reason.to_string())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VariantGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        original_text: &str,
        selector: &VariantSelector,
    ) -> Result<GeneratedPayload, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(original_text, selector)
    }
}

pub fn user_actor() -> Actor {
    Actor::new(Uuid::new_v4(), Role::User)
}

pub fn creator_actor() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Creator)
}

pub fn admin_actor() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

pub fn topic(raw: &str) -> Topic {
    Topic::parse(raw).expect("valid topic")
}
