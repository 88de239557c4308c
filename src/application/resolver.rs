//! Adaptation cache resolver.
//!
//! Serves a requested `(topic, variant kind, selector)` from the content
//! store when a matching entry exists, otherwise delegates to the generator
//! collaborator and persists the result before returning it. Each variant is
//! generated at most once per (topic, selector) within this process; the
//! store itself still tolerates duplicate entries from multi-process races,
//! and reads always prefer the first entry in insertion order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use metrics::{counter, histogram};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use crate::application::repos::{ContentRepo, ContentWriteRepo, RepoError};
use crate::domain::content::{AudioNarration, SimplifiedVersion, VideoExplainer, VisualMap};
use crate::domain::error::DomainError;
use crate::domain::topic::Topic;
use crate::domain::types::VideoSource;
use crate::domain::variants::{VariantEntry, VariantSelector};

pub(crate) const METRIC_VARIANT_HIT: &str = "chiaro_variant_cache_hit_total";
pub(crate) const METRIC_VARIANT_MISS: &str = "chiaro_variant_cache_miss_total";
pub(crate) const METRIC_GENERATE_FAILED: &str = "chiaro_variant_generate_failed_total";
pub(crate) const METRIC_GENERATE_MS: &str = "chiaro_variant_generate_ms";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("content for topic `{topic}` not found")]
    NotFound { topic: String },
    #[error("variant generation failed: {reason}")]
    GenerationFailed { reason: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Errors surfaced by the external generator collaborator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator backend failure: {0}")]
    Backend(String),
    #[error("generator does not support `{selector}`")]
    Unsupported { selector: String },
}

/// Payload produced by the generator for one selector. The resolver stamps
/// the timestamp and the selector-derived fields when it builds the stored
/// entry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedPayload {
    Simplified {
        text: String,
    },
    VisualMap {
        data: String,
        notes: Option<String>,
    },
    Audio {
        voice: String,
        url: String,
    },
    Video {
        source: VideoSource,
        url: String,
        title: Option<String>,
        description: Option<String>,
    },
}

/// External collaborator producing variant payloads on a cache miss.
#[async_trait]
pub trait VariantGenerator: Send + Sync {
    async fn generate(
        &self,
        original_text: &str,
        selector: &VariantSelector,
    ) -> Result<GeneratedPayload, GeneratorError>;
}

/// Tracks `(topic, kind, selector)` tuples with an in-flight generation so
/// same-process concurrent misses serialize instead of both invoking the
/// generator. Keys persist for the process lifetime; the selector universe
/// per deployment is small.
#[derive(Default, Clone)]
pub struct InFlightAdaptations {
    keys: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl InFlightAdaptations {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(DashMap::new()),
        }
    }

    async fn acquire(&self, topic: &Topic, selector: &VariantSelector) -> OwnedMutexGuard<()> {
        let key = format!("{topic}\u{1f}{selector}");
        let lock = self
            .keys
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

/// Resolved variant plus whether it came from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOutcome {
    pub entry: VariantEntry,
    pub from_cache: bool,
}

impl VariantOutcome {
    /// Shape the outcome for page/controller consumers.
    pub fn to_response(
        &self,
        topic: &Topic,
        selector: &VariantSelector,
    ) -> Result<chiaro_api_types::VariantResponse, ResolveError> {
        let payload = match &self.entry {
            VariantEntry::Simplified(entry) => serde_json::to_value(entry),
            VariantEntry::VisualMap(entry) => serde_json::to_value(entry),
            VariantEntry::Audio(entry) => serde_json::to_value(entry),
            VariantEntry::Video(entry) => serde_json::to_value(entry),
        }
        .map_err(|err| DomainError::invariant(format!("unserializable variant entry: {err}")))?;

        Ok(chiaro_api_types::VariantResponse {
            topic: topic.to_string(),
            kind: self.entry.kind().as_str().to_string(),
            selector: selector.key(),
            payload,
            from_cache: self.from_cache,
        })
    }
}

pub struct AdaptationResolver {
    reader: Arc<dyn ContentRepo>,
    writer: Arc<dyn ContentWriteRepo>,
    generator: Arc<dyn VariantGenerator>,
    inflight: InFlightAdaptations,
    generation_timeout: Duration,
}

impl AdaptationResolver {
    pub fn new(
        reader: Arc<dyn ContentRepo>,
        writer: Arc<dyn ContentWriteRepo>,
        generator: Arc<dyn VariantGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            reader,
            writer,
            generator,
            inflight: InFlightAdaptations::new(),
            generation_timeout,
        }
    }

    /// Serve the requested variant, generating and persisting it on a miss.
    ///
    /// Generation failures propagate without persisting anything; a timeout
    /// of the generator call counts as a failure.
    pub async fn get_variant(
        &self,
        topic: &Topic,
        selector: &VariantSelector,
    ) -> Result<VariantOutcome, ResolveError> {
        let record = self.find_record(topic).await?;
        if let Some(entry) = find_entry(&record, selector) {
            counter!(METRIC_VARIANT_HIT).increment(1);
            debug!(topic = %topic, selector = %selector, "variant cache hit");
            return Ok(VariantOutcome {
                entry,
                from_cache: true,
            });
        }

        let _guard = self.inflight.acquire(topic, selector).await;

        // Another request may have filled the cache while we waited on the key.
        let record = self.find_record(topic).await?;
        if let Some(entry) = find_entry(&record, selector) {
            counter!(METRIC_VARIANT_HIT).increment(1);
            debug!(topic = %topic, selector = %selector, "variant cache hit after wait");
            return Ok(VariantOutcome {
                entry,
                from_cache: true,
            });
        }

        counter!(METRIC_VARIANT_MISS).increment(1);
        let generated = self.generate(&record.original_text, selector).await?;
        let entry = build_entry(generated, selector, OffsetDateTime::now_utc())?;
        entry.validate()?;

        let updated = self.writer.append_variant(topic, entry).await?;
        info!(topic = %topic, selector = %selector, "variant generated and cached");

        // Prefer the stored first match; a concurrent writer in another
        // process may have appended ahead of us.
        let entry = find_entry(&updated, selector).ok_or_else(|| {
            DomainError::invariant(format!("appended variant `{selector}` missing from record"))
        })?;

        Ok(VariantOutcome {
            entry,
            from_cache: false,
        })
    }

    async fn find_record(
        &self,
        topic: &Topic,
    ) -> Result<crate::domain::content::ContentRecord, ResolveError> {
        self.reader
            .find_by_topic(topic)
            .await?
            .ok_or_else(|| ResolveError::NotFound {
                topic: topic.to_string(),
            })
    }

    async fn generate(
        &self,
        original_text: &str,
        selector: &VariantSelector,
    ) -> Result<GeneratedPayload, ResolveError> {
        let started_at = Instant::now();
        let result = timeout(
            self.generation_timeout,
            self.generator.generate(original_text, selector),
        )
        .await;

        histogram!(METRIC_GENERATE_MS, "kind" => selector.kind().as_str())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(err)) => {
                counter!(METRIC_GENERATE_FAILED).increment(1);
                warn!(selector = %selector, error = %err, "variant generation failed");
                Err(ResolveError::GenerationFailed {
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                counter!(METRIC_GENERATE_FAILED).increment(1);
                warn!(selector = %selector, "variant generation timed out");
                Err(ResolveError::GenerationFailed {
                    reason: format!(
                        "generation timed out after {}s",
                        self.generation_timeout.as_secs()
                    ),
                })
            }
        }
    }
}

fn find_entry(
    record: &crate::domain::content::ContentRecord,
    selector: &VariantSelector,
) -> Option<VariantEntry> {
    match selector {
        VariantSelector::Simplified(level) => record
            .find_simplified(*level)
            .cloned()
            .map(VariantEntry::Simplified),
        VariantSelector::VisualMap(format) => record
            .find_visual_map(*format)
            .cloned()
            .map(VariantEntry::VisualMap),
        VariantSelector::Audio { language } => {
            record.find_audio(language).cloned().map(VariantEntry::Audio)
        }
        VariantSelector::Video(source) => {
            record.find_video(*source).cloned().map(VariantEntry::Video)
        }
    }
}

/// Combine the generator payload with the selector it was produced for. A
/// payload of the wrong kind means the collaborator misbehaved and counts as
/// a generation failure.
fn build_entry(
    payload: GeneratedPayload,
    selector: &VariantSelector,
    created_at: OffsetDateTime,
) -> Result<VariantEntry, ResolveError> {
    let entry = match (payload, selector) {
        (GeneratedPayload::Simplified { text }, VariantSelector::Simplified(level)) => {
            VariantEntry::Simplified(SimplifiedVersion {
                level: *level,
                text,
                created_at,
            })
        }
        (GeneratedPayload::VisualMap { data, notes }, VariantSelector::VisualMap(format)) => {
            VariantEntry::VisualMap(VisualMap {
                format: *format,
                data,
                notes,
                created_at,
            })
        }
        (GeneratedPayload::Audio { voice, url }, VariantSelector::Audio { language }) => {
            VariantEntry::Audio(AudioNarration {
                language: language.clone(),
                voice,
                url,
                created_at,
            })
        }
        (
            GeneratedPayload::Video {
                source,
                url,
                title,
                description,
            },
            VariantSelector::Video(requested),
        ) if source == *requested => VariantEntry::Video(VideoExplainer {
            source,
            url,
            title,
            description,
            created_at,
        }),
        (_, selector) => {
            return Err(ResolveError::GenerationFailed {
                reason: format!("generator returned a payload of the wrong kind for `{selector}`"),
            });
        }
    };
    Ok(entry)
}
