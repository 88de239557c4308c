//! Content lifecycle service: create, update, delete, all role-gated.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::application::access::{AccessError, Actor, require_content_manager};
use crate::application::admin::audit::AdminAuditService;
use crate::application::repos::{
    ContentWriteRepo, CreateContentParams, RepoError, UpdateContentParams,
};
use crate::domain::content::{AudioNarration, ContentRecord, VideoExplainer};
use crate::domain::error::DomainError;
use crate::domain::topic::{Topic, TopicError};
use crate::domain::variants::VariantEntry;

#[derive(Debug, Error)]
pub enum AdminContentError {
    #[error(transparent)]
    Forbidden(#[from] AccessError),
    #[error("content for topic `{topic}` already exists")]
    Conflict { topic: String },
    #[error("content for topic `{topic}` not found")]
    NotFound { topic: String },
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error(transparent)]
    Repo(RepoError),
}

impl AdminContentError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<TopicError> for AdminContentError {
    fn from(err: TopicError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<DomainError> for AdminContentError {
    fn from(err: DomainError) -> Self {
        Self::validation(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateContentCommand {
    pub topic: String,
    pub original_text: String,
    pub tags: Vec<String>,
    pub image_urls: Vec<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateContentCommand {
    pub original_text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub audio_narrations: Option<Vec<AudioNarration>>,
    pub video_explainers: Option<Vec<VideoExplainer>>,
}

#[derive(Clone)]
pub struct AdminContentService {
    writer: Arc<dyn ContentWriteRepo>,
    audit: AdminAuditService,
}

impl AdminContentService {
    pub fn new(writer: Arc<dyn ContentWriteRepo>, audit: AdminAuditService) -> Self {
        Self { writer, audit }
    }

    pub async fn create_content(
        &self,
        actor: &Actor,
        command: CreateContentCommand,
    ) -> Result<ContentRecord, AdminContentError> {
        require_content_manager(actor)?;

        let topic = Topic::parse(&command.topic)?;
        if command.original_text.trim().is_empty() {
            return Err(AdminContentError::validation("original text is empty"));
        }

        let params = CreateContentParams {
            topic: topic.clone(),
            original_text: command.original_text,
            tags: clean_tags(command.tags),
            image_urls: clean_urls(command.image_urls)?,
            created_by: Some(actor.user_id),
        };

        let record = self
            .writer
            .create_content(params)
            .await
            .map_err(|err| map_repo_error(err, &topic))?;
        info!(topic = %record.topic, "content created");

        let snapshot = ContentSnapshot {
            topic: record.topic.as_str(),
            tags: &record.tags,
        };
        self.audit
            .record(
                &actor.user_id.to_string(),
                "content.create",
                Some(record.topic.as_str()),
                Some(&snapshot),
            )
            .await
            .map_err(AdminContentError::Repo)?;
        Ok(record)
    }

    pub async fn update_content(
        &self,
        actor: &Actor,
        topic: &str,
        command: UpdateContentCommand,
    ) -> Result<ContentRecord, AdminContentError> {
        require_content_manager(actor)?;

        let topic = Topic::parse(topic)?;
        let params = UpdateContentParams {
            original_text: command.original_text,
            tags: command.tags.map(clean_tags),
            image_urls: command.image_urls.map(clean_urls).transpose()?,
            audio_narrations: command.audio_narrations,
            video_explainers: command.video_explainers,
            updated_by: Some(actor.user_id),
        };

        if params.is_empty() {
            return Err(AdminContentError::validation(
                "update requires at least one field",
            ));
        }
        if matches!(params.original_text.as_deref(), Some(text) if text.trim().is_empty()) {
            return Err(AdminContentError::validation("original text is empty"));
        }
        validate_entries(params.audio_narrations.as_deref(), VariantEntry::Audio)?;
        validate_entries(params.video_explainers.as_deref(), VariantEntry::Video)?;

        let record = self
            .writer
            .update_content(&topic, params)
            .await
            .map_err(|err| map_repo_error(err, &topic))?;
        info!(topic = %record.topic, "content updated");

        let snapshot = ContentSnapshot {
            topic: record.topic.as_str(),
            tags: &record.tags,
        };
        self.audit
            .record(
                &actor.user_id.to_string(),
                "content.update",
                Some(record.topic.as_str()),
                Some(&snapshot),
            )
            .await
            .map_err(AdminContentError::Repo)?;
        Ok(record)
    }

    pub async fn delete_content(
        &self,
        actor: &Actor,
        topic: &str,
    ) -> Result<(), AdminContentError> {
        require_content_manager(actor)?;

        let topic = Topic::parse(topic)?;
        self.writer
            .delete_content(&topic)
            .await
            .map_err(|err| map_repo_error(err, &topic))?;
        info!(topic = %topic, "content deleted");

        self.audit
            .record(
                &actor.user_id.to_string(),
                "content.delete",
                Some(topic.as_str()),
                Option::<&ContentSnapshot>::None,
            )
            .await
            .map_err(AdminContentError::Repo)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ContentSnapshot<'a> {
    topic: &'a str,
    tags: &'a [String],
}

fn map_repo_error(err: RepoError, topic: &Topic) -> AdminContentError {
    match err {
        RepoError::Duplicate { .. } => AdminContentError::Conflict {
            topic: topic.to_string(),
        },
        RepoError::NotFound => AdminContentError::NotFound {
            topic: topic.to_string(),
        },
        RepoError::InvalidInput { message } => AdminContentError::Validation { message },
        other => AdminContentError::Repo(other),
    }
}

/// Trim tags, drop empties, deduplicate while preserving first-seen order.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if tag.is_empty() || seen.contains(&tag) {
            continue;
        }
        seen.push(tag);
    }
    seen
}

fn clean_urls(urls: Vec<String>) -> Result<Vec<String>, AdminContentError> {
    urls.into_iter()
        .map(|url| {
            let url = url.trim().to_string();
            if url.is_empty() {
                Err(AdminContentError::validation("image url is empty"))
            } else {
                Ok(url)
            }
        })
        .collect()
}

fn validate_entries<T: Clone>(
    entries: Option<&[T]>,
    wrap: impl Fn(T) -> VariantEntry,
) -> Result<(), AdminContentError> {
    if let Some(entries) = entries {
        for entry in entries {
            wrap(entry.clone()).validate()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::application::repos::AuditRepo;
    use crate::domain::audit::AuditLogRecord;
    use crate::domain::content::MediaAttachments;
    use crate::domain::types::Role;

    #[derive(Default)]
    struct RecordingWriter {
        created: Mutex<Vec<CreateContentParams>>,
        deleted: Mutex<Vec<Topic>>,
        duplicate: bool,
        missing: bool,
    }

    impl RecordingWriter {
        fn record_for(params: &CreateContentParams) -> ContentRecord {
            let now = OffsetDateTime::now_utc();
            ContentRecord {
                id: Uuid::new_v4(),
                topic: params.topic.clone(),
                original_text: params.original_text.clone(),
                simplified_versions: Vec::new(),
                visual_maps: Vec::new(),
                audio_narrations: Vec::new(),
                video_explainers: Vec::new(),
                tags: params.tags.clone(),
                media: MediaAttachments {
                    image_urls: params.image_urls.clone(),
                },
                created_by: params.created_by,
                last_updated_by: params.created_by,
                created_at: now,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl ContentWriteRepo for RecordingWriter {
        async fn create_content(
            &self,
            params: CreateContentParams,
        ) -> Result<ContentRecord, RepoError> {
            if self.duplicate {
                return Err(RepoError::Duplicate {
                    constraint: "contents_topic_key".to_string(),
                });
            }
            let record = Self::record_for(&params);
            self.created.lock().unwrap().push(params);
            Ok(record)
        }

        async fn append_variant(
            &self,
            _topic: &Topic,
            _entry: VariantEntry,
        ) -> Result<ContentRecord, RepoError> {
            unreachable!("not used in these tests")
        }

        async fn update_content(
            &self,
            topic: &Topic,
            params: UpdateContentParams,
        ) -> Result<ContentRecord, RepoError> {
            if self.missing {
                return Err(RepoError::NotFound);
            }
            let create = CreateContentParams {
                topic: topic.clone(),
                original_text: params.original_text.unwrap_or_default(),
                tags: params.tags.unwrap_or_default(),
                image_urls: params.image_urls.unwrap_or_default(),
                created_by: params.updated_by,
            };
            Ok(Self::record_for(&create))
        }

        async fn delete_content(&self, topic: &Topic) -> Result<(), RepoError> {
            if self.missing {
                return Err(RepoError::NotFound);
            }
            self.deleted.lock().unwrap().push(topic.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAuditRepo {
        entries: Mutex<Vec<AuditLogRecord>>,
    }

    #[async_trait]
    impl AuditRepo for FakeAuditRepo {
        async fn append_log(&self, record: AuditLogRecord) -> Result<(), RepoError> {
            self.entries.lock().unwrap().push(record);
            Ok(())
        }

        async fn list_recent(&self, _limit: u32) -> Result<Vec<AuditLogRecord>, RepoError> {
            Ok(Vec::new())
        }
    }

    fn service_with(writer: Arc<RecordingWriter>) -> (AdminContentService, Arc<FakeAuditRepo>) {
        let audit_repo = Arc::new(FakeAuditRepo::default());
        let audit = AdminAuditService::new(audit_repo.clone());
        (AdminContentService::new(writer, audit), audit_repo)
    }

    fn creator() -> Actor {
        Actor::new(Uuid::new_v4(), Role::Creator)
    }

    #[tokio::test]
    async fn user_role_is_forbidden_before_any_write() {
        let writer = Arc::new(RecordingWriter::default());
        let (service, _) = service_with(writer.clone());
        let actor = Actor::new(Uuid::new_v4(), Role::User);

        let result = service
            .delete_content(&actor, "photosynthesis")
            .await;
        assert!(matches!(result, Err(AdminContentError::Forbidden(_))));
        assert!(writer.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_normalizes_topic_and_cleans_tags() {
        let writer = Arc::new(RecordingWriter::default());
        let (service, audit) = service_with(writer.clone());

        let record = service
            .create_content(
                &creator(),
                CreateContentCommand {
                    topic: "  Cell  Division ".to_string(),
                    original_text: "Cells divide.".to_string(),
                    tags: vec![
                        " biology ".to_string(),
                        "".to_string(),
                        "biology".to_string(),
                    ],
                    image_urls: Vec::new(),
                },
            )
            .await
            .expect("create");

        assert_eq!(record.topic.as_str(), "cell division");
        assert_eq!(record.tags, vec!["biology".to_string()]);
        let entries = audit.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "content.create");
    }

    #[tokio::test]
    async fn duplicate_topic_maps_to_conflict() {
        let writer = Arc::new(RecordingWriter {
            duplicate: true,
            ..RecordingWriter::default()
        });
        let (service, _) = service_with(writer);

        let result = service
            .create_content(
                &creator(),
                CreateContentCommand {
                    topic: "Photosynthesis".to_string(),
                    original_text: "text".to_string(),
                    tags: Vec::new(),
                    image_urls: Vec::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(AdminContentError::Conflict { .. })));
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let writer = Arc::new(RecordingWriter::default());
        let (service, _) = service_with(writer);

        let result = service
            .update_content(&creator(), "photosynthesis", UpdateContentCommand::default())
            .await;
        assert!(matches!(result, Err(AdminContentError::Validation { .. })));
    }

    #[tokio::test]
    async fn delete_of_missing_topic_maps_to_not_found() {
        let writer = Arc::new(RecordingWriter {
            missing: true,
            ..RecordingWriter::default()
        });
        let (service, _) = service_with(writer);

        let result = service.delete_content(&creator(), "mitosis").await;
        assert!(matches!(result, Err(AdminContentError::NotFound { .. })));
    }
}
