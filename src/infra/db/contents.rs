use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    ContentQueryFilter, ContentRepo, ContentSort, ContentWriteRepo, CreateContentParams,
    RepoError, SortDirection, SortField, UpdateContentParams,
};
use crate::domain::content::{
    AudioNarration, ContentRecord, MediaAttachments, SimplifiedVersion, VideoExplainer, VisualMap,
};
use crate::domain::topic::Topic;
use crate::domain::variants::VariantEntry;

use super::{PostgresRepositories, convert_count, map_sqlx_error};

const CONTENT_COLUMNS: &str = "id, topic, original_text, simplified_versions, visual_maps, \
     audio_narrations, video_explainers, tags, image_urls, created_by, last_updated_by, \
     created_at, updated_at";

fn record_from_row(row: &PgRow) -> Result<ContentRecord, RepoError> {
    let topic: String = row.try_get("topic").map_err(map_sqlx_error)?;
    let topic = Topic::parse(&topic).map_err(|err| RepoError::Integrity {
        message: format!("stored topic failed normalization: {err}"),
    })?;

    Ok(ContentRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        topic,
        original_text: row.try_get("original_text").map_err(map_sqlx_error)?,
        simplified_versions: json_column::<Vec<SimplifiedVersion>>(row, "simplified_versions")?,
        visual_maps: json_column::<Vec<VisualMap>>(row, "visual_maps")?,
        audio_narrations: json_column::<Vec<AudioNarration>>(row, "audio_narrations")?,
        video_explainers: json_column::<Vec<VideoExplainer>>(row, "video_explainers")?,
        tags: row.try_get("tags").map_err(map_sqlx_error)?,
        media: MediaAttachments {
            image_urls: row.try_get("image_urls").map_err(map_sqlx_error)?,
        },
        created_by: row.try_get("created_by").map_err(map_sqlx_error)?,
        last_updated_by: row.try_get("last_updated_by").map_err(map_sqlx_error)?,
        created_at: row.try_get("created_at").map_err(map_sqlx_error)?,
        updated_at: row.try_get("updated_at").map_err(map_sqlx_error)?,
    })
}

fn json_column<T>(row: &PgRow, column: &str) -> Result<T, RepoError>
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    let value: sqlx::types::Json<T> = row.try_get(column).map_err(map_sqlx_error)?;
    Ok(value.0)
}

fn variant_column(entry: &VariantEntry) -> &'static str {
    match entry {
        VariantEntry::Simplified(_) => "simplified_versions",
        VariantEntry::VisualMap(_) => "visual_maps",
        VariantEntry::Audio(_) => "audio_narrations",
        VariantEntry::Video(_) => "video_explainers",
    }
}

fn entry_as_json_array(entry: &VariantEntry) -> Result<serde_json::Value, RepoError> {
    let element = serde_json::to_value(entry).map_err(RepoError::from_persistence)?;
    Ok(serde_json::Value::Array(vec![element]))
}

fn collection_as_json<T: serde::Serialize>(
    collection: &[T],
) -> Result<serde_json::Value, RepoError> {
    serde_json::to_value(collection).map_err(RepoError::from_persistence)
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::Topic => "topic",
    }
}

fn apply_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ContentQueryFilter) {
    if let Some(search) = filter.search.as_ref() {
        let pattern = format!("%{search}%");
        qb.push(" AND (topic ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR original_text ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ");
        qb.push_bind(pattern);
        qb.push("))");
    }

    if let Some(tag) = filter.tag.as_ref() {
        qb.push(" AND ");
        qb.push_bind(tag);
        qb.push(" = ANY(tags)");
    }
}

#[async_trait]
impl ContentRepo for PostgresRepositories {
    async fn find_by_topic(&self, topic: &Topic) -> Result<Option<ContentRecord>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE topic = $1"
        ))
        .bind(topic.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn list_contents(
        &self,
        filter: &ContentQueryFilter,
        sort: ContentSort,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ContentRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE 1=1"
        ));
        apply_filter(&mut qb, filter);

        qb.push(" ORDER BY ");
        qb.push(sort_column(sort.field));
        qb.push(match sort.direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        });
        // Creation order breaks ties so pages stay deterministic.
        qb.push(", seq ASC");

        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = qb
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(record_from_row).collect()
    }

    async fn count_contents(&self, filter: &ContentQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM contents WHERE 1=1");
        apply_filter(&mut qb, filter);

        let row = qb
            .build()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let count: i64 = row.try_get(0).map_err(map_sqlx_error)?;
        convert_count(count)
    }
}

#[async_trait]
impl ContentWriteRepo for PostgresRepositories {
    async fn create_content(&self, params: CreateContentParams) -> Result<ContentRecord, RepoError> {
        let CreateContentParams {
            topic,
            original_text,
            tags,
            image_urls,
            created_by,
        } = params;

        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query(&format!(
            "INSERT INTO contents ( \
                id, topic, original_text, simplified_versions, visual_maps, \
                audio_narrations, video_explainers, tags, image_urls, \
                created_by, last_updated_by, created_at, updated_at \
            ) VALUES ( \
                $1, $2, $3, '[]'::jsonb, '[]'::jsonb, '[]'::jsonb, '[]'::jsonb, \
                $4, $5, $6, $6, $7, $7 \
            ) RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id)
        .bind(topic.as_str())
        .bind(original_text)
        .bind(tags)
        .bind(image_urls)
        .bind(created_by)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        record_from_row(&row)
    }

    async fn append_variant(
        &self,
        topic: &Topic,
        entry: VariantEntry,
    ) -> Result<ContentRecord, RepoError> {
        entry.validate().map_err(|err| RepoError::InvalidInput {
            message: err.to_string(),
        })?;

        let column = variant_column(&entry);
        let appended = entry_as_json_array(&entry)?;
        let now = OffsetDateTime::now_utc();

        let row = sqlx::query(&format!(
            "UPDATE contents SET {column} = {column} || $2::jsonb, updated_at = $3 \
             WHERE topic = $1 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(topic.as_str())
        .bind(appended)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => record_from_row(&row),
            None => Err(RepoError::NotFound),
        }
    }

    async fn update_content(
        &self,
        topic: &Topic,
        params: UpdateContentParams,
    ) -> Result<ContentRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let mut qb = QueryBuilder::new("UPDATE contents SET updated_at = ");
        qb.push_bind(now);
        qb.push(", last_updated_by = ");
        qb.push_bind(params.updated_by);

        if let Some(original_text) = params.original_text {
            qb.push(", original_text = ");
            qb.push_bind(original_text);
        }
        if let Some(tags) = params.tags {
            qb.push(", tags = ");
            qb.push_bind(tags);
        }
        if let Some(image_urls) = params.image_urls {
            qb.push(", image_urls = ");
            qb.push_bind(image_urls);
        }
        if let Some(audio_narrations) = params.audio_narrations {
            qb.push(", audio_narrations = ");
            qb.push_bind(collection_as_json(&audio_narrations)?);
        }
        if let Some(video_explainers) = params.video_explainers {
            qb.push(", video_explainers = ");
            qb.push_bind(collection_as_json(&video_explainers)?);
        }

        qb.push(" WHERE topic = ");
        qb.push_bind(topic.as_str().to_string());
        qb.push(format!(" RETURNING {CONTENT_COLUMNS}"));

        let row = qb
            .build()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => record_from_row(&row),
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete_content(&self, topic: &Topic) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM contents WHERE topic = $1")
            .bind(topic.as_str())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
