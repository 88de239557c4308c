//! Paginated, filtered, sorted content retrieval for management screens.

use std::sync::Arc;

use thiserror::Error;

use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::{
    ContentQueryFilter, ContentRepo, ContentSort, RepoError, SortDirection, SortField,
};
use crate::config::QuerySettings;
use crate::domain::content::ContentRecord;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown sort expression `{0}`")]
    InvalidSort(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Listing parameters as they arrive from the UI; everything optional.
#[derive(Debug, Clone, Default)]
pub struct ContentListQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    /// `field:direction` over `createdAt`, `updatedAt`, `topic`.
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct ContentQueryService {
    reader: Arc<dyn ContentRepo>,
    settings: QuerySettings,
}

impl ContentQueryService {
    pub fn new(reader: Arc<dyn ContentRepo>, settings: QuerySettings) -> Self {
        Self { reader, settings }
    }

    pub async fn list(&self, query: ContentListQuery) -> Result<Page<ContentRecord>, QueryError> {
        let sort = parse_sort(query.sort.as_deref())?;
        let request = PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(self.settings.default_page_size),
        );
        let filter = ContentQueryFilter {
            search: normalize_term(query.search),
            tag: normalize_term(query.tag),
        };

        let total_items = self.reader.count_contents(&filter).await?;
        let total_pages = crate::application::pagination::total_pages(total_items, request.limit());
        if request.page() > total_pages {
            return Ok(Page::beyond_range(request, total_items));
        }

        let items = self
            .reader
            .list_contents(&filter, sort, request.limit(), request.offset())
            .await?;
        Ok(Page::new(items, request, total_items))
    }

    /// Listing shaped for page/controller consumers.
    pub async fn list_response(
        &self,
        query: ContentListQuery,
    ) -> Result<chiaro_api_types::ContentListResponse, QueryError> {
        let page = self.list(query).await?;
        Ok(chiaro_api_types::ContentListResponse {
            items: page.items.iter().map(summarize).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        })
    }
}

fn normalize_term(term: Option<String>) -> Option<String> {
    term.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a `field:direction` expression. The direction is optional and
/// defaults to descending; `None` means the default ordering (newest first).
pub fn parse_sort(raw: Option<&str>) -> Result<ContentSort, QueryError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(ContentSort::default());
    };

    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => (field, Some(direction)),
        None => (raw, None),
    };

    let field = match field {
        "createdAt" => SortField::CreatedAt,
        "updatedAt" => SortField::UpdatedAt,
        "topic" => SortField::Topic,
        _ => return Err(QueryError::InvalidSort(raw.to_string())),
    };

    let direction = match direction {
        None => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some("desc") => SortDirection::Desc,
        Some(_) => return Err(QueryError::InvalidSort(raw.to_string())),
    };

    Ok(ContentSort { field, direction })
}

pub fn summarize(record: &ContentRecord) -> chiaro_api_types::ContentSummary {
    chiaro_api_types::ContentSummary {
        id: record.id,
        topic: record.topic.to_string(),
        tags: record.tags.clone(),
        simplified_count: record.simplified_versions.len() as u32,
        visual_map_count: record.visual_maps.len() as u32,
        audio_count: record.audio_narrations.len() as u32,
        video_count: record.video_explainers.len() as u32,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
