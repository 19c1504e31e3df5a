//! Library service: search the catalog and manage the saved library.
//!
//! Coordinates the catalog client, the normalizer, and the library store.
//! Each call is a single request/response cycle with no retries.

use futures::stream::{self, StreamExt};
use mangadex_client::normalizer::cover_art_id;
use mangadex_client::{CatalogSource, MangaSummary, Normalizer, RawManga, UpstreamError};
use serde::Deserialize;
use shared::{
    LibraryStatus, LibraryStore, MangaRecord, NewManga, StoreError, Upserted,
    INVALID_STATUS_MESSAGE,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shortest accepted search query, in characters after trimming
pub const MIN_QUERY_CHARS: usize = 2;

/// Cover lookups in flight at once during a search
const COVER_LOOKUP_CONCURRENCY: usize = 8;

/// Errors surfaced by the library service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied data failed basic shape checks
    #[error("{0}")]
    InvalidInput(String),

    /// Persisted-record constraints violated, one message per field
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    NotFound(String),

    /// A concurrent save of the same external id won the insert
    #[error("Manga {0} was saved by another request; retry to update it")]
    Conflict(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(details) => ServiceError::Validation(details),
            StoreError::NotFound(_) => ServiceError::NotFound("Manga not found".to_string()),
            StoreError::Conflict(external_id) => ServiceError::Conflict(external_id),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Body of a save request; every field is optional so absence can be reported
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub title: Option<String>,
    pub external_id: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub genres: Option<Vec<String>>,
    pub status: Option<String>,
    pub cover_image: Option<String>,
    pub chapters: Option<i64>,
    pub year: Option<i32>,
}

impl SaveRequest {
    /// Build a save request from a normalized search result
    pub fn from_summary(summary: MangaSummary, status: &str) -> Self {
        Self {
            title: Some(summary.title),
            external_id: Some(summary.external_id),
            description: Some(summary.description),
            author: Some(summary.author),
            genres: Some(summary.genres),
            status: Some(status.to_string()),
            cover_image: summary.cover_image,
            chapters: Some(i64::from(summary.chapters)),
            year: summary.year,
        }
    }
}

/// Result of a save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub record: MangaRecord,
    /// `false` when an existing record was updated
    pub created: bool,
}

impl SaveOutcome {
    pub fn message(&self) -> &'static str {
        if self.created {
            "Manga saved to library"
        } else {
            "Manga status updated"
        }
    }
}

/// Interpret a library filter; unknown values mean "no filter"
pub fn parse_status_filter(filter: Option<&str>) -> Option<LibraryStatus> {
    filter.and_then(|value| value.trim().parse().ok())
}

/// Search, save, list, and remove library entries
pub struct LibraryService {
    catalog: Arc<dyn CatalogSource>,
    normalizer: Normalizer,
    store: Arc<Mutex<LibraryStore>>,
    search_limit: u32,
}

impl LibraryService {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        normalizer: Normalizer,
        store: LibraryStore,
        search_limit: u32,
    ) -> Self {
        Self {
            catalog,
            normalizer,
            store: Arc::new(Mutex::new(store)),
            search_limit,
        }
    }

    /// Run a store operation on the blocking pool
    async fn with_store<T, F>(&self, op: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut LibraryStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|_| ServiceError::Internal("Library store lock poisoned".to_string()))?;
            op(&mut store).map_err(ServiceError::from)
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("Library store task failed: {}", e)))?
    }

    /// Search the catalog by title
    pub async fn search(&self, query: &str) -> Result<Vec<MangaSummary>, ServiceError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "Search query must be at least {} characters",
                MIN_QUERY_CHARS
            )));
        }

        let raw = self.catalog.search(query, Some(self.search_limit)).await?;

        // Order is kept; only the fallback cover lookups overlap
        let lookups: Vec<_> = raw.iter().map(|manga| self.summarize(manga)).collect();
        let results: Vec<MangaSummary> = stream::iter(lookups)
            .buffered(COVER_LOOKUP_CONCURRENCY)
            .collect()
            .await;

        info!(query = query, results = results.len(), "Catalog search complete");
        Ok(results)
    }

    /// Fetch one catalog entry by its external id
    pub async fn details(&self, manga_id: &str) -> Result<MangaSummary, ServiceError> {
        let manga_id = manga_id.trim();
        if manga_id.is_empty() {
            return Err(ServiceError::InvalidInput("Manga id is required".to_string()));
        }
        if !manga_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ServiceError::InvalidInput(format!(
                "Invalid manga id: {}",
                manga_id
            )));
        }

        let raw = self.catalog.get_details(manga_id).await?;
        Ok(self.summarize(&raw).await)
    }

    /// Normalize a record, filling a missing cover from the cover endpoint
    async fn summarize(&self, raw: &RawManga) -> MangaSummary {
        let mut summary = self.normalizer.normalize(raw);

        if summary.cover_image.is_none() {
            if let Some(cover_id) = cover_art_id(raw) {
                debug!(manga_id = %raw.id, cover_id = cover_id, "Resolving cover separately");
                summary.cover_image = self.catalog.resolve_cover_url(&raw.id, cover_id).await;
            }
        }

        summary
    }

    /// Save a manga with a status, updating the existing record if present
    pub async fn save(&self, request: SaveRequest) -> Result<SaveOutcome, ServiceError> {
        let title = required(request.title);
        let external_id = required(request.external_id);
        let status = required(request.status);

        let (title, external_id, status) = match (title, external_id, status) {
            (Some(title), Some(external_id), Some(status)) => (title, external_id, status),
            _ => {
                return Err(ServiceError::InvalidInput(
                    "Missing required fields: title, externalId, and status".to_string(),
                ))
            }
        };

        let status: LibraryStatus = status
            .parse()
            .map_err(|_| ServiceError::Validation(vec![INVALID_STATUS_MESSAGE.to_string()]))?;

        let manga = NewManga {
            title,
            external_id,
            description: request.description,
            author: request.author,
            cover_image: request.cover_image,
            genres: request.genres.unwrap_or_default(),
            chapters: request.chapters,
            year: request.year,
        };

        let outcome = self
            .with_store(move |store| store.upsert_status(&manga, status))
            .await?;
        let created = outcome.was_created();
        if let Upserted::Updated(record) = &outcome {
            debug!(id = record.id, status = %record.status, "Updated existing library entry");
        }

        Ok(SaveOutcome {
            record: outcome.into_record(),
            created,
        })
    }

    /// List the library, newest first; unknown filters list everything
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<MangaRecord>, ServiceError> {
        let status = parse_status_filter(filter);
        if status.is_none() {
            if let Some(ignored) = filter.filter(|f| !f.trim().is_empty()) {
                debug!(filter = ignored, "Ignoring unknown status filter");
            }
        }

        self.with_store(move |store| store.list(status)).await
    }

    /// Remove a record by identity
    pub async fn remove(&self, record_id: &str) -> Result<MangaRecord, ServiceError> {
        let id: i64 = record_id.trim().parse().map_err(|_| {
            warn!(id = record_id, "Remove requested for malformed id");
            ServiceError::NotFound("Manga not found".to_string())
        })?;

        self.with_store(move |store| store.delete_by_id(id)).await
    }

    /// Number of saved records
    pub async fn count(&self) -> Result<usize, ServiceError> {
        self.with_store(|store| store.count(None)).await
    }
}

/// Present and non-blank
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
