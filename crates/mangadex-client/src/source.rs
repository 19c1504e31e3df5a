//! Catalog abstraction used by the library service.

use crate::api::{MangaDexClient, RawManga};
use crate::error::UpstreamError;
use async_trait::async_trait;

/// External manga catalog
///
/// Implemented by [`MangaDexClient`]; tests substitute an in-memory catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Search by title; `None` uses the default limit
    async fn search(&self, query: &str, limit: Option<u32>) -> Result<Vec<RawManga>, UpstreamError>;

    /// Absolute cover URL, or `None` when the lookup fails
    async fn resolve_cover_url(&self, manga_id: &str, cover_id: &str) -> Option<String>;

    /// Full record for one manga
    async fn get_details(&self, manga_id: &str) -> Result<RawManga, UpstreamError>;
}

#[async_trait]
impl CatalogSource for MangaDexClient {
    async fn search(&self, query: &str, limit: Option<u32>) -> Result<Vec<RawManga>, UpstreamError> {
        self.search_manga(query, limit).await
    }

    async fn resolve_cover_url(&self, manga_id: &str, cover_id: &str) -> Option<String> {
        self.fetch_cover_url(manga_id, cover_id).await
    }

    async fn get_details(&self, manga_id: &str) -> Result<RawManga, UpstreamError> {
        self.fetch_manga(manga_id).await
    }
}
