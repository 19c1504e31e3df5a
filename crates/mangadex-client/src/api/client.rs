//! MangaDex API client with a fixed request timeout.
//!
//! Every call is a single request/response exchange: no retries, no rate
//! limiting. Failures are wrapped in [`UpstreamError`] with the name of the
//! operation that failed.

use super::types::*;
use crate::error::UpstreamError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Upstream page size ceiling
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Related entities expanded inline on manga requests
const INCLUDES: [&str; 3] = ["author", "artist", "cover_art"];

/// MangaDex API v5 client
#[derive(Debug, Clone)]
pub struct MangaDexClient {
    /// HTTP client
    client: Client,
    /// Base URL for the MangaDex API
    base_url: String,
    /// Base URL cover files are served from
    cover_base_url: String,
    /// Per-request timeout
    timeout: Duration,
}

impl MangaDexClient {
    /// Create a new MangaDex client
    pub fn new(
        base_url: impl Into<String>,
        cover_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("manga-library/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cover_base_url: cover_base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cover_base_url(&self) -> &str {
        &self.cover_base_url
    }

    /// Make a GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(url = %url, operation = operation, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, &url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, &url, e))?;

        if !status.is_success() {
            warn!(
                url = %url,
                status = %status,
                error = %body,
                "Request failed"
            );
            return Err(UpstreamError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            UpstreamError::Decode {
                operation,
                message: e.to_string(),
            }
        })
    }

    fn transport_error(&self, operation: &'static str, url: &str, e: reqwest::Error) -> UpstreamError {
        warn!(url = %url, error = %e, "Request error");

        if e.is_timeout() {
            UpstreamError::Timeout {
                operation,
                timeout_secs: self.timeout.as_secs().max(1),
            }
        } else {
            UpstreamError::Transport {
                operation,
                message: e.to_string(),
            }
        }
    }

    /// Search manga by title, most relevant first
    ///
    /// `limit` defaults to 20 and is capped at the upstream maximum of 100.
    pub async fn search_manga(
        &self,
        title: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RawManga>, UpstreamError> {
        let limit = limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT);

        let mut query = vec![("title", title.to_string()), ("limit", limit.to_string())];
        query.extend(INCLUDES.iter().map(|kind| ("includes[]", kind.to_string())));
        query.push(("order[relevance]", "desc".to_string()));

        let response: CollectionResponse<RawManga> = self.get("search", "/manga", &query).await?;

        debug!(title = title, results = response.data.len(), "Search complete");
        Ok(response.data)
    }

    /// Fetch a single manga with its related entities
    pub async fn fetch_manga(&self, manga_id: &str) -> Result<RawManga, UpstreamError> {
        let query: Vec<_> = INCLUDES
            .iter()
            .map(|kind| ("includes[]", kind.to_string()))
            .collect();

        let response: EntityResponse<RawManga> = self
            .get("details", &format!("/manga/{}", manga_id), &query)
            .await?;
        Ok(response.data)
    }

    /// Resolve the cover image URL for a manga from its cover art id
    ///
    /// Covers are best-effort: any failure is logged and yields `None`.
    pub async fn fetch_cover_url(&self, manga_id: &str, cover_id: &str) -> Option<String> {
        let response: EntityResponse<Cover> = match self
            .get("cover lookup", &format!("/cover/{}", cover_id), &[])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(manga_id = manga_id, cover_id = cover_id, error = %e, "Cover lookup failed");
                return None;
            }
        };

        match response.data.attributes.file_name {
            Some(file_name) if !file_name.is_empty() => Some(format!(
                "{}/{}/{}.512.jpg",
                self.cover_base_url, manga_id, file_name
            )),
            _ => {
                warn!(manga_id = manga_id, cover_id = cover_id, "Cover has no file name");
                None
            }
        }
    }
}
