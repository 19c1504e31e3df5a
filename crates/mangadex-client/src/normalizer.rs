//! Normalization of raw MangaDex records into [`MangaSummary`].
//!
//! Normalization is total: missing or oddly-shaped fields fall back to
//! defaults instead of failing.
//!
//! # Locale resolution
//!
//! Localized text is either a plain string or a map from locale code to
//! string. The English (`en`) value wins when it is a non-empty string;
//! otherwise the value under the *first key in upstream order* is used.
//! Upstream key order is preserved because `serde_json` is built with
//! `preserve_order`, so "first" means first as sent on the wire, never
//! alphabetical.

use crate::api::types::{MangaSummary, RawManga, Relationship};
use serde_json::Value;

/// Where MangaDex serves cover files from
pub const DEFAULT_COVER_BASE_URL: &str = "https://uploads.mangadex.org/covers";

/// Title used when a record carries none
pub const UNTITLED: &str = "Untitled";

/// Author used when a record has no resolvable author
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const ENGLISH: &str = "en";

/// Maps raw catalog records to the flat summary shape
#[derive(Debug, Clone)]
pub struct Normalizer {
    cover_base_url: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COVER_BASE_URL)
    }
}

impl Normalizer {
    pub fn new(cover_base_url: impl Into<String>) -> Self {
        Self {
            cover_base_url: cover_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Normalize one raw record
    pub fn normalize(&self, raw: &RawManga) -> MangaSummary {
        let attributes = &raw.attributes;

        MangaSummary {
            external_id: raw.id.clone(),
            title: resolve_localized(attributes.title.as_ref())
                .unwrap_or_else(|| UNTITLED.to_string()),
            description: resolve_localized(attributes.description.as_ref()).unwrap_or_default(),
            author: resolve_author(&raw.relationships)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            genres: resolve_genres(attributes.tags.as_ref()),
            chapters: parse_chapter_count(attributes.last_chapter.as_ref()),
            year: parse_year(attributes.year.as_ref()),
            cover_image: cover_file_name(&raw.relationships).map(|file_name| {
                format!("{}/{}/{}.512.jpg", self.cover_base_url, raw.id, file_name)
            }),
        }
    }

    /// Normalize a batch, preserving order
    pub fn normalize_all(&self, raw: &[RawManga]) -> Vec<MangaSummary> {
        raw.iter().map(|manga| self.normalize(manga)).collect()
    }
}

/// Resolve a plain-or-localized text field (see module docs for the order)
pub fn resolve_localized(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => non_empty(text),
        Value::Object(locales) => locales
            .get(ENGLISH)
            .and_then(Value::as_str)
            .and_then(non_empty)
            .or_else(|| {
                locales
                    .values()
                    .next()
                    .and_then(Value::as_str)
                    .and_then(non_empty)
            }),
        _ => None,
    }
}

/// Id of the first cover art relationship, for records without a file name
pub fn cover_art_id(raw: &RawManga) -> Option<&str> {
    raw.relationships
        .iter()
        .find(|rel| rel.kind == "cover_art")
        .map(|rel| rel.id.as_str())
        .filter(|id| !id.is_empty())
}

/// Name of the first relationship of type `author`
fn resolve_author(relationships: &[Relationship]) -> Option<String> {
    relationships
        .iter()
        .find(|rel| rel.kind == "author")
        .and_then(|rel| rel.attributes.as_ref())
        .and_then(|attrs| attrs.get("name"))
        .and_then(Value::as_str)
        .and_then(non_empty)
}

/// English names of all tags; tags without one are skipped
fn resolve_genres(tags: Option<&Value>) -> Vec<String> {
    match tags {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|tag| tag.pointer("/attributes/name/en"))
            .filter_map(Value::as_str)
            .filter_map(non_empty)
            .collect(),
        _ => Vec::new(),
    }
}

/// File name of the first cover art relationship that carries one
fn cover_file_name(relationships: &[Relationship]) -> Option<&str> {
    relationships
        .iter()
        .filter(|rel| rel.kind == "cover_art")
        .filter_map(|rel| rel.attributes.as_ref())
        .filter_map(|attrs| attrs.get("fileName"))
        .filter_map(Value::as_str)
        .find(|name| !name.is_empty())
}

/// Chapter count from `lastChapter`
///
/// Upstream sends a string such as `"1110"` or `"12.5"`; fractional chapters
/// truncate, anything unusable counts as zero.
fn parse_chapter_count(value: Option<&Value>) -> u32 {
    let number = match value {
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Number(number)) => number.as_f64(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n >= 0.0 => n.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

fn parse_year(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(number) => number.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
