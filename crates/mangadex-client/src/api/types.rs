//! MangaDex API v5 response types.
//!
//! Only the fields the library uses are modelled. Fields whose shape varies
//! between records (localized text, tag lists, chapter numbers) are kept as
//! raw JSON and interpreted by the normalizer.
//!
//! Upstream sends explicit `null` for absent values as often as it omits
//! them, so every structural field treats `null` like a missing field.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as `T::default()`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Collection wrapper (`GET /manga`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct CollectionResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<T>,
}

/// Single entity wrapper (`GET /manga/{id}`, `GET /cover/{id}`)
#[derive(Debug, Clone, Deserialize)]
pub struct EntityResponse<T> {
    pub data: T,
}

/// Manga entity exactly as returned upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawManga {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: RawAttributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<Relationship>,
}

/// Manga attributes
///
/// `title` and `description` are either a plain string or a locale map
/// (`{"en": "...", "ja-ro": "..."}`) whose key order is significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttributes {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub last_chapter: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
}

/// Related entity reference (author, artist, cover_art, ...)
///
/// `attributes` is only present for types requested through `includes[]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<Value>,
}

/// Cover art entity
#[derive(Debug, Clone, Deserialize)]
pub struct Cover {
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: CoverAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverAttributes {
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Normalized search result handed to callers and the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaSummary {
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub genres: Vec<String>,
    pub chapters: u32,
    pub year: Option<i32>,
    pub cover_image: Option<String>,
}
