//! Data models for the manga library.
//!
//! This module defines the persisted library record, its status, and the
//! candidate shape that callers hand to the store when saving a manga.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Absolute http(s) URL, as accepted for cover images
static COVER_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://.+").expect("cover URL pattern is valid")
});

/// Library status of a saved manga
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LibraryStatus {
    Liked,
    Read,
}

impl LibraryStatus {
    pub const ALL: [LibraryStatus; 2] = [LibraryStatus::Liked, LibraryStatus::Read];

    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryStatus::Liked => "liked",
            LibraryStatus::Read => "read",
        }
    }
}

impl std::fmt::Display for LibraryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LibraryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "liked" => Ok(LibraryStatus::Liked),
            "read" => Ok(LibraryStatus::Read),
            _ => Err(anyhow::anyhow!("Invalid library status: {}", s)),
        }
    }
}

/// A manga saved in the personal library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaRecord {
    pub id: i64,
    pub title: String,
    pub external_id: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub genres: Vec<String>,
    pub chapters: Option<i64>,
    pub year: Option<i32>,
    pub status: LibraryStatus,

    // Timestamps
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Manga to be saved (everything except status, identity, and timestamps)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManga {
    pub title: String,
    pub external_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub chapters: Option<i64>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl NewManga {
    /// Trim text fields and drop optional ones left empty
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.external_id = self.external_id.trim().to_string();
        self.description = trimmed_non_empty(self.description);
        self.author = trimmed_non_empty(self.author);
        self.cover_image = trimmed_non_empty(self.cover_image);
        self.genres = self
            .genres
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        self
    }

    /// Check the persisted-record constraints
    ///
    /// Returns one message per violated field; an empty list means the
    /// candidate may be stored.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        }
        if self.external_id.trim().is_empty() {
            errors.push("External ID is required".to_string());
        }
        if let Some(ref url) = self.cover_image {
            if !COVER_URL_PATTERN.is_match(url) {
                errors.push("Cover image must be a valid URL".to_string());
            }
        }
        if matches!(self.chapters, Some(c) if c < 0) {
            errors.push("Chapters cannot be negative".to_string());
        }

        errors
    }
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Message reported for a status outside {liked, read}
pub const INVALID_STATUS_MESSAGE: &str = r#"Status must be either "liked" or "read""#;

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> NewManga {
        NewManga {
            title: "One Piece".to_string(),
            external_id: "abc-1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_round_trip_through_strings() {
        for status in LibraryStatus::ALL {
            assert_eq!(status.to_string().parse::<LibraryStatus>().unwrap(), status);
        }
        assert!("LIKED".parse::<LibraryStatus>().is_err());
        assert!("reading".parse::<LibraryStatus>().is_err());
    }

    #[test]
    fn test_valid_candidate_has_no_errors() {
        let mut manga = candidate();
        manga.cover_image = Some("https://uploads.mangadex.org/covers/a/b.jpg.512.jpg".into());
        manga.chapters = Some(0);
        assert!(manga.validate().is_empty());
    }

    #[test]
    fn test_validation_reports_every_field() {
        let manga = NewManga {
            title: "  ".to_string(),
            external_id: String::new(),
            cover_image: Some("ftp://example.com/cover.jpg".to_string()),
            chapters: Some(-1),
            ..Default::default()
        };

        let errors = manga.validate();
        assert_eq!(
            errors,
            vec![
                "Title is required",
                "External ID is required",
                "Cover image must be a valid URL",
                "Chapters cannot be negative",
            ]
        );
    }

    #[test]
    fn test_normalized_trims_and_drops_blanks() {
        let manga = NewManga {
            title: "  Berserk ".to_string(),
            external_id: " x-9 ".to_string(),
            description: Some("   ".to_string()),
            author: Some(" Kentaro Miura ".to_string()),
            cover_image: Some(String::new()),
            genres: vec![" Action ".to_string(), "".to_string()],
            ..Default::default()
        }
        .normalized();

        assert_eq!(manga.title, "Berserk");
        assert_eq!(manga.external_id, "x-9");
        assert_eq!(manga.description, None);
        assert_eq!(manga.author.as_deref(), Some("Kentaro Miura"));
        assert_eq!(manga.cover_image, None);
        assert_eq!(manga.genres, vec!["Action"]);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let now = Utc::now();
        let record = MangaRecord {
            id: 1,
            title: "One Piece".to_string(),
            external_id: "abc-1".to_string(),
            description: None,
            author: None,
            cover_image: None,
            genres: vec![],
            chapters: None,
            year: Some(1997),
            status: LibraryStatus::Liked,
            date_added: now,
            last_updated: now,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["externalId"], "abc-1");
        assert_eq!(value["status"], "liked");
        assert!(value.get("dateAdded").is_some());
        assert!(value.get("lastUpdated").is_some());
    }
}
