//! Everything a rendered page shows.
//!
//! A [`ViewState`] is built fresh for every request and handed to the
//! renderer; nothing is kept between requests.

use mangadex_client::MangaSummary;
use shared::{LibraryStatus, MangaRecord};

/// Which screen is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    Liked,
    Read,
    SearchResults { query: String },
}

impl View {
    /// Parse the `view` form field; anything unknown is home
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "liked" => View::Liked,
            "read" => View::Read,
            _ => View::Home,
        }
    }

    /// Library view for a status
    pub fn for_status(status: LibraryStatus) -> Self {
        match status {
            LibraryStatus::Liked => View::Liked,
            LibraryStatus::Read => View::Read,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Liked => "liked",
            View::Read => "read",
            View::SearchResults { .. } => "search",
        }
    }

    /// Status filter of a library view
    pub fn status(&self) -> Option<LibraryStatus> {
        match self {
            View::Liked => Some(LibraryStatus::Liked),
            View::Read => Some(LibraryStatus::Read),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Outcome message shown above the content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub view: View,
    pub results: Vec<MangaSummary>,
    pub entries: Vec<MangaRecord>,
    pub banner: Option<Banner>,
}

impl ViewState {
    pub fn new(view: View) -> Self {
        Self {
            view,
            results: Vec::new(),
            entries: Vec::new(),
            banner: None,
        }
    }

    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banner = Some(banner);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_names_round_trip() {
        for view in [View::Home, View::Liked, View::Read] {
            assert_eq!(View::from_name(view.name()), view);
        }
        assert_eq!(View::from_name("search"), View::Home);
        assert_eq!(View::from_name("bogus"), View::Home);
    }

    #[test]
    fn test_view_status() {
        assert_eq!(View::Liked.status(), Some(LibraryStatus::Liked));
        assert_eq!(View::for_status(LibraryStatus::Read), View::Read);
        assert_eq!(View::Home.status(), None);
        assert_eq!(
            View::SearchResults {
                query: "x".into()
            }
            .status(),
            None
        );
    }
}
