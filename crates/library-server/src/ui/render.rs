//! HTML rendering for the single-page library UI.

use super::state::{Banner, BannerKind, View, ViewState};
use mangadex_client::MangaSummary;
use shared::MangaRecord;

/// Descriptions longer than this many characters are cut with an ellipsis
pub const DESCRIPTION_LIMIT: usize = 300;

const WELCOME: &str =
    "<h2>Welcome to Your Manga Library!</h2><p>Search for manga and add them to your library.</p>";

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Truncate to [`DESCRIPTION_LIMIT`] characters, appending `…` when cut
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_LIMIT {
        let mut cut: String = text.chars().take(DESCRIPTION_LIMIT).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    }
}

/// Render a complete page for the given state
pub fn render_page(state: &ViewState) -> String {
    let query = match &state.view {
        View::SearchResults { query } => query.as_str(),
        _ => "",
    };

    let mut html = String::with_capacity(4096);
    html.push_str(concat!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
        "<meta charset=\"utf-8\">\n",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        "<title>Manga Library</title>\n",
        "<link rel=\"stylesheet\" href=\"/static/style.css\">\n",
        "<script>function showLoading(){document.getElementById('loading').classList.remove('hidden');}</script>\n",
        "</head>\n<body>\n<header class=\"header\">\n<h1 class=\"logo\">Manga Library</h1>\n",
    ));

    html.push_str(&format!(
        concat!(
            "<form id=\"search-form\" class=\"search-form\" method=\"get\" action=\"/search\" onsubmit=\"showLoading()\">",
            "<input id=\"search-input\" type=\"search\" name=\"q\" placeholder=\"Search manga...\" value=\"{}\">",
            "<button type=\"submit\" class=\"btn btn--primary\">Search</button></form>\n"
        ),
        escape_html(query)
    ));

    html.push_str(&render_nav(&state.view));
    html.push_str("</header>\n");

    if let Some(banner) = &state.banner {
        html.push_str(&render_banner(banner));
    }

    html.push_str("<div id=\"loading\" class=\"loading hidden\">Loading...</div>\n");
    html.push_str("<main class=\"main-content\">\n");
    html.push_str(&render_content(state));
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_nav(current: &View) -> String {
    let tabs = [
        (View::Home, "/", "Home"),
        (View::Liked, "/liked", "Liked"),
        (View::Read, "/read", "Read"),
    ];

    let links: String = tabs
        .iter()
        .map(|(view, href, label)| {
            let class = if view == current {
                "nav-btn active"
            } else {
                "nav-btn"
            };
            format!(
                "<a class=\"{}\" data-view=\"{}\" href=\"{}\" onclick=\"showLoading()\">{}</a>",
                class,
                view.name(),
                href,
                label
            )
        })
        .collect();

    format!("<nav class=\"nav\">{}</nav>\n", links)
}

fn render_banner(banner: &Banner) -> String {
    let (id, class) = match banner.kind {
        BannerKind::Success => ("success-message", "success-message"),
        BannerKind::Error => ("error-message", "error-message"),
    };
    format!(
        "<div id=\"{}\" class=\"{}\" role=\"status\">{}</div>\n",
        id,
        class,
        escape_html(&banner.message)
    )
}

fn render_content(state: &ViewState) -> String {
    match &state.view {
        View::Home => WELCOME.to_string(),
        View::SearchResults { query } => {
            if state.results.is_empty() {
                return format!(
                    "<h2>Search Results</h2><p class=\"text-muted\">No manga found for \"{}\".</p>",
                    escape_html(query)
                );
            }
            let cards: String = state.results.iter().map(render_search_card).collect();
            format!(
                "<h2>Search Results</h2>\n<div class=\"manga-grid\">\n{}</div>\n",
                cards
            )
        }
        view => {
            let heading = match view.status() {
                Some(status) => format!("<h2>Your Library ({})</h2>", status),
                None => "<h2>Your Library</h2>".to_string(),
            };
            if state.entries.is_empty() {
                return format!(
                    "{}<p class=\"text-muted\">Nothing here yet.</p>",
                    heading
                );
            }
            let cards: String = state
                .entries
                .iter()
                .map(|record| render_library_card(record, view))
                .collect();
            format!("{}\n<div class=\"manga-grid\">\n{}</div>\n", heading, cards)
        }
    }
}

/// Fields shared by search and library cards
struct Card<'a> {
    title: &'a str,
    author: &'a str,
    description: &'a str,
    genres: &'a [String],
    cover_image: Option<&'a str>,
    meta: Vec<String>,
}

fn render_card(card: &Card<'_>, actions: &str) -> String {
    let cover = card
        .cover_image
        .map(|url| {
            format!(
                "<img src=\"{}\" alt=\"\" class=\"manga-cover mb-1\" loading=\"lazy\">",
                escape_html(url)
            )
        })
        .unwrap_or_default();

    let genres: String = card
        .genres
        .iter()
        .map(|tag| format!("<span class=\"genre-tag\">{}</span>", escape_html(tag)))
        .collect();

    let meta = if card.meta.is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"manga-meta text-muted\">{}</div>",
            escape_html(&card.meta.join(" · "))
        )
    };

    format!(
        concat!(
            "<div class=\"manga-card\">{cover}",
            "<div class=\"manga-title\">{title}</div>",
            "<div class=\"manga-author\">By <span class=\"text-muted\">{author}</span></div>",
            "{meta}",
            "<div class=\"manga-description mb-1\">{description}</div>",
            "<div class=\"manga-genres mb-1\">{genres}</div>",
            "<div class=\"manga-actions\">{actions}</div>",
            "</div>\n"
        ),
        cover = cover,
        title = escape_html(card.title),
        author = escape_html(card.author),
        meta = meta,
        description = escape_html(&truncate_description(card.description)),
        genres = genres,
        actions = actions,
    )
}

fn render_search_card(manga: &MangaSummary) -> String {
    let payload = serde_json::to_string(manga).unwrap_or_default();
    let actions = format!(
        concat!(
            "<form method=\"post\" action=\"/save\" onsubmit=\"showLoading()\">",
            "<input type=\"hidden\" name=\"manga\" value=\"{}\">",
            "<button type=\"submit\" name=\"status\" value=\"liked\" class=\"btn btn--primary btn-save\">Like</button>",
            "<button type=\"submit\" name=\"status\" value=\"read\" class=\"btn btn--secondary btn-save\">Read</button>",
            "</form>"
        ),
        escape_html(&payload)
    );

    let mut meta = Vec::new();
    if manga.chapters > 0 {
        meta.push(format!("{} chapters", manga.chapters));
    }
    if let Some(year) = manga.year {
        meta.push(year.to_string());
    }

    render_card(
        &Card {
            title: &manga.title,
            author: &manga.author,
            description: &manga.description,
            genres: &manga.genres,
            cover_image: manga.cover_image.as_deref(),
            meta,
        },
        &actions,
    )
}

fn render_library_card(record: &MangaRecord, view: &View) -> String {
    let actions = format!(
        concat!(
            "<span class=\"status-badge status-badge--{status}\">{status}</span>",
            "<form method=\"post\" action=\"/remove/{id}\" onsubmit=\"showLoading()\">",
            "<input type=\"hidden\" name=\"view\" value=\"{view}\">",
            "<button type=\"submit\" class=\"btn btn--danger btn--small btn-remove\">Remove</button>",
            "</form>"
        ),
        status = record.status,
        id = record.id,
        view = view.name(),
    );

    let mut meta = Vec::new();
    if let Some(chapters) = record.chapters.filter(|c| *c > 0) {
        meta.push(format!("{} chapters", chapters));
    }
    if let Some(year) = record.year {
        meta.push(year.to_string());
    }

    render_card(
        &Card {
            title: &record.title,
            author: record.author.as_deref().unwrap_or("Unknown"),
            description: record.description.as_deref().unwrap_or_default(),
            genres: &record.genres,
            cover_image: record.cover_image.as_deref(),
            meta,
        },
        &actions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::LibraryStatus;

    fn record(id: i64, title: &str, status: LibraryStatus) -> MangaRecord {
        let now = Utc::now();
        MangaRecord {
            id,
            title: title.to_string(),
            external_id: format!("ext-{}", id),
            description: None,
            author: None,
            cover_image: None,
            genres: vec![],
            chapters: Some(10),
            year: None,
            status,
            date_added: now,
            last_updated: now,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_truncate_description() {
        let short = "a".repeat(300);
        assert_eq!(truncate_description(&short), short);

        let long = "é".repeat(301);
        let cut = truncate_description(&long);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_home_page() {
        let html = render_page(&ViewState::new(View::Home));
        assert!(html.contains("Welcome to Your Manga Library!"));
        assert!(html.contains(r#"class="nav-btn active" data-view="home""#));
        assert!(html.contains(r#"id="loading" class="loading hidden""#));
        assert!(!html.contains("error-message"));
    }

    #[test]
    fn test_search_results_escape_content() {
        let state = ViewState {
            view: View::SearchResults {
                query: "<script>".to_string(),
            },
            results: vec![MangaSummary {
                external_id: "abc-1".to_string(),
                title: "<img src=x onerror=alert(1)>".to_string(),
                author: "Oda".to_string(),
                description: "d".repeat(400),
                ..Default::default()
            }],
            entries: vec![],
            banner: None,
        };

        let html = render_page(&state);
        assert!(!html.contains("<img src=x"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains(r#"value="&lt;script&gt;""#));
        assert!(html.contains(&format!(">{}…</div>", "d".repeat(300))));
        assert!(html.contains(r#"name="status" value="liked""#));
        assert!(html.contains(r#"name="status" value="read""#));
        assert!(html.contains("&quot;externalId&quot;:&quot;abc-1&quot;"));
    }

    #[test]
    fn test_library_view() {
        let mut state = ViewState::new(View::Liked)
            .with_banner(Banner::success("Manga saved to library"));
        state.entries = vec![record(7, "Berserk", LibraryStatus::Liked)];

        let html = render_page(&state);
        assert!(html.contains("Your Library (liked)"));
        assert!(html.contains(r#"action="/remove/7""#));
        assert!(html.contains(r#"name="view" value="liked""#));
        assert!(html.contains("status-badge--liked"));
        assert!(html.contains("By <span class=\"text-muted\">Unknown</span>"));
        assert!(html.contains("10 chapters"));
        assert!(html.contains(r#"class="success-message""#));
    }

    #[test]
    fn test_empty_states_and_error_banner() {
        let state = ViewState::new(View::Read).with_banner(Banner::error("Manga not found"));
        let html = render_page(&state);
        assert!(html.contains("Nothing here yet."));
        assert!(html.contains(r#"class="error-message""#));
        assert!(html.contains("Manga not found"));

        let html = render_page(&ViewState::new(View::SearchResults {
            query: "zzz".to_string(),
        }));
        assert!(html.contains("No manga found for &quot;zzz&quot;."));
    }
}
