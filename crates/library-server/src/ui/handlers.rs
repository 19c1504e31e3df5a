//! Page handlers.
//!
//! Every action is one request/response cycle that ends in a full page
//! render with an outcome banner.

use super::render::render_page;
use super::state::{Banner, View, ViewState};
use crate::service::{SaveRequest, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Form,
};
use mangadex_client::MangaSummary;
use serde::Deserialize;

const STYLESHEET: &str = include_str!("../../assets/style.css");

type Page = (StatusCode, Html<String>);

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: Option<String>,
}

/// Posted by the Like/Read buttons of a search result
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    /// Search result serialized as JSON
    #[serde(default)]
    pub manga: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    /// View to show after removal
    #[serde(default)]
    pub view: Option<String>,
}

fn page(status: StatusCode, state: &ViewState) -> Page {
    (status, Html(render_page(state)))
}

/// Text shown in the error banner
fn error_message(error: &ServiceError) -> String {
    match error {
        ServiceError::Validation(details) => details.join("; "),
        ServiceError::Upstream(e) => format!("Failed to reach manga catalog: {}", e),
        ServiceError::Internal(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

fn error_page(view: View, error: &ServiceError) -> Page {
    if let ServiceError::Internal(message) = error {
        tracing::error!(error = %message, "Page request failed");
    }
    page(
        error.status_code(),
        &ViewState::new(view).with_banner(Banner::error(error_message(error))),
    )
}

/// Load a view's data and render it
async fn show(state: &AppState, view: View, banner: Option<Banner>) -> Page {
    let mut view_state = ViewState::new(view.clone());
    view_state.banner = banner;

    if let Some(status) = view.status() {
        match state.library.list(Some(status.as_str())).await {
            Ok(entries) => view_state.entries = entries,
            Err(e) => return error_page(view, &e),
        }
    }

    page(StatusCode::OK, &view_state)
}

pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    show(&state, View::Home, None).await
}

pub async fn liked(State(state): State<AppState>) -> impl IntoResponse {
    show(&state, View::Liked, None).await
}

pub async fn read(State(state): State<AppState>) -> impl IntoResponse {
    show(&state, View::Read, None).await
}

pub async fn search(
    State(state): State<AppState>,
    Query(form): Query<SearchForm>,
) -> impl IntoResponse {
    let query = form.q.unwrap_or_default().trim().to_string();
    let view = View::SearchResults {
        query: query.clone(),
    };

    match state.library.search(&query).await {
        Ok(results) => {
            let mut view_state = ViewState::new(view);
            view_state.results = results;
            page(StatusCode::OK, &view_state)
        }
        Err(e) => error_page(view, &e),
    }
}

pub async fn save(State(state): State<AppState>, Form(form): Form<SaveForm>) -> impl IntoResponse {
    let parsed = form
        .manga
        .as_deref()
        .map(|raw| serde_json::from_str::<MangaSummary>(raw));
    let summary = match parsed {
        Some(Ok(summary)) => summary,
        _ => {
            let error = ServiceError::InvalidInput("Invalid manga selection".to_string());
            return error_page(View::Home, &error);
        }
    };

    let status = form.status.unwrap_or_default();
    match state.library.save(SaveRequest::from_summary(summary, &status)).await {
        Ok(outcome) => {
            tracing::info!(
                id = outcome.record.id,
                external_id = %outcome.record.external_id,
                created = outcome.created,
                "Saved from search results"
            );
            let view = View::for_status(outcome.record.status);
            show(&state, view, Some(Banner::success(outcome.message()))).await
        }
        Err(e) => error_page(View::Home, &e),
    }
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RemoveForm>,
) -> impl IntoResponse {
    let view = View::from_name(form.view.as_deref().unwrap_or_default());

    match state.library.remove(&id).await {
        Ok(removed) => {
            tracing::info!(id = removed.id, external_id = %removed.external_id, "Removed from library");
            show(&state, view, Some(Banner::success("Removed from library"))).await
        }
        Err(e) => {
            let banner = Banner::error(error_message(&e));
            let (_, html) = show(&state, view, Some(banner)).await;
            (e.status_code(), html)
        }
    }
}

pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}
