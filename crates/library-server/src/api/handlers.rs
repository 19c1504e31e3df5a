use crate::service::{SaveRequest, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryParams {
    pub status: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(params) = query?;
    let results = state
        .library
        .search(params.q.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(json!({
        "success": true,
        "total": results.len(),
        "data": results,
    })))
}

pub async fn manga_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.library.details(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": summary,
    })))
}

pub async fn save_manga(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(request) = payload?;
    let outcome = state.library.save(request).await?;

    tracing::info!(
        id = outcome.record.id,
        external_id = %outcome.record.external_id,
        status = %outcome.record.status,
        created = outcome.created,
        "Library entry saved"
    );

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(json!({
            "success": true,
            "message": outcome.message(),
            "data": outcome.record,
        })),
    ))
}

pub async fn get_library(
    State(state): State<AppState>,
    query: Result<Query<LibraryParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(params) = query?;
    let records = state.library.list(params.status.as_deref()).await?;

    Ok(Json(json!({
        "success": true,
        "total": records.len(),
        "data": records,
    })))
}

pub async fn delete_manga(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let removed = state.library.remove(&id).await?;

    tracing::info!(id = removed.id, external_id = %removed.external_id, "Library entry removed");

    Ok(Json(json!({
        "success": true,
        "message": "Manga removed from library",
        "data": removed,
    })))
}

pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let records = state.library.count().await?;

    Ok(Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "records": records,
    })))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
        })),
    )
}
