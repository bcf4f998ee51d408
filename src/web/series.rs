use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::AppState;
use crate::catalog::{SeriesForm, SeriesId, SeriesUpdateForm, ValidationError};
use crate::session::Principal;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    title: Option<String>,
    genre: Option<String>,
}

fn not_found(id: SeriesId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("series {id} not found") })),
    )
        .into_response()
}

fn invalid(error: ValidationError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

pub async fn list(State(state): State<AppState>) -> Response {
    Json(state.catalog.read().await.list()).into_response()
}

pub async fn show(State(state): State<AppState>, Path(id): Path<SeriesId>) -> Response {
    match state.catalog.read().await.find(id) {
        Some(series) => Json(series).into_response(),
        None => not_found(id),
    }
}

/// Filters by title and genre substrings; a missing parameter matches all.
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let catalog = state.catalog.read().await;
    let mut found = catalog.search_by_title(query.title.as_deref().unwrap_or_default());
    if let Some(genre) = query.genre.as_deref() {
        let by_genre = catalog.search_by_genre(genre);
        found.retain(|series| by_genre.contains(series));
    }
    Json(found).into_response()
}

pub async fn stats(State(state): State<AppState>) -> Response {
    Json(state.catalog.read().await.statistics()).into_response()
}

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Form(form): Form<SeriesForm>,
) -> Response {
    let new = match form.validate(&state.bounds) {
        Ok(new) => new,
        Err(e) => return invalid(e),
    };
    let created = state.catalog.write().await.create(
        new.title,
        new.genre,
        new.season_count,
        new.release_year,
        new.rating,
    );
    info!(id = created.id, by = %principal.username, "series added through the web");
    (StatusCode::CREATED, Json(created)).into_response()
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<SeriesId>,
    Form(form): Form<SeriesUpdateForm>,
) -> Response {
    let update = match form.validate(&state.bounds) {
        Ok(update) => update,
        Err(e) => return invalid(e),
    };
    let mut catalog = state.catalog.write().await;
    if !catalog.update(id, update) {
        return not_found(id);
    }
    match catalog.find(id) {
        Some(series) => Json(series).into_response(),
        None => not_found(id),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<SeriesId>,
) -> Response {
    if state.catalog.write().await.delete(id) {
        info!(id, by = %principal.username, "series removed through the web");
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(id)
    }
}
