use std::sync::Arc;

use agenda::{
    model::{Session, Speaker},
    query::{Catalog, Stats},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::pages;

pub type Shared = Arc<Catalog>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub q: String,
    pub track: String,
    pub speaker: String,
}

pub fn router(catalog: Shared) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/sessions", get(pages::sessions))
        .route("/speakers", get(pages::speakers))
        .route("/api/sessions", get(sessions))
        .route("/api/speakers", get(speakers))
        .route("/api/speaker/{name}", get(speaker_sessions))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(catalog)
}

pub async fn sessions(State(catalog): State<Shared>, Query(f): Query<Filters>) -> Json<Vec<Session>> {
    let hits = catalog.search(&f.q, &f.track, &f.speaker);
    tracing::debug!(target: "server", "search {f:?}: {} hits", hits.len());
    Json(hits.into_iter().cloned().collect())
}

pub async fn speakers(State(catalog): State<Shared>) -> Json<Vec<Speaker>> {
    Json(catalog.speakers().to_vec())
}

pub async fn speaker_sessions(State(catalog): State<Shared>, Path(name): Path<String>) -> Json<Vec<Session>> {
    Json(catalog.sessions_by_speaker(&name).into_iter().cloned().collect())
}

pub async fn stats(State(catalog): State<Shared>) -> Json<Stats> {
    Json(catalog.stats())
}
