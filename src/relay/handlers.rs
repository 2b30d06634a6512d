use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::envelope::{RawJson, RelayError};
use crate::movie::{MovieAggregate, MovieComposer};
use crate::openrouter::ChatError;
use crate::server::AppState;

pub const TRENDING_FAILED: &str = "Failed to fetch trending movies";
pub const TOP_RATED_FAILED: &str = "Failed to fetch movies";
pub const CHAT_FAILED: &str = "Internal server error";
pub const MOVIE_FAILED: &str = "Failed to fetch movie details";

pub async fn trending(State(state): State<AppState>) -> Result<RawJson, RelayError> {
    let cancel = state.shutdown.child_token();
    state
        .tmdb
        .trending(&cancel)
        .await
        .map(RawJson)
        .map_err(|e| RelayError::from_tmdb(e, TRENDING_FAILED))
}

pub async fn top_rated(State(state): State<AppState>) -> Result<RawJson, RelayError> {
    let cancel = state.shutdown.child_token();
    state
        .tmdb
        .top_rated(&cancel)
        .await
        .map(RawJson)
        .map_err(|e| RelayError::from_tmdb(e, TOP_RATED_FAILED))
}

/// Forwards `messages` to the completion provider as-is. The body must be
/// JSON; its shape is left for the provider to judge.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<RawJson, RelayError> {
    if !state.openrouter.has_key() {
        warn!("Chat request without an OpenRouter API key");
        return Err(RelayError::from_chat(ChatError::MissingKey, CHAT_FAILED));
    }

    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Chat request body is not JSON: {}", e);
        RelayError::internal(CHAT_FAILED)
    })?;
    let messages = body.get("messages").cloned().unwrap_or(Value::Null);

    let cancel = state.shutdown.child_token();
    state
        .openrouter
        .complete(&messages, &cancel)
        .await
        .map(RawJson)
        .map_err(|e| RelayError::from_chat(e, CHAT_FAILED))
}

pub async fn movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieAggregate>, RelayError> {
    let cancel = state.shutdown.child_token();
    let aggregate = MovieComposer::new(&state.tmdb)
        .compose(&id, &cancel)
        .await
        .map_err(|e| RelayError::from_tmdb(e, MOVIE_FAILED))?;

    if let Some(failure) = aggregate.total_failure() {
        info!(id = %id, status = failure.status, "No part of the movie could be loaded");
        return Err(match &failure.body {
            Some(body) => RelayError::new(failure.status, body.clone()),
            None => RelayError::internal(MOVIE_FAILED),
        });
    }

    Ok(Json(aggregate))
}
