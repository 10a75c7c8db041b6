//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::RelayStatsDto, ui::state::AppState};
use kakehashi_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Relay counters. Room ids are never exposed.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<RelayStatsDto> {
    let stats = state.get_relay_stats_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(RelayStatsDto {
        awaiting_rooms: stats.awaiting_rooms,
        paired_rooms: stats.paired_rooms,
        connected_peers: stats.connected_peers,
        started_at: timestamp_to_rfc3339(stats.started_at_millis),
    })
}
