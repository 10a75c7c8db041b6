//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /api/stats` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStatsDto {
    pub awaiting_rooms: usize,
    pub paired_rooms: usize,
    pub connected_peers: usize,
    /// RFC 3339
    pub started_at: String,
}
