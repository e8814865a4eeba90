//! Player statistics handlers. Both endpoints are public.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use worduel::{LeaderboardEntry, PlayerStats};

use super::{AppState, errors::ApiResult};

/// Leaderboard size when no limit is given
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Largest leaderboard a client may request
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// Top players by wins, then win rate, then best streak.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);
    Ok(Json(state.manager.leaderboard(limit).await?))
}

/// Statistics over a player's completed sessions. Unknown players get zeros.
pub async fn player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> ApiResult<Json<PlayerStats>> {
    Ok(Json(state.manager.player_stats(&player_id).await?))
}
