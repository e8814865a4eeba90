//! Player statistics and the leaderboard, derived from completed duels.
//!
//! Nothing here is stored: every figure is recomputed from session history,
//! so stats can never drift from the games they describe.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::game::{DuelSession, PlayerId, RoundOutcome, SessionStatus};

/// Aggregate record for one player
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub games_played: u32,
    pub games_won: u32,
    pub draws: u32,
    /// Percentage of games won, 0 when no games were played
    pub win_rate: f64,
    pub current_streak: u32,
    pub max_streak: u32,
    /// Attempts used → rounds this player solved in that many attempts
    pub guess_distribution: BTreeMap<usize, u32>,
}

/// One leaderboard row
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub player_id: PlayerId,
    pub games_played: u32,
    pub games_won: u32,
    pub win_rate: f64,
    pub max_streak: u32,
}

/// Compute stats for `player` from any set of sessions.
///
/// Sessions that are not completed, or that `player` did not take part in,
/// are ignored. Streaks follow completion order; a draw or loss resets the
/// current streak.
pub fn player_stats(player: &str, sessions: &[DuelSession]) -> PlayerStats {
    let mut finished: Vec<&DuelSession> = sessions
        .iter()
        .filter(|s| s.status() == SessionStatus::Completed && s.is_participant(player))
        .collect();
    finished.sort_by_key(|s| (s.completed_at(), s.id()));

    let mut stats = PlayerStats {
        player_id: player.to_string(),
        ..PlayerStats::default()
    };
    let mut streak = 0;

    for session in finished {
        stats.games_played += 1;
        if session.winner() == Some(player) {
            stats.games_won += 1;
            streak += 1;
            stats.max_streak = stats.max_streak.max(streak);
        } else {
            if session.is_draw() {
                stats.draws += 1;
            }
            streak = 0;
        }

        for round in session.round_history() {
            if round.guesser == player && round.outcome == RoundOutcome::Guessed {
                *stats.guess_distribution.entry(round.attempts()).or_default() += 1;
            }
        }
    }

    stats.current_streak = streak;
    stats.win_rate = win_rate(stats.games_won, stats.games_played);
    stats
}

/// Rank every player seen in `sessions`, best first, and keep `limit` rows.
pub fn leaderboard(sessions: &[DuelSession], limit: usize) -> Vec<LeaderboardEntry> {
    let players: BTreeSet<&str> = sessions
        .iter()
        .filter(|s| s.status() == SessionStatus::Completed)
        .flat_map(|s| s.participants())
        .collect();

    let mut ranked: Vec<PlayerStats> = players
        .into_iter()
        .map(|player| player_stats(player, sessions))
        .collect();
    ranked.sort_by(|a, b| {
        b.games_won
            .cmp(&a.games_won)
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
            .then_with(|| b.max_streak.cmp(&a.max_streak))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, stats)| LeaderboardEntry {
            rank: idx + 1,
            player_id: stats.player_id,
            games_played: stats.games_played,
            games_won: stats.games_won,
            win_rate: stats.win_rate,
            max_streak: stats.max_streak,
        })
        .collect()
}

fn win_rate(won: u32, played: u32) -> f64 {
    if played == 0 {
        0.0
    } else {
        f64::from(won) * 100.0 / f64::from(played)
    }
}
