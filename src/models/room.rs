use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game::GameState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Sudoku,
    WordGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
}

/// Per-room scores, kept sorted by score descending with one entry per username
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Leaderboard(Vec<LeaderboardEntry>);

impl Leaderboard {
    /// Add points to a player's entry, creating it at zero first if absent
    pub fn award(&mut self, username: &str, points: u32) {
        match self.0.iter_mut().find(|entry| entry.username == username) {
            Some(entry) => entry.score += points,
            None => self.0.push(LeaderboardEntry {
                username: username.to_string(),
                score: points,
            }),
        }
        // Stable sort keeps earlier scorers ahead on ties
        self.0.sort_by(|a, b| b.score.cmp(&a.score));
    }

    pub fn leader(&self) -> Option<&LeaderboardEntry> {
        self.0.first()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.0
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier, also used as its display name
    pub id: String,
    pub game_type: GameType,
    /// Unique usernames in join order
    pub players: Vec<String>,
    pub game_state: GameState,
    pub leaderboard: Leaderboard,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: String, game_type: GameType, game_state: GameState) -> Self {
        Self {
            id,
            game_type,
            players: Vec::new(),
            game_state,
            leaderboard: Leaderboard::default(),
            created_at: Utc::now(),
        }
    }

    pub fn has_player(&self, username: &str) -> bool {
        self.players.iter().any(|p| p == username)
    }

    pub fn summary(&self, max_players: usize) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.id.clone(),
            game_type: self.game_type,
            player_count: self.players.len(),
            max_players,
            created_at: self.created_at,
        }
    }
}

/// Directory entry for one active room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub game_type: GameType,
    pub player_count: usize,
    pub max_players: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
