use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{GameState, GameType, Leaderboard, RoomSummary, WordPath};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    GetActiveRooms,
    JoinRoom {
        room: String,
        username: String,
        game_type: GameType,
    },
    CellUpdate {
        room: String,
        row: usize,
        col: usize,
        value: u8,
        player: String,
    },
    WordSubmit {
        room: String,
        word: String,
        #[serde(default)]
        path: WordPath,
        player: String,
    },
    SendMessage {
        room: String,
        /// Everything else the client sent, relayed untouched
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    ActiveRooms {
        rooms: Vec<RoomSummary>,
    },
    RoomJoined {
        room: String,
        game_type: GameType,
        game_state: GameState,
        players: Vec<String>,
    },
    PlayersUpdate {
        players: Vec<String>,
    },
    LeaderboardUpdate {
        leaderboard: Leaderboard,
    },
    GameUpdate {
        game_state: GameState,
    },
    GameOver {
        winner: Option<String>,
    },
    WordAlreadyFound {
        word: String,
    },
    WordInvalid {
        word: String,
    },
    WordValidationError {
        word: String,
        error: String,
    },
    ChatMessage {
        room: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    Error {
        message: String,
    },
}
