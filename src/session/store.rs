use std::collections::HashMap;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::GameConfig,
    game::{GridGenerator, PuzzleGenerator},
    models::{GameState, GameType, Room, RoomSummary, SudokuState, WordGridState},
    utils::dice::{dice_for_size, EXTENDED_DICE},
};

const DEFAULT_GRID_SIZE: usize = 5;

/// Result of removing a player from a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// Room or player was not there
    NotMember,
    /// Player removed, these members remain
    Left { remaining: Vec<String> },
    /// Player was the last member and the room was deleted
    RoomClosed,
}

/// Registry of active rooms. A room exists exactly while it has players.
pub struct SessionStore {
    rooms: HashMap<String, Room>,
    settings: GameConfig,
    dice: &'static [&'static str],
    rng: StdRng,
}

impl SessionStore {
    pub fn new(settings: GameConfig) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    /// Store whose generated puzzles are reproducible
    #[cfg(test)]
    pub fn with_seed(settings: GameConfig, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut settings: GameConfig, rng: StdRng) -> Self {
        let dice: &'static [&'static str] = match dice_for_size(settings.word_grid_size) {
            Some(dice) => dice,
            None => {
                tracing::warn!(
                    "No dice for a {0}x{0} word grid, using {1}x{1}",
                    settings.word_grid_size,
                    DEFAULT_GRID_SIZE
                );
                settings.word_grid_size = DEFAULT_GRID_SIZE;
                &EXTENDED_DICE
            }
        };

        Self {
            rooms: HashMap::new(),
            settings,
            dice,
            rng,
        }
    }

    /// Return the room, creating it with a fresh game if it does not exist.
    /// An existing room keeps its game type whatever `game_type` says.
    pub fn create_or_get_room(&mut self, id: &str, game_type: GameType) -> &mut Room {
        let Self {
            rooms,
            settings,
            dice,
            rng,
        } = self;

        rooms.entry(id.to_string()).or_insert_with(|| {
            tracing::info!("Created {:?} room {}", game_type, id);
            let game_state = new_game(game_type, settings, *dice, rng);
            Room::new(id.to_string(), game_type, game_state)
        })
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn room_mut(&mut self, id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// Add a player to an existing room. Joining twice is a no-op.
    pub fn add_player(&mut self, room_id: &str, username: &str) -> Option<&Room> {
        let room = self.rooms.get_mut(room_id)?;
        if !room.has_player(username) {
            room.players.push(username.to_string());
        }
        Some(room)
    }

    /// Remove a player, deleting the room if it becomes empty
    pub fn remove_player(&mut self, room_id: &str, username: &str) -> Departure {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Departure::NotMember;
        };
        let Some(index) = room.players.iter().position(|p| p == username) else {
            return Departure::NotMember;
        };

        room.players.remove(index);
        if room.players.is_empty() {
            self.rooms.remove(room_id);
            tracing::info!("Room deleted: {}", room_id);
            return Departure::RoomClosed;
        }

        Departure::Left {
            remaining: room.players.clone(),
        }
    }

    /// Directory snapshot of every active room, oldest first
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .values()
            .map(|room| room.summary(self.settings.max_players(room.game_type)))
            .collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }
}

fn new_game(
    game_type: GameType,
    settings: &GameConfig,
    dice: &[&str],
    rng: &mut StdRng,
) -> GameState {
    match game_type {
        GameType::Sudoku => {
            let generated = PuzzleGenerator::generate(settings.sudoku_cells_to_remove, rng);
            GameState::Sudoku(SudokuState::new(generated.puzzle, generated.solution))
        }
        GameType::WordGrid => {
            let grid = GridGenerator::generate(dice, settings.word_grid_size, rng);
            GameState::WordGrid(WordGridState::new(grid, Utc::now()))
        }
    }
}
