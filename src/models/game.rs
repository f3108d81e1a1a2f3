use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 9x9 digit grid, 0 marks an empty cell
pub type Board = [[u8; 9]; 9];

pub type LetterGrid = Vec<Vec<char>>;

/// Cells a player traced for a word. Stored and relayed exactly as the
/// client sent it; nothing on the server reads it.
pub type WordPath = serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SudokuState {
    pub board: Board,
    pub solution: Board,
    /// Cells populated by the generator. Never cleared.
    pub prefilled: [[bool; 9]; 9],
    /// Last writer of each non-empty cell
    pub cell_owners: [[Option<String>; 9]; 9],
}

impl SudokuState {
    pub fn new(puzzle: Board, solution: Board) -> Self {
        let prefilled = puzzle.map(|row| row.map(|digit| digit != 0));
        Self {
            board: puzzle,
            solution,
            prefilled,
            cell_owners: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundWord {
    pub word: String,
    #[serde(rename = "player")]
    pub finder: String,
    pub path: WordPath,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordGridState {
    pub grid: LetterGrid,
    pub found_words: Vec<FoundWord>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
}

impl WordGridState {
    pub fn new(grid: LetterGrid, start_time: DateTime<Utc>) -> Self {
        Self {
            grid,
            found_words: Vec::new(),
            start_time,
        }
    }

    /// Case-insensitive membership check against the words found so far
    pub fn has_found(&self, word: &str) -> bool {
        self.found_words
            .iter()
            .any(|found| found.word.eq_ignore_ascii_case(word))
    }
}

/// Per-room game state. Serialized without a tag, clients know the
/// variant from the room's game type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GameState {
    Sudoku(SudokuState),
    WordGrid(WordGridState),
}
