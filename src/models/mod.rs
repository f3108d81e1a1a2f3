pub mod game;
pub mod room;

pub use game::{
    // Sudoku
    Board, SudokuState,
    // Word grid
    FoundWord, LetterGrid, WordGridState,
    // Shared
    GameState, WordPath,
};
pub use room::{GameType, Leaderboard, Room, RoomSummary};
