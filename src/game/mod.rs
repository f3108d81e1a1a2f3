// Puzzle generation and rule logic for both game types

pub mod engine;
pub mod grid;
pub mod scorer;
pub mod sudoku;

pub use engine::{CellOutcome, CellUpdate, GameEngine, GameOver, WordOutcome};
pub use grid::GridGenerator;
pub use sudoku::PuzzleGenerator;
