use std::time::Duration;

/// Points for finishing a sudoku at the very start of a room
const SUDOKU_MAX_SCORE: u32 = 1000;
/// Floor for slow finishes
const SUDOKU_MIN_SCORE: u32 = 100;

pub struct Scorer;

impl Scorer {
    /// Points for a found word, by length in characters:
    /// up to 3 -> 1, 4 -> 2, 5 -> 3, 6 -> 5, 7 -> 7, 8 or more -> 10
    pub fn word_points(word: &str) -> u32 {
        match word.chars().count() {
            0..=3 => 1,
            4 => 2,
            5 => 3,
            6 => 5,
            7 => 7,
            _ => 10,
        }
    }

    /// Completion bonus for a sudoku: one point less per whole second since
    /// the room was created, never below the floor
    pub fn sudoku_completion(elapsed: Duration) -> u32 {
        let seconds = u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX);
        SUDOKU_MAX_SCORE
            .saturating_sub(seconds)
            .max(SUDOKU_MIN_SCORE)
    }
}
