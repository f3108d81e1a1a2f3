use chrono::{DateTime, Utc};

use super::{scorer::Scorer, sudoku::is_complete};
use crate::models::{FoundWord, GameState, GameType, Room, WordPath};

/// Reasons a move is not applied to a room
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("room does not run a {0:?} game")]
    WrongGameType(GameType),
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("{0} is not a sudoku digit")]
    InvalidDigit(u8),
}

#[derive(Debug, Clone)]
pub struct CellUpdate {
    pub row: usize,
    pub col: usize,
    /// 0 clears the cell
    pub value: u8,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOver {
    pub winner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    /// Board changed, puzzle still open
    Updated,
    /// Board changed and is now a valid solution; `points` went to the winner
    Solved { points: u32, game_over: GameOver },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordOutcome {
    AlreadyFound,
    Accepted {
        points: u32,
        game_over: Option<GameOver>,
    },
}

/// Rule logic for both game types. Holds no room state between calls.
#[derive(Debug, Clone)]
pub struct GameEngine {
    words_to_finish: usize,
}

impl GameEngine {
    pub fn new(words_to_finish: usize) -> Self {
        Self { words_to_finish }
    }

    /// Write a digit into a sudoku room's board and score the writer if the
    /// board is now solved. Any player may overwrite any cell.
    pub fn apply_cell_update(
        &self,
        room: &mut Room,
        update: &CellUpdate,
        now: DateTime<Utc>,
    ) -> Result<CellOutcome, MoveError> {
        let GameState::Sudoku(state) = &mut room.game_state else {
            return Err(MoveError::WrongGameType(GameType::Sudoku));
        };
        if update.row >= 9 || update.col >= 9 {
            return Err(MoveError::OutOfBounds {
                row: update.row,
                col: update.col,
            });
        }
        if update.value > 9 {
            return Err(MoveError::InvalidDigit(update.value));
        }

        state.board[update.row][update.col] = update.value;
        state.cell_owners[update.row][update.col] =
            (update.value != 0).then(|| update.player.clone());

        if !is_complete(&state.board) {
            return Ok(CellOutcome::Updated);
        }

        let elapsed = (now - room.created_at).to_std().unwrap_or_default();
        let points = Scorer::sudoku_completion(elapsed);
        room.leaderboard.award(&update.player, points);

        Ok(CellOutcome::Solved {
            points,
            game_over: GameOver {
                winner: Some(update.player.clone()),
            },
        })
    }

    /// Record an already validated word for `player`.
    ///
    /// Membership is checked here, at commit time, so two submissions of the
    /// same word that were validated concurrently credit only the first.
    pub fn commit_word(
        &self,
        room: &mut Room,
        word: &str,
        path: WordPath,
        player: &str,
    ) -> Result<WordOutcome, MoveError> {
        let GameState::WordGrid(state) = &mut room.game_state else {
            return Err(MoveError::WrongGameType(GameType::WordGrid));
        };

        let word = word.trim().to_lowercase();
        if state.has_found(&word) {
            return Ok(WordOutcome::AlreadyFound);
        }

        let points = Scorer::word_points(&word);
        state.found_words.push(FoundWord {
            word,
            finder: player.to_string(),
            path,
            points,
        });
        room.leaderboard.award(player, points);

        let game_over = (state.found_words.len() >= self.words_to_finish).then(|| GameOver {
            winner: room.leaderboard.leader().map(|entry| entry.username.clone()),
        });

        Ok(WordOutcome::Accepted { points, game_over })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sudoku::PuzzleGenerator;
    use crate::models::{SudokuState, WordGridState};
    use chrono::Duration;
    use rand::{rngs::StdRng, SeedableRng};

    fn sudoku_room() -> Room {
        let generated = PuzzleGenerator::generate(1, &mut StdRng::seed_from_u64(4));
        let state = SudokuState::new(generated.puzzle, generated.solution);
        Room::new("r1".to_string(), GameType::Sudoku, GameState::Sudoku(state))
    }

    fn word_room() -> Room {
        let state = WordGridState::new(vec![vec!['a'; 5]; 5], Utc::now());
        Room::new("w1".to_string(), GameType::WordGrid, GameState::WordGrid(state))
    }

    fn empty_cell(room: &Room) -> (usize, usize, u8) {
        let GameState::Sudoku(state) = &room.game_state else {
            unreachable!()
        };
        for row in 0..9 {
            for col in 0..9 {
                if state.board[row][col] == 0 {
                    return (row, col, state.solution[row][col]);
                }
            }
        }
        unreachable!("puzzle has one empty cell")
    }

    fn update(row: usize, col: usize, value: u8, player: &str) -> CellUpdate {
        CellUpdate {
            row,
            col,
            value,
            player: player.to_string(),
        }
    }

    #[test]
    fn test_cell_update_sets_and_clears_owner() {
        let engine = GameEngine::new(10);
        let mut room = sudoku_room();
        let (row, col, _) = empty_cell(&room);
        // Wrong digit on purpose so the board stays unsolved
        let GameState::Sudoku(state) = &room.game_state else {
            unreachable!()
        };
        let wrong = state.solution[row][col] % 9 + 1;

        let outcome = engine
            .apply_cell_update(&mut room, &update(row, col, wrong, "alice"), Utc::now())
            .unwrap();
        assert_eq!(outcome, CellOutcome::Updated);
        let GameState::Sudoku(state) = &room.game_state else {
            unreachable!()
        };
        assert_eq!(state.board[row][col], wrong);
        assert_eq!(state.cell_owners[row][col].as_deref(), Some("alice"));

        engine
            .apply_cell_update(&mut room, &update(row, col, 0, "bob"), Utc::now())
            .unwrap();
        let GameState::Sudoku(state) = &room.game_state else {
            unreachable!()
        };
        assert_eq!(state.board[row][col], 0);
        assert!(state.cell_owners[row][col].is_none());
        assert!(room.leaderboard.is_empty());
    }

    #[test]
    fn test_prefilled_cells_can_be_overwritten() {
        let engine = GameEngine::new(10);
        let mut room = sudoku_room();
        let (empty_row, empty_col, _) = empty_cell(&room);
        let (row, col) = if (empty_row, empty_col) == (0, 0) { (0, 1) } else { (0, 0) };

        engine
            .apply_cell_update(&mut room, &update(row, col, 0, "bob"), Utc::now())
            .unwrap();
        let GameState::Sudoku(state) = &room.game_state else {
            unreachable!()
        };
        assert_eq!(state.board[row][col], 0);
        assert!(state.prefilled[row][col]);
    }

    #[test]
    fn test_solving_scores_by_elapsed_time() {
        let engine = GameEngine::new(10);
        let mut room = sudoku_room();
        let (row, col, digit) = empty_cell(&room);
        let now = room.created_at + Duration::milliseconds(30_500);

        let outcome = engine
            .apply_cell_update(&mut room, &update(row, col, digit, "alice"), now)
            .unwrap();

        assert_eq!(
            outcome,
            CellOutcome::Solved {
                points: 970,
                game_over: GameOver {
                    winner: Some("alice".to_string())
                },
            }
        );
        assert_eq!(room.leaderboard.leader().unwrap().username, "alice");
        assert_eq!(room.leaderboard.leader().unwrap().score, 970);
    }

    #[test]
    fn test_malformed_cell_updates_rejected() {
        let engine = GameEngine::new(10);
        let mut room = sudoku_room();
        assert_eq!(
            engine.apply_cell_update(&mut room, &update(9, 0, 1, "a"), Utc::now()),
            Err(MoveError::OutOfBounds { row: 9, col: 0 })
        );
        assert_eq!(
            engine.apply_cell_update(&mut room, &update(0, 0, 10, "a"), Utc::now()),
            Err(MoveError::InvalidDigit(10))
        );
    }

    #[test]
    fn test_game_type_mismatch() {
        let engine = GameEngine::new(10);
        let mut words = word_room();
        let mut sudoku = sudoku_room();
        assert_eq!(
            engine.apply_cell_update(&mut words, &update(0, 0, 1, "a"), Utc::now()),
            Err(MoveError::WrongGameType(GameType::Sudoku))
        );
        assert_eq!(
            engine.commit_word(&mut sudoku, "cat", WordPath::Null, "a"),
            Err(MoveError::WrongGameType(GameType::WordGrid))
        );
    }

    #[test]
    fn test_commit_word_awards_points() {
        let engine = GameEngine::new(10);
        let mut room = word_room();
        let path = serde_json::json!([{ "row": 0, "col": 0 }, { "row": 0, "col": 1 }]);

        let outcome = engine.commit_word(&mut room, "House", path.clone(), "alice").unwrap();
        assert_eq!(
            outcome,
            WordOutcome::Accepted {
                points: 3,
                game_over: None
            }
        );

        let GameState::WordGrid(state) = &room.game_state else {
            unreachable!()
        };
        assert_eq!(state.found_words.len(), 1);
        assert_eq!(state.found_words[0].word, "house");
        assert_eq!(state.found_words[0].finder, "alice");
        assert_eq!(state.found_words[0].path, path);
        assert_eq!(room.leaderboard.leader().unwrap().score, 3);
    }

    #[test]
    fn test_duplicate_word_not_credited_twice() {
        let engine = GameEngine::new(10);
        let mut room = word_room();

        engine.commit_word(&mut room, "cat", WordPath::Null, "alice").unwrap();
        let second = engine.commit_word(&mut room, "CAT", WordPath::Null, "bob").unwrap();

        assert_eq!(second, WordOutcome::AlreadyFound);
        assert_eq!(room.leaderboard.entries().len(), 1);
        assert_eq!(room.leaderboard.leader().unwrap().score, 1);
    }

    #[test]
    fn test_tenth_word_ends_game_with_leader() {
        let engine = GameEngine::new(10);
        let mut room = word_room();
        let words = [
            "cat", "dog", "fish", "bird", "house", "tree", "sun", "moon", "star", "elephant",
        ];

        let mut last = None;
        for (i, word) in words.iter().enumerate() {
            let player = if i == 9 { "bob" } else { "alice" };
            last = Some(engine.commit_word(&mut room, word, WordPath::Null, player).unwrap());
            if i < 9 {
                assert!(matches!(
                    last,
                    Some(WordOutcome::Accepted { game_over: None, .. })
                ));
            }
        }

        // alice: 1+1+2+2+3+2+1+2+2 = 16, bob: 10
        assert_eq!(
            last,
            Some(WordOutcome::Accepted {
                points: 10,
                game_over: Some(GameOver {
                    winner: Some("alice".to_string())
                }),
            })
        );
    }
}
