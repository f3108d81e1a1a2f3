use rand::{seq::SliceRandom, Rng};

use crate::models::Board;

/// A solved grid and the puzzle derived from it
#[derive(Debug, Clone)]
pub struct GeneratedSudoku {
    pub puzzle: Board,
    pub solution: Board,
}

pub struct PuzzleGenerator;

impl PuzzleGenerator {
    /// Build a solved grid, then clear `cells_to_remove` distinct cells from a copy.
    ///
    /// The resulting puzzle is not guaranteed to have a unique solution.
    pub fn generate(cells_to_remove: usize, rng: &mut impl Rng) -> GeneratedSudoku {
        let solution = Self::solved_grid(rng);
        let puzzle = Self::create_puzzle(&solution, cells_to_remove.min(81), rng);
        GeneratedSudoku { puzzle, solution }
    }

    /// Seed the three diagonal boxes at random and complete the rest by search
    pub fn solved_grid(rng: &mut impl Rng) -> Board {
        let mut grid = [[0u8; 9]; 9];
        Self::fill_diagonal_boxes(&mut grid, rng);
        let solved = Self::solve(&mut grid);
        // Diagonal boxes share no row, column or box, so a completion always exists
        debug_assert!(solved, "seeded grid must be completable");
        grid
    }

    fn fill_diagonal_boxes(grid: &mut Board, rng: &mut impl Rng) {
        for start in [0, 3, 6] {
            let mut digits: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
            digits.shuffle(rng);
            for (i, digit) in digits.into_iter().enumerate() {
                grid[start + i / 3][start + i % 3] = digit;
            }
        }
    }

    /// Backtracking search over the empty cells in row-major order, trying
    /// digits 1-9 in ascending order. Uses an explicit stack of the cells it
    /// has filled instead of recursion. Returns false if no completion exists.
    pub fn solve(grid: &mut Board) -> bool {
        let mut filled: Vec<(usize, usize)> = Vec::with_capacity(81);
        let mut next_digit = 1u8;

        while let Some((row, col)) = first_empty(grid) {
            match (next_digit..=9).find(|&digit| is_legal(grid, row, col, digit)) {
                Some(digit) => {
                    grid[row][col] = digit;
                    filled.push((row, col));
                    next_digit = 1;
                }
                None => {
                    // Exhausted this cell: undo the previous choice and resume after it
                    let Some((prev_row, prev_col)) = filled.pop() else {
                        return false;
                    };
                    next_digit = grid[prev_row][prev_col] + 1;
                    grid[prev_row][prev_col] = 0;
                }
            }
        }

        true
    }

    fn create_puzzle(solution: &Board, cells_to_remove: usize, rng: &mut impl Rng) -> Board {
        let mut puzzle = *solution;
        let mut removed = 0;

        while removed < cells_to_remove {
            let row = rng.random_range(0..9);
            let col = rng.random_range(0..9);
            if puzzle[row][col] != 0 {
                puzzle[row][col] = 0;
                removed += 1;
            }
        }

        puzzle
    }
}

fn first_empty(grid: &Board) -> Option<(usize, usize)> {
    (0..81)
        .map(|i| (i / 9, i % 9))
        .find(|&(row, col)| grid[row][col] == 0)
}

/// Whether `digit` can go at (row, col) without repeating in its row, column or box
fn is_legal(grid: &Board, row: usize, col: usize, digit: u8) -> bool {
    let box_row = row / 3 * 3;
    let box_col = col / 3 * 3;

    (0..9).all(|i| {
        grid[row][i] != digit
            && grid[i][col] != digit
            && grid[box_row + i / 3][box_col + i % 3] != digit
    })
}

/// A board is complete when every row, column and 3x3 box holds 1-9 exactly once
pub fn is_complete(board: &Board) -> bool {
    (0..9).all(|i| {
        let box_row = i / 3 * 3;
        let box_col = i % 3 * 3;

        is_permutation(board[i].iter().copied())
            && is_permutation((0..9).map(|row| board[row][i]))
            && is_permutation((0..9).map(|j| board[box_row + j / 3][box_col + j % 3]))
    })
}

fn is_permutation(mut cells: impl Iterator<Item = u8>) -> bool {
    let mut seen = [false; 10];
    cells.all(|digit| {
        let fresh = (1..=9).contains(&digit) && !seen[digit as usize];
        if fresh {
            seen[digit as usize] = true;
        }
        fresh
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_solved_grid_is_complete() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = PuzzleGenerator::solved_grid(&mut rng);
            assert!(is_complete(&grid), "seed {} produced an invalid grid", seed);
        }
    }

    #[test]
    fn test_puzzle_has_exactly_fifty_empty_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let generated = PuzzleGenerator::generate(50, &mut rng);
        let empty = generated.puzzle.iter().flatten().filter(|&&d| d == 0).count();
        assert_eq!(empty, 50);
    }

    #[test]
    fn test_puzzle_agrees_with_solution() {
        let mut rng = StdRng::seed_from_u64(9);
        let generated = PuzzleGenerator::generate(50, &mut rng);
        for row in 0..9 {
            for col in 0..9 {
                let digit = generated.puzzle[row][col];
                assert!(digit == 0 || digit == generated.solution[row][col]);
            }
        }
    }

    #[test]
    fn test_same_seed_same_puzzle() {
        let a = PuzzleGenerator::generate(50, &mut StdRng::seed_from_u64(5));
        let b = PuzzleGenerator::generate(50, &mut StdRng::seed_from_u64(5));
        assert_eq!(a.puzzle, b.puzzle);
        assert_eq!(a.solution, b.solution);
    }

    #[test]
    fn test_solve_fills_puzzle() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut grid = PuzzleGenerator::generate(50, &mut rng).puzzle;
        assert!(PuzzleGenerator::solve(&mut grid));
        assert!(is_complete(&grid));
    }

    #[test]
    fn test_solve_reports_impossible_grid() {
        let mut grid = [[0u8; 9]; 9];
        // Row 0 needs a 9 at (0, 8), but column 8 already has one
        for col in 0..8 {
            grid[0][col] = col as u8 + 1;
        }
        grid[1][8] = 9;
        assert!(!PuzzleGenerator::solve(&mut grid));
    }

    #[test]
    fn test_is_complete_rejects_empty_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = PuzzleGenerator::solved_grid(&mut rng);
        grid[4][4] = 0;
        assert!(!is_complete(&grid));
    }

    #[test]
    fn test_is_complete_rejects_duplicates() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut grid = PuzzleGenerator::solved_grid(&mut rng);
        grid[0].swap(0, 1);
        assert!(!is_complete(&grid));
    }

    #[test]
    fn test_is_complete_rejects_valid_rows_with_bad_boxes() {
        // Every row is a permutation and every column too, but boxes repeat
        let mut grid = [[0u8; 9]; 9];
        for row in 0..9 {
            for col in 0..9 {
                grid[row][col] = ((row + col) % 9) as u8 + 1;
            }
        }
        assert!(!is_complete(&grid));
    }
}
