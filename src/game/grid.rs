use rand::{seq::SliceRandom, Rng};

use crate::models::LetterGrid;

pub struct GridGenerator;

impl GridGenerator {
    /// Generate a size x size letter grid from a dice table.
    ///
    /// The dice are shuffled, laid out one per cell in row-major order, and each
    /// die is rolled for one of its six faces.
    pub fn generate(dice: &[&str], size: usize, rng: &mut impl Rng) -> LetterGrid {
        debug_assert!(dice.len() >= size * size, "not enough dice for the grid");
        let mut dice = dice.to_vec();
        dice.shuffle(rng);

        dice.chunks(size)
            .take(size)
            .map(|row| row.iter().map(|die| Self::roll(die, rng)).collect())
            .collect()
    }

    fn roll(die: &str, rng: &mut impl Rng) -> char {
        let faces = die.as_bytes();
        let face = faces[rng.random_range(0..faces.len())];
        (face as char).to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::dice::{CLASSIC_DICE, EXTENDED_DICE};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_grid_generation() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = GridGenerator::generate(&EXTENDED_DICE, 5, &mut rng);
        assert_eq!(grid.len(), 5);
        assert!(grid.iter().all(|row| row.len() == 5));
    }

    #[test]
    fn test_classic_grid_generation() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = GridGenerator::generate(&CLASSIC_DICE, 4, &mut rng);
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn test_letters_are_lowercase_faces() {
        let mut rng = StdRng::seed_from_u64(11);
        let grid = GridGenerator::generate(&EXTENDED_DICE, 5, &mut rng);
        for letter in grid.iter().flatten() {
            assert!(letter.is_ascii_lowercase());
            let upper = letter.to_ascii_uppercase();
            assert!(EXTENDED_DICE.iter().any(|die| die.contains(upper)));
        }
    }

    #[test]
    fn test_each_die_used_once() {
        // Z is only on one die
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let grid = GridGenerator::generate(&EXTENDED_DICE, 5, &mut rng);
            let z_count = grid.iter().flatten().filter(|&&c| c == 'z').count();
            assert!(z_count <= 1);
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let a = GridGenerator::generate(&EXTENDED_DICE, 5, &mut StdRng::seed_from_u64(42));
        let b = GridGenerator::generate(&EXTENDED_DICE, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
