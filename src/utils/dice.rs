/// Faces of the classic 4x4 letter dice
pub const CLASSIC_DICE: [&str; 16] = [
    "AAEEGN", "ABBJOO", "ACHOPS", "AFFKPS", "AOOTTW", "CIMOTU", "DEILRX", "DELRVY", "DISTTY",
    "EEGHNW", "EEINSU", "EHRTVW", "EIOSST", "ELRTTY", "HIMNQU", "HLNNRZ",
];

/// Faces of the 5x5 dice set: the classic sixteen plus nine extras
pub const EXTENDED_DICE: [&str; 25] = [
    "AAEEGN", "ABBJOO", "ACHOPS", "AFFKPS", "AOOTTW", "CIMOTU", "DEILRX", "DELRVY", "DISTTY",
    "EEGHNW", "EEINSU", "EHRTVW", "EIOSST", "ELRTTY", "HIMNQU", "HLNNRZ", "AACIOT", "ADEMNN",
    "BFIORX", "EGKLUY", "EGINTV", "EHINPS", "ELPSTU", "GILRUW", "ABILTY",
];

/// Dice table for a square grid of the given side length
pub fn dice_for_size(size: usize) -> Option<&'static [&'static str]> {
    match size {
        4 => Some(&CLASSIC_DICE),
        5 => Some(&EXTENDED_DICE),
        _ => None,
    }
}
