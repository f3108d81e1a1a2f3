use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Common English words accepted when the external dictionary cannot answer
pub static FALLBACK_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "able", "about", "above", "act", "add", "after", "again", "age", "air", "all", "also",
        "and", "animal", "answer", "any", "appear", "are", "area", "arms", "around", "art", "ask",
        "back", "bad", "ball", "bank", "base", "bat", "bear", "beat", "beauty", "bed", "been",
        "before", "began", "begin", "behind", "being", "best", "better", "between", "big", "bird",
        "bit", "black", "blue", "boat", "body", "bone", "book", "born", "both", "bottom", "box",
        "boy", "break", "bring", "brought", "build", "built", "busy", "but", "buy", "call", "came",
        "can", "car", "care", "carry", "case", "cat", "cause", "center", "certain", "change",
        "check", "child", "city", "class", "clear", "close", "cold", "color", "come", "common",
        "could", "country", "course", "cut", "dark", "day", "deep", "did", "die", "direct",
        "does", "dog", "done", "door", "down", "draw", "dream", "drive", "drop", "dry", "during",
        "each", "ear", "early", "earth", "east", "eat", "edge", "egg", "else", "end", "enough",
        "even", "ever", "every", "example", "eye", "face", "fact", "fall", "family", "far",
        "farm", "fast", "father", "fear", "feel", "feet", "few", "field", "fig", "fill", "final",
        "find", "fine", "fire", "first", "fish", "five", "fly", "follow", "food", "foot", "for",
        "force", "form", "found", "four", "free", "friend", "from", "front", "full", "game",
        "gave", "get", "girl", "give", "given", "gold", "good", "got", "great", "green", "ground",
        "group", "grow", "had", "half", "hand", "hard", "has", "hat", "have", "head", "hear",
        "heart", "heat", "help", "her", "here", "high", "hill", "him", "his", "hit", "hold",
        "home", "hope", "horse", "hot", "hour", "house", "how", "hundred", "in", "not",
    ]
    .into_iter()
    .collect()
});

/// Whether a normalized word is in the built-in list
pub fn contains(word: &str) -> bool {
    FALLBACK_WORDS.contains(word)
}
