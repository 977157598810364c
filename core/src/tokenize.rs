//! Corpus tokenization: character-level or whitespace word-level.

/// How raw text is split into model symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One symbol per Unicode scalar value, whitespace included.
    Char,
    /// Whitespace-separated words.
    Word,
}

/// Split `text` into symbols at the given granularity.
pub fn tokens(text: &str, granularity: Granularity) -> Vec<String> {
    match granularity {
        Granularity::Char => text.chars().map(String::from).collect(),
        Granularity::Word => text.split_whitespace().map(str::to_string).collect(),
    }
}
