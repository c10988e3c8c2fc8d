//! Tokenization shared by the listing and catch extractors.
//!
//! The glyph set mirrors the decorations the automation account puts in
//! its messages: a star ahead of rare entries, an em-dash between name
//! and price, and trailing punctuation.

/// Minimum length (in characters, exclusive) for an item token.
const MIN_TOKEN_CHARS: usize = 3;

/// Lowercase `raw` and strip the decorative glyphs. The star and the
/// `!` / `.` punctuation are removed outright; the em-dash becomes a
/// space so a glued `name—price` pair still splits into two tokens.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        match c {
            '⭐' | '!' | '.' => {}
            '—' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Normalize and split on whitespace.
#[must_use]
pub fn tokenize(raw: &str) -> Vec<String> {
    normalize(raw)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// First token that is entirely alphabetic and longer than three
/// characters, scanning left to right.
///
/// The scan is literal: it has no stop-word list, so a qualifier such
/// as "shiny" sitting ahead of the species name becomes the key.
#[must_use]
pub fn first_item_token(raw: &str) -> Option<String> {
    tokenize(raw).into_iter().find(|t| is_item_token(t))
}

fn is_item_token(token: &str) -> bool {
    token.chars().count() > MIN_TOKEN_CHARS && token.chars().all(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_glyphs() {
        assert_eq!(normalize("⭐ Shiny Charizard — 50000!"), " shiny charizard   50000");
    }

    #[test]
    fn em_dash_splits_glued_pairs() {
        assert_eq!(tokenize("Charizard—50000"), vec!["charizard", "50000"]);
    }

    #[test]
    fn first_token_skips_digits_and_short_words() {
        assert_eq!(
            first_item_token("1. Pikachu — 3000 coins"),
            Some("pikachu".to_string())
        );
    }

    #[test]
    fn qualifier_ahead_of_name_wins() {
        assert_eq!(
            first_item_token("⭐ Shiny Charizard — 50000"),
            Some("shiny".to_string())
        );
    }

    #[test]
    fn accented_species_are_alphabetic() {
        assert_eq!(first_item_token("Pokémon 123"), Some("pokémon".to_string()));
    }

    #[test]
    fn no_qualifying_token() {
        assert_eq!(first_item_token("12 34 ab c!"), None);
    }

    #[test]
    fn hyphenated_names_never_qualify() {
        // "ho-oh" contains a hyphen, so the scan passes over it.
        assert_eq!(first_item_token("ho-oh 9000 coins"), Some("coins".to_string()));
    }
}
