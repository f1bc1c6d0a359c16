//! Text canonicalization for comparisons.
//!
//! Normalized keys are whitespace-free and lower-cased, so "Main Title",
//! "main title" and "MainTitle" all share the key `maintitle`.

/// Strip all whitespace and lower-case.
///
/// # Examples
///
/// ```rust
/// use deckfill::fill::normalize;
///
/// assert_eq!(normalize("  Main\tTitle \n"), "maintitle");
/// ```
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Two-way comparison: normalized keys first, then case-folded text.
///
/// Both checks are tried in that order; either one matching is enough.
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b) || a.to_lowercase() == b.to_lowercase()
}

/// Whether `text` must only ever be matched verbatim.
///
/// After trimming, empty text is not special. Digits-only strings, strings
/// shorter than 3 characters, punctuation or symbol runs and anything
/// without an alphabetic character (in any script) are special.
pub fn is_special_content(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.chars().all(char::is_numeric) {
        return true;
    }
    if trimmed.chars().count() < 3 {
        return true;
    }
    if trimmed
        .chars()
        .all(|c| c.is_ascii_punctuation() || is_symbol_like(c) || c.is_whitespace())
    {
        return true;
    }
    !trimmed.chars().any(char::is_alphabetic)
}

/// Non-ASCII punctuation and symbols: anything that is neither
/// alphanumeric, whitespace nor a control character.
#[inline]
fn is_symbol_like(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
}
