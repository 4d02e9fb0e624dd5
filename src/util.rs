#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Lowercases, trims and collapses internal whitespace runs to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits normalized text on whitespace, strips surrounding punctuation, and
/// keeps tokens longer than `min_len` characters.
pub fn tokens(text: &str, min_len: usize) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| t.chars().count() > min_len)
        .collect()
}

/// Whether `phrase` occurs in `text` on word boundaries.
///
/// Both sides are expected to be normalized already. Boundaries are any
/// non-alphanumeric character or the ends of `text`, so a short equivalent
/// such as `o2` does not match inside `co2`.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }

    text.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Truncates `text` to at most `max` characters, appending an ellipsis when
/// something was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}
