//! Answer normalization.

/// Canonicalize a raw answer for comparison.
///
/// Lowercases, drops punctuation (anything that is not alphanumeric,
/// underscore or whitespace, except a `.` between two digits), trims and
/// collapses whitespace runs to a single space. Idempotent.
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut pending_space = false;

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !is_word_char(c) && !is_decimal_point(&chars, i) {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// Neighbours are read from the unfiltered input; digits are never dropped, so
// a kept point still sits between the same two digits on a second pass.
fn is_decimal_point(chars: &[char], i: usize) -> bool {
    chars[i] == '.'
        && i > 0
        && chars[i - 1].is_ascii_digit()
        && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
}
