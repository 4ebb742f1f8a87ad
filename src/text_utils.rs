use tracing::trace;

const BULLETS: [char; 3] = ['•', '-', '*'];

/// Strip a leading list bullet (`•`, `-` or `*`).
///
/// Returns `None` when the line carries no bullet or nothing is left after
/// removing it.
pub fn strip_bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if !BULLETS.contains(&first) {
        trace!(?line, "Line has no bullet");
        return None;
    }
    let rest = trimmed[first.len_utf8()..].trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Remove a leading `1.` or `1)` step number. Lines without one are returned
/// trimmed but otherwise untouched.
pub fn strip_step_number(line: &str) -> &str {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return trimmed;
    }
    let rest = &trimmed[digits..];
    match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
        Some(step) => step.trim(),
        None => trimmed,
    }
}

/// First run of ASCII digits in the line, e.g. `Calories: ~420 kcal` -> 420.
pub fn first_integer(line: &str) -> Option<u32> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits: String = line[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
