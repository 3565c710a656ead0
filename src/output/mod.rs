// Output formatting — terminal display for predictions and recommendations.

pub mod terminal;

/// Cut `text` to `max_chars` characters, marking the cut with "...".
/// Slices on a char boundary, so multi-byte titles never panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
