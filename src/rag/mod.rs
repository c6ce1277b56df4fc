//! The retrieval-and-answer pipeline.

pub mod citations;
pub mod context;
pub mod embedding;
pub mod generate;
pub mod intent;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod types;

/// Truncate on a char boundary; byte slicing would panic on multi-byte
/// UTF-8 content.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn truncates_by_chars_not_bytes() {
        assert_eq!(truncate_chars("héllo", 3), "hél");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 5), "");
    }
}
