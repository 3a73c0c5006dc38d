//! Text utilities shared by the reconciler and the frame assigner.

pub mod normalize;

pub use normalize::{SeparatingNormalizer, StrippingNormalizer, TextNormalizer};

/// Take at most `max_chars` characters (not bytes) from `text`.
///
/// # Examples
///
/// ```
/// use canvas_oxide::text::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo world", 5), "héllo");
/// assert_eq!(truncate_chars("short", 200), "short");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("рынок", 3), "рын");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
