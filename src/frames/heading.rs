//! Heading detection for frame auto-assignment.
//!
//! Blocks are classified from their role and the shape of their text. The
//! classifier is deliberately permissive: a false positive only means a block
//! is *considered* as a field heading, and the field-name match still has to
//! succeed on its content.

use crate::layout::{Block, BlockRole};

/// Maximum length of an all-caps heading.
pub const MAX_ALL_CAPS_HEADING_CHARS: usize = 80;

/// Maximum length of a capitalized heading.
pub const MAX_CAPITALIZED_HEADING_CHARS: usize = 60;

/// How strongly a block looks like a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingSignal {
    /// The extraction engine tagged the block as a heading
    Explicit,
    /// Short text written entirely in capitals
    Emphatic,
    /// Short text starting with a capital letter
    Capitalized,
    /// Regular body text
    Body,
}

impl HeadingSignal {
    /// Any heading signal at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::frames::HeadingSignal;
    ///
    /// assert!(HeadingSignal::Capitalized.is_heading());
    /// assert!(!HeadingSignal::Body.is_heading());
    /// ```
    pub fn is_heading(&self) -> bool {
        !matches!(self, HeadingSignal::Body)
    }

    /// Strong enough to end the body text collected under a previous heading.
    ///
    /// A short capitalized sentence ("We provide X.") is a heading candidate
    /// but does not close a section; explicit and all-caps headings do.
    pub fn is_section_break(&self) -> bool {
        matches!(self, HeadingSignal::Explicit | HeadingSignal::Emphatic)
    }
}

/// Strategy for classifying blocks as headings.
pub trait HeadingClassifier: Send + Sync {
    /// Classify one block.
    fn classify(&self, block: &Block) -> HeadingSignal;

    /// Return the name of this classifier for debugging.
    fn name(&self) -> &'static str;
}

/// Rule-based classifier.
///
/// - role `heading` → [`HeadingSignal::Explicit`]
/// - ≤80 chars, at least two letters, all letters upper-case → [`HeadingSignal::Emphatic`]
/// - ≤60 chars starting with an upper-case ASCII letter → [`HeadingSignal::Capitalized`]
///
/// Blocks without text are never headings. Lengths are measured on the
/// trimmed text, in characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedHeadingClassifier;

impl HeadingClassifier for RuleBasedHeadingClassifier {
    fn classify(&self, block: &Block) -> HeadingSignal {
        let Some(text) = block.text.as_deref().filter(|t| !t.is_empty()) else {
            return HeadingSignal::Body;
        };
        let t = text.trim();
        let len = t.chars().count();

        if block.role == BlockRole::Heading {
            HeadingSignal::Explicit
        } else if len <= MAX_ALL_CAPS_HEADING_CHARS && is_all_caps(t) {
            HeadingSignal::Emphatic
        } else if len <= MAX_CAPITALIZED_HEADING_CHARS && t.starts_with(|c: char| c.is_ascii_uppercase()) {
            HeadingSignal::Capitalized
        } else {
            HeadingSignal::Body
        }
    }

    fn name(&self) -> &'static str {
        "RuleBased"
    }
}

/// At least two ASCII letters, none of them lower-case.
fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn text_block(text: &str, role: BlockRole) -> Block {
        Block::new(0, 0, BBox::new(0.0, 0.0, 10.0, 10.0))
            .with_role(role)
            .with_text(text)
    }

    fn classify(text: &str) -> HeadingSignal {
        RuleBasedHeadingClassifier.classify(&text_block(text, BlockRole::Paragraph))
    }

    #[test]
    fn test_empty_tagged_heading_is_body() {
        let b = text_block("", BlockRole::Heading);
        assert_eq!(RuleBasedHeadingClassifier.classify(&b), HeadingSignal::Body);
        let untagged = Block::new(1, 0, BBox::new(0.0, 0.0, 10.0, 10.0)).with_role(BlockRole::Heading);
        assert_eq!(RuleBasedHeadingClassifier.classify(&untagged), HeadingSignal::Body);
    }

    #[test]
    fn test_explicit_role() {
        let b = text_block("lowercase but tagged", BlockRole::Heading);
        assert_eq!(RuleBasedHeadingClassifier.classify(&b), HeadingSignal::Explicit);
    }

    #[test]
    fn test_all_caps() {
        assert_eq!(classify("CORE SERVICES"), HeadingSignal::Emphatic);
        assert_eq!(classify("KEY PEOPLE & SKILLS (2024)"), HeadingSignal::Emphatic);
    }

    #[test]
    fn test_all_caps_needs_two_letters() {
        assert_eq!(classify("X"), HeadingSignal::Capitalized);
        assert_eq!(classify("42 %"), HeadingSignal::Body);
    }

    #[test]
    fn test_capitalized_short_text() {
        assert_eq!(classify("We provide X."), HeadingSignal::Capitalized);
        assert_eq!(classify("value capture"), HeadingSignal::Body);
    }

    #[test]
    fn test_length_limits() {
        let long_caps = "A".repeat(81);
        assert_eq!(classify(&long_caps), HeadingSignal::Body);
        let medium_caps = "AB ".repeat(20);
        assert_eq!(classify(&medium_caps), HeadingSignal::Emphatic);
        let long_sentence = format!("Revenue {}", "x".repeat(60));
        assert_eq!(classify(&long_sentence), HeadingSignal::Body);
    }

    #[test]
    fn test_no_text_is_body() {
        let b = Block::new(0, 0, BBox::new(0.0, 0.0, 1.0, 1.0)).with_role(BlockRole::Heading);
        assert_eq!(RuleBasedHeadingClassifier.classify(&b), HeadingSignal::Body);
    }

    #[test]
    fn test_section_breaks() {
        assert!(HeadingSignal::Explicit.is_section_break());
        assert!(HeadingSignal::Emphatic.is_section_break());
        assert!(!HeadingSignal::Capitalized.is_section_break());
        assert!(!HeadingSignal::Body.is_section_break());
    }
}
