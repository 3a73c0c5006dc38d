//! Text normalization and tokenization for lexical matching.
//!
//! Two normalizers are provided:
//! - [`SeparatingNormalizer`] turns every run of characters outside the
//!   accepted alphabet into a single space (used when matching store records
//!   against extracted blocks, where punctuation separates words).
//! - [`StrippingNormalizer`] deletes punctuation outright (used for field names
//!   and headings, where "Key People & Skills" must still read as three words).
//!
//! Both implement [`TextNormalizer`], so matching code never depends on a
//! concrete normalization rule.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of whitespace
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Anything that is not an ASCII letter, digit or whitespace
    static ref RE_NON_ALNUM: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
}

/// Strategy for turning raw text into comparable tokens.
pub trait TextNormalizer: Send + Sync {
    /// Normalize text into a lower-case, single-spaced form.
    fn normalize(&self, text: &str) -> String;

    /// Normalize and split into tokens (empty tokens dropped).
    fn tokens(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Normalize and collect distinct tokens.
    fn token_set(&self, text: &str) -> HashSet<String> {
        self.tokens(text).into_iter().collect()
    }
}

/// Lower-cases, replaces every run of characters outside `[a-z0-9]` plus a
/// configurable native alphabet with one space, and trims.
///
/// The default native alphabet is Cyrillic (`а-я` and `ё`).
///
/// # Examples
///
/// ```
/// use canvas_oxide::text::{SeparatingNormalizer, TextNormalizer};
///
/// let n = SeparatingNormalizer::default();
/// assert_eq!(n.normalize("Total-Addressable   Market!"), "total addressable market");
/// assert_eq!(n.normalize("Рынок: 50 млрд"), "рынок 50 млрд");
/// ```
#[derive(Debug, Clone)]
pub struct SeparatingNormalizer {
    native_alphabet: Vec<RangeInclusive<char>>,
}

impl Default for SeparatingNormalizer {
    fn default() -> Self {
        Self::new(vec!['а'..='я', 'ё'..='ё'])
    }
}

impl SeparatingNormalizer {
    /// Create a normalizer accepting the given extra (lower-case) character ranges.
    pub fn new(native_alphabet: Vec<RangeInclusive<char>>) -> Self {
        Self { native_alphabet }
    }

    /// ASCII letters and digits only.
    pub fn ascii_only() -> Self {
        Self::new(Vec::new())
    }

    /// Parse an alphabet spec such as `"а-яё"` into character ranges.
    ///
    /// `a-b` denotes a range, any other character stands for itself.
    pub fn parse_alphabet(spec: &str) -> Vec<RangeInclusive<char>> {
        let chars: Vec<char> = spec.chars().collect();
        let mut ranges = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if i + 2 < chars.len() && chars[i + 1] == '-' {
                ranges.push(chars[i]..=chars[i + 2]);
                i += 3;
            } else {
                ranges.push(chars[i]..=chars[i]);
                i += 1;
            }
        }
        ranges
    }

    fn accepts(&self, c: char) -> bool {
        c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || self.native_alphabet.iter().any(|r| r.contains(&c))
    }
}

impl TextNormalizer for SeparatingNormalizer {
    fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let mut out = String::with_capacity(lowered.len());
        let mut pending_space = false;
        for c in lowered.chars() {
            if self.accepts(c) {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            } else {
                pending_space = true;
            }
        }
        out
    }
}

/// Lower-cases, collapses whitespace and deletes everything outside
/// `[a-z0-9\s]`, then trims.
///
/// # Examples
///
/// ```
/// use canvas_oxide::text::{StrippingNormalizer, TextNormalizer};
///
/// let n = StrippingNormalizer;
/// assert_eq!(n.tokens("Key People & Skills"), vec!["key", "people", "skills"]);
/// assert_eq!(n.normalize("E-Commerce"), "ecommerce");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StrippingNormalizer;

impl TextNormalizer for StrippingNormalizer {
    fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let single_spaced = RE_WHITESPACE.replace_all(&lowered, " ");
        RE_NON_ALNUM.replace_all(&single_spaced, "").trim().to_string()
    }
}
