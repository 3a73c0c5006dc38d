//! Engine configuration.
//!
//! Settings are built in code with the `with_*` setters or read from
//! `CANVAS_*` environment variables by [`EngineConfig::from_env`]:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `CANVAS_TEMPLATES_DIR` | template store directory | `data/templates` |
//! | `CANVAS_SOURCE_CACHE_DIR` | local copies of source files | `data/uploads` |
//! | `CANVAS_CANONICAL_WIDTH` | canonical canvas width | `1000` |
//! | `CANVAS_CANONICAL_HEIGHT` | canonical canvas height | `1400` |
//! | `CANVAS_MATCH_THRESHOLD` | reconciliation threshold in `[0, 1]` | `0.6` |
//! | `CANVAS_RECORD_LIMIT` | records fetched per document | `100` |
//! | `CANVAS_EXTRACTION_TIMEOUT_MS` | extraction bound, `0` = none | none |
//! | `CANVAS_NATIVE_ALPHABET` | extra token characters, e.g. `а-яё` | `а-яё` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::geometry::{DEFAULT_CANONICAL_HEIGHT, DEFAULT_CANONICAL_WIDTH};
use crate::reconcile::{ReconcilerConfig, DEFAULT_MATCH_THRESHOLD, DEFAULT_RECORD_LIMIT};
use crate::text::SeparatingNormalizer;

/// Default native alphabet for reconciliation tokens.
pub const DEFAULT_NATIVE_ALPHABET: &str = "а-яё";

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory of the file template store
    pub templates_dir: PathBuf,
    /// Directory holding local copies of source files
    pub source_cache_dir: PathBuf,
    /// Canonical canvas width for new templates and default calibration
    pub canonical_width: f64,
    /// Canonical canvas height for new templates and default calibration
    pub canonical_height: f64,
    /// Minimum reconciliation score
    pub match_threshold: f64,
    /// Records fetched per reconciled document
    pub record_limit: usize,
    /// Upper bound on one extraction run
    pub extraction_timeout: Option<Duration>,
    /// Characters besides `[a-z0-9]` kept as token characters
    pub native_alphabet: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self {
            templates_dir: PathBuf::from("data/templates"),
            source_cache_dir: PathBuf::from("data/uploads"),
            canonical_width: DEFAULT_CANONICAL_WIDTH,
            canonical_height: DEFAULT_CANONICAL_HEIGHT,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            record_limit: DEFAULT_RECORD_LIMIT,
            extraction_timeout: None,
            native_alphabet: DEFAULT_NATIVE_ALPHABET.to_string(),
        }
    }

    /// Read `CANVAS_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Unset variables keep their defaults; malformed values are rejected
    /// with [`Error::Config`].
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_lookup(|key| match key {
    ///     "CANVAS_MATCH_THRESHOLD" => Some("0.75".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.match_threshold, 0.75);
    /// assert_eq!(config.canonical_width, 1000.0);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        if let Some(dir) = lookup("CANVAS_TEMPLATES_DIR") {
            config.templates_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CANVAS_SOURCE_CACHE_DIR") {
            config.source_cache_dir = PathBuf::from(dir);
        }
        if let Some(w) = parse_var::<f64>(&lookup, "CANVAS_CANONICAL_WIDTH")? {
            config.canonical_width = w;
        }
        if let Some(h) = parse_var::<f64>(&lookup, "CANVAS_CANONICAL_HEIGHT")? {
            config.canonical_height = h;
        }
        if let Some(t) = parse_var::<f64>(&lookup, "CANVAS_MATCH_THRESHOLD")? {
            config.match_threshold = t;
        }
        if let Some(n) = parse_var::<usize>(&lookup, "CANVAS_RECORD_LIMIT")? {
            config.record_limit = n;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CANVAS_EXTRACTION_TIMEOUT_MS")? {
            config.extraction_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(alphabet) = lookup("CANVAS_NATIVE_ALPHABET") {
            config.native_alphabet = alphabet;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the template directory.
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the source cache directory.
    pub fn with_source_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_cache_dir = dir.into();
        self
    }

    /// Set the canonical canvas size.
    pub fn with_canonical_size(mut self, width: f64, height: f64) -> Self {
        self.canonical_width = width;
        self.canonical_height = height;
        self
    }

    /// Set the reconciliation threshold.
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Set the record limit.
    pub fn with_record_limit(mut self, limit: usize) -> Self {
        self.record_limit = limit;
        self
    }

    /// Bound extraction time.
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = Some(timeout);
        self
    }

    /// Set the native alphabet (range syntax, e.g. `а-яё`).
    pub fn with_native_alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.native_alphabet = alphabet.into();
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.canonical_width.is_finite() && self.canonical_width > 0.0)
            || !(self.canonical_height.is_finite() && self.canonical_height > 0.0)
        {
            return Err(Error::Config(format!(
                "canonical size must be positive, got {}x{}",
                self.canonical_width, self.canonical_height
            )));
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(Error::Config(format!(
                "match threshold must be within [0, 1], got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }

    /// Reconciler settings derived from this configuration.
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            match_threshold: self.match_threshold,
            record_limit: self.record_limit,
            extraction_timeout: self.extraction_timeout,
        }
    }

    /// Token normalizer for reconciliation.
    pub fn normalizer(&self) -> SeparatingNormalizer {
        SeparatingNormalizer::new(SeparatingNormalizer::parse_alphabet(&self.native_alphabet))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<EngineConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.canonical_height, 1400.0);
        assert_eq!(config.extraction_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("CANVAS_TEMPLATES_DIR", "/srv/templates"),
            ("CANVAS_CANONICAL_WIDTH", "100"),
            ("CANVAS_CANONICAL_HEIGHT", "100"),
            ("CANVAS_RECORD_LIMIT", "25"),
            ("CANVAS_EXTRACTION_TIMEOUT_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(config.templates_dir, PathBuf::from("/srv/templates"));
        assert_eq!(config.canonical_width, 100.0);
        assert_eq!(config.reconciler_config().record_limit, 25);
        assert_eq!(config.extraction_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_zero_timeout_means_unbounded() {
        let config = from_map(&[("CANVAS_EXTRACTION_TIMEOUT_MS", "0")]).unwrap();
        assert_eq!(config.extraction_timeout, None);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(from_map(&[("CANVAS_RECORD_LIMIT", "many")]), Err(Error::Config(_))));
        assert!(matches!(from_map(&[("CANVAS_MATCH_THRESHOLD", "1.5")]), Err(Error::Config(_))));
        assert!(matches!(from_map(&[("CANVAS_CANONICAL_WIDTH", "0")]), Err(Error::Config(_))));
    }

    #[test]
    fn test_normalizer_uses_alphabet() {
        use crate::text::TextNormalizer;
        let config = EngineConfig::new().with_native_alphabet("");
        assert_eq!(config.normalizer().normalize("Рынок tam"), "tam");
    }
}
