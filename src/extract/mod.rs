//! Extraction engine adapters.
//!
//! The engines themselves (structured PDF extraction, partitioning services,
//! OCR) live outside this crate. An engine is plugged in by implementing
//! [`Extractor`]; [`ElementJsonExtractor`] reads an engine's element dump from
//! disk, and [`FallbackExtractor`] chains a preferred engine with a backup.

pub mod elements;

pub use elements::parse_elements;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::Block;

/// Output of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Blocks in engine order; `Block::id` is the index
    pub blocks: Vec<Block>,
    /// Engine payload, opaque to the core
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl Extraction {
    /// Parse blocks out of a raw engine document, keeping the document.
    pub fn from_raw(raw: serde_json::Value) -> Self {
        Self {
            blocks: parse_elements(&raw),
            raw,
        }
    }
}

/// A text-region extraction engine.
///
/// Implementations may block on I/O; callers bound them with a timeout.
/// Failures are reported as [`Error::ExtractionFailed`] and never retried
/// internally.
pub trait Extractor: Send + Sync {
    /// Extract blocks from the source file at `source`.
    fn extract(&self, source: &Path) -> Result<Extraction>;

    /// Return the name of this engine for logging.
    fn name(&self) -> &'static str;
}

/// Reads an element JSON dump produced by an engine.
///
/// If `source` is itself a `.json` file it is read directly; otherwise the
/// sidecar `<source>.json` (e.g. `poster.pdf.json`) is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementJsonExtractor;

impl Extractor for ElementJsonExtractor {
    fn extract(&self, source: &Path) -> Result<Extraction> {
        let path = if source.extension().and_then(|e| e.to_str()) == Some("json") {
            source.to_path_buf()
        } else {
            let mut name = source.as_os_str().to_os_string();
            name.push(".json");
            name.into()
        };
        let text = fs::read_to_string(&path)
            .map_err(|e| Error::extraction(self.name(), format!("{}: {}", path.display(), e)))?;
        let raw: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| Error::extraction(self.name(), format!("{}: {}", path.display(), e)))?;
        let extraction = Extraction::from_raw(raw);
        log::debug!("Read {} blocks from {}", extraction.blocks.len(), path.display());
        Ok(extraction)
    }

    fn name(&self) -> &'static str {
        "element-json"
    }
}

/// Tries a preferred engine first and falls back to a second one on failure.
pub struct FallbackExtractor {
    primary: Box<dyn Extractor>,
    secondary: Box<dyn Extractor>,
}

impl FallbackExtractor {
    /// Chain `primary` with `secondary`.
    pub fn new(primary: Box<dyn Extractor>, secondary: Box<dyn Extractor>) -> Self {
        Self { primary, secondary }
    }
}

impl Extractor for FallbackExtractor {
    fn extract(&self, source: &Path) -> Result<Extraction> {
        match self.primary.extract(source) {
            Ok(extraction) => Ok(extraction),
            Err(e) => {
                log::warn!(
                    "{} failed on {} ({}), falling back to {}",
                    self.primary.name(),
                    source.display(),
                    e,
                    self.secondary.name()
                );
                self.secondary.extract(source)
            },
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    struct Failing;

    impl Extractor for Failing {
        fn extract(&self, _source: &Path) -> Result<Extraction> {
            Err(Error::extraction("failing", "service unavailable"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Fixed;

    impl Extractor for Fixed {
        fn extract(&self, _source: &Path) -> Result<Extraction> {
            Ok(Extraction {
                blocks: vec![Block::new(0, 0, BBox::new(0.0, 0.0, 1.0, 1.0))],
                raw: serde_json::Value::Null,
            })
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_fallback_used_on_failure() {
        let chain = FallbackExtractor::new(Box::new(Failing), Box::new(Fixed));
        let extraction = chain.extract(Path::new("poster.pdf")).unwrap();
        assert_eq!(extraction.blocks.len(), 1);
    }

    #[test]
    fn test_primary_preferred() {
        let chain = FallbackExtractor::new(Box::new(Fixed), Box::new(Failing));
        assert!(chain.extract(Path::new("poster.pdf")).is_ok());
    }

    #[test]
    fn test_both_failing_reports_extraction_error() {
        let chain = FallbackExtractor::new(Box::new(Failing), Box::new(Failing));
        let err = chain.extract(Path::new("poster.pdf")).unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed { .. }));
    }

    #[test]
    fn test_element_json_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("poster.pdf");
        fs::write(
            dir.path().join("poster.pdf.json"),
            r#"{"elements":[{"Type":"P","Text":"hello","Page":0,"Bounds":[0,0,10,10]}]}"#,
        )
        .unwrap();
        let extraction = ElementJsonExtractor.extract(&source).unwrap();
        assert_eq!(extraction.blocks[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_element_json_missing_file() {
        let err = ElementJsonExtractor
            .extract(Path::new("/nonexistent/poster.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed { .. }));
    }
}
