//! Error types for the layout reconciliation engine.
//!
//! Soft outcomes (a block outside every zone, a frame field with no value, an
//! external record that matched no block) are not errors and never appear here.

/// Result type alias for canvas_oxide operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while mapping, reconciling or assigning.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed configuration (environment, directories, credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("template", "record", ...)
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Template document is malformed (e.g. `zones` missing or not a list)
    #[error("Invalid template '{id}': {reason}")]
    InvalidTemplate {
        /// Template identifier
        id: String,
        /// Why the template was rejected
        reason: String,
    },

    /// Extraction engine failed
    #[error("Extraction failed ({engine}): {reason}")]
    ExtractionFailed {
        /// Name of the engine that failed
        engine: String,
        /// Engine-specific failure message
        reason: String,
    },

    /// Source file could be resolved neither remotely nor from the local cache
    #[error("Cannot resolve source file: {0}")]
    UnresolvableSource(String),

    /// A bounded collaborator call did not finish in time
    #[error("Timed out after {millis} ms: {operation}")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Timeout that was applied
        millis: u128,
    },

    /// Text store rejected a read or write
    #[error("Text store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a missing template.
    pub fn template_not_found(id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: "template",
            id: id.into(),
        }
    }

    /// Shorthand for a malformed template.
    pub fn invalid_template(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidTemplate {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a failed extraction.
    pub fn extraction(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ExtractionFailed {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means "the thing is absent" rather than "the thing is broken".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::UnresolvableSource(_))
    }
}
