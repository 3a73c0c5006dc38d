//! Locating the source file of a document on local disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What is known about a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocator {
    /// Remote identifier (e.g. a cloud drive file id)
    pub file_id: Option<String>,
    /// File name
    pub filename: Option<String>,
}

impl SourceLocator {
    /// Locator by remote id.
    pub fn by_file_id(file_id: impl Into<String>) -> Self {
        Self {
            file_id: Some(file_id.into()),
            filename: None,
        }
    }

    /// Locator by file name.
    pub fn by_filename(filename: impl Into<String>) -> Self {
        Self {
            file_id: None,
            filename: Some(filename.into()),
        }
    }

    /// Short human-readable form for logs and errors.
    pub fn describe(&self) -> String {
        match (&self.file_id, &self.filename) {
            (Some(id), Some(name)) => format!("{} ({})", name, id),
            (Some(id), None) => id.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => "<unnamed source>".to_string(),
        }
    }
}

/// Turns a [`SourceLocator`] into a readable local path.
///
/// `Ok(None)` means "not resolvable by this resolver", which lets resolvers
/// be chained; `Err` is reserved for real failures (e.g. a download error).
pub trait SourceResolver: Send + Sync {
    /// Resolve `locator` to a local file.
    fn resolve(&self, locator: &SourceLocator) -> Result<Option<PathBuf>>;

    /// Return the name of this resolver for logging.
    fn name(&self) -> &'static str;
}

/// Resolves a file name inside a local cache directory.
#[derive(Debug, Clone)]
pub struct LocalSourceResolver {
    dir: PathBuf,
}

impl LocalSourceResolver {
    /// Resolve names inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SourceResolver for LocalSourceResolver {
    fn resolve(&self, locator: &SourceLocator) -> Result<Option<PathBuf>> {
        let Some(name) = locator.filename.as_deref() else {
            return Ok(None);
        };
        // only plain names; never leave the cache directory
        let plain = Path::new(name).file_name().map(|f| f == name).unwrap_or(false);
        if !plain {
            log::debug!("Refusing non-plain cached file name {:?}", name);
            return Ok(None);
        }
        let path = self.dir.join(name);
        Ok(path.is_file().then_some(path))
    }

    fn name(&self) -> &'static str {
        "local-cache"
    }
}

/// Tries resolvers in order and returns the first hit.
#[derive(Default)]
pub struct ChainedResolver {
    resolvers: Vec<Box<dyn SourceResolver>>,
}

impl ChainedResolver {
    /// Empty chain (resolves nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver.
    pub fn with(mut self, resolver: Box<dyn SourceResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

impl SourceResolver for ChainedResolver {
    fn resolve(&self, locator: &SourceLocator) -> Result<Option<PathBuf>> {
        for resolver in &self.resolvers {
            if let Some(path) = resolver.resolve(locator)? {
                log::debug!("{} resolved {} to {}", resolver.name(), locator.describe(), path.display());
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
