//! Template storage: load, save (full overwrite) and list zone templates.
//!
//! Templates are plain JSON documents keyed by id. Saving always replaces the
//! whole document; there is no patching and no version history beyond what
//! the stored JSON carries.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::zones::{Template, Zone};

/// Zone keys and display names of the platform business-model canvas.
pub const BM_ZONE_KEYS: &[(&str, &str)] = &[
    ("mission", "Mission"),
    ("core-services", "Core Services"),
    ("value-proposition", "Value Proposition"),
    ("usp", "USP"),
    ("ecosystem-impact", "Ecosystem Impact"),
    ("touchpoints", "Touchpoints"),
    ("partners", "Partners"),
    ("consumers", "Consumers"),
    ("producers", "Producers"),
    ("core-network-effects", "Core Network Effects"),
    ("suppliers", "Suppliers"),
    ("key-people-skills", "Key People & Skills"),
    ("key-data", "Key Data"),
    ("key-infrastructure", "Key Infrastructure"),
    ("supporters", "Supporters"),
    ("investors", "Investors"),
    ("value-capture", "Value Capture"),
    ("cost-structure", "Cost Structure"),
    ("tam", "TAM"),
    ("sam", "SAM"),
    ("som", "SOM"),
];

/// Display name for a zone: its title, else the business-model canvas name
/// for a known key, else the raw id.
pub fn zone_display_name(zone: &Zone) -> &str {
    if let Some(title) = zone.title.as_deref() {
        return title;
    }
    BM_ZONE_KEYS
        .iter()
        .find(|(key, _)| *key == zone.id)
        .map(|(_, name)| *name)
        .unwrap_or(zone.id.as_str())
}

/// Entry returned by [`TemplateStore::list_templates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Template identifier
    pub id: String,
}

/// Persistent catalog of zone templates.
pub trait TemplateStore: Send + Sync {
    /// Load a template by id; [`Error::NotFound`] when absent.
    fn load_template(&self, id: &str) -> Result<Template>;

    /// Store a template under `id`, replacing any previous document.
    fn save_template(&self, id: &str, template: &Template) -> Result<()>;

    /// Ids of all stored templates, sorted.
    fn list_templates(&self) -> Result<Vec<TemplateSummary>>;

    /// Validate a raw template document and store it.
    ///
    /// Rejects documents whose `zones` is missing or not a list with
    /// [`Error::InvalidTemplate`]; nothing is written in that case.
    fn save_template_json(&self, id: &str, document: serde_json::Value) -> Result<Template> {
        let template = Template::from_value(id, document)?;
        self.save_template(id, &template)?;
        Ok(template)
    }
}

/// Templates stored as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    dir: PathBuf,
}

impl FileTemplateStore {
    /// Create a store rooted at `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the template documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let unsafe_id = id.is_empty()
            || id.contains(|c: char| c == '/' || c == '\\')
            || id.contains("..")
            || id.starts_with('.');
        if unsafe_id {
            return Err(Error::invalid_template(id, "template id must be a plain file name"));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

impl TemplateStore for FileTemplateStore {
    fn load_template(&self, id: &str) -> Result<Template> {
        let path = self.path_for(id)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::template_not_found(id));
            },
            Err(e) => return Err(e.into()),
        };
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| Error::invalid_template(id, format!("not valid JSON: {}", e)))?;
        let template = Template::from_value(id, value)?;
        log::debug!("Loaded template {} ({} zones) from {}", id, template.zones.len(), path.display());
        Ok(template)
    }

    fn save_template(&self, id: &str, template: &Template) -> Result<()> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(template)?;
        fs::write(&path, text)?;
        log::info!("Saved template {} ({} zones) to {}", id, template.zones.len(), path.display());
        Ok(())
    }

    fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Template directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            },
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(TemplateSummary { id: stem.to_string() });
            }
        }
        ids.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ids)
    }
}

/// In-memory template store.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<BTreeMap<String, Template>>,
}

impl MemoryTemplateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with templates keyed by their own ids.
    pub fn with_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let map = templates.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            templates: RwLock::new(map),
        }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load_template(&self, id: &str) -> Result<Template> {
        let templates = self.templates.read().unwrap_or_else(|e| e.into_inner());
        templates
            .get(id)
            .cloned()
            .ok_or_else(|| Error::template_not_found(id))
    }

    fn save_template(&self, id: &str, template: &Template) -> Result<()> {
        let mut templates = self.templates.write().unwrap_or_else(|e| e.into_inner());
        templates.insert(id.to_string(), template.clone());
        Ok(())
    }

    fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let templates = self.templates.read().unwrap_or_else(|e| e.into_inner());
        Ok(templates
            .keys()
            .map(|id| TemplateSummary { id: id.clone() })
            .collect())
    }
}
