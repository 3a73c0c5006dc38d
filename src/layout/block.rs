//! Extracted block representation.
//!
//! A [`Block`] is one text region produced by an extraction engine: a page
//! index, a bounding box in the engine's own coordinate space, a coarse role
//! and the recognised text. Blocks are immutable once extracted.

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// Coarse structural role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockRole {
    /// Title, heading or header
    Heading,
    /// Running text (default for anything unrecognised)
    #[default]
    Paragraph,
    /// List or list item
    List,
    /// Table
    Table,
}

impl BlockRole {
    /// Map an engine-specific element type onto a role.
    ///
    /// Matching is case-insensitive and by substring, so `"Title"`, `"H1 heading"`
    /// and `"header"` are headings, `"ListItem"` is a list and so on. Anything
    /// else is a paragraph.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::layout::BlockRole;
    ///
    /// assert_eq!(BlockRole::from_engine_type("Title"), BlockRole::Heading);
    /// assert_eq!(BlockRole::from_engine_type("ListItem"), BlockRole::List);
    /// assert_eq!(BlockRole::from_engine_type("NarrativeText"), BlockRole::Paragraph);
    /// ```
    pub fn from_engine_type(engine_type: &str) -> Self {
        let t = engine_type.to_lowercase();
        if t.contains("title") || t.contains("heading") || t == "header" {
            BlockRole::Heading
        } else if t.contains("list") {
            BlockRole::List
        } else if t.contains("table") {
            BlockRole::Table
        } else {
            BlockRole::Paragraph
        }
    }

    /// Lower-case name as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockRole::Heading => "heading",
            BlockRole::Paragraph => "paragraph",
            BlockRole::List => "list",
            BlockRole::Table => "table",
        }
    }
}

/// A text region produced by an extraction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Identity within one extraction (stable for the lifetime of the block list)
    #[serde(default)]
    pub id: u64,
    /// Page index (0-based)
    pub page: u32,
    /// Bounding box in source units
    pub bbox: BBox,
    /// Structural role
    #[serde(default)]
    pub role: BlockRole,
    /// Recognised text, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Engine-specific table payload (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<serde_json::Value>,
}

impl Block {
    /// Create a paragraph block without text.
    pub fn new(id: u64, page: u32, bbox: BBox) -> Self {
        Self {
            id,
            page,
            bbox,
            role: BlockRole::Paragraph,
            text: None,
            table_data: None,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: BlockRole) -> Self {
        self.role = role;
        self
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach an opaque table payload.
    pub fn with_table_data(mut self, data: serde_json::Value) -> Self {
        self.table_data = Some(data);
        self
    }

    /// Text or the empty string.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether the block carries any non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}
