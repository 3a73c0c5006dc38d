//! Zone templates: named polygonal regions on a canonical canvas.
//!
//! A [`Template`] is a list of [`Zone`]s authored in one coordinate space.
//! Every zone is a polygon; an axis-aligned rectangle given with the `box`
//! shorthand becomes its four corner points, so rectangle templates and
//! free-form templates share one membership test.
//!
//! ```text
//! { "id": "PIK_PBM_v5",
//!   "zones": [ { "id": "mission", "box": [0.0, 0.8, 0.5, 1.0] },
//!              { "id": "tam", "polygon": [[0.6,0.0],[1.0,0.0],[0.8,0.2]] } ] }
//! ```

pub mod catalog;
pub mod mapper;

pub use catalog::{
    zone_display_name, FileTemplateStore, MemoryTemplateStore, TemplateStore, TemplateSummary,
    BM_ZONE_KEYS,
};
pub use mapper::{map_to_zones, AssignedBlock, ZoneMapper, ZoneMapping};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{BBox, Point, Polygon, DEFAULT_CANONICAL_HEIGHT, DEFAULT_CANONICAL_WIDTH};

/// Coordinate space a template's zone geometry is authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneUnits {
    /// Unit square `[0,1] x [0,1]`
    #[default]
    Fraction,
    /// Canonical pixels, `[0,canonical_width] x [0,canonical_height]`
    Canonical,
}

/// A named region of the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ZoneDocument")]
pub struct Zone {
    /// Stable zone key, e.g. `core-services`
    pub id: String,
    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Zone outline
    #[serde(rename = "polygon")]
    pub geometry: Polygon,
}

/// On-disk zone shape: either a polygon or the rectangle shorthand.
#[derive(Deserialize)]
struct ZoneDocument {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    polygon: Option<serde_json::Value>,
    #[serde(default, rename = "box")]
    rect: Option<serde_json::Value>,
}

/// Numbers of a JSON array, or `None` if any element is not a number.
fn numbers(value: &serde_json::Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(|n| n.as_f64()).collect()
}

fn parse_points(value: &serde_json::Value) -> Option<Vec<Point>> {
    value
        .as_array()?
        .iter()
        .map(|p| match numbers(p)?.as_slice() {
            [x, y] => Some(Point::new(*x, *y)),
            _ => None,
        })
        .collect()
}

fn parse_rect(value: &serde_json::Value) -> Option<BBox> {
    match numbers(value)?.as_slice() {
        [x0, y0, x1, y1] => Some(BBox::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

impl From<ZoneDocument> for Zone {
    fn from(doc: ZoneDocument) -> Self {
        // Polygon wins when both are present. Missing or malformed geometry
        // leaves an empty (invalid) polygon that the mapper skips.
        let geometry = match (&doc.polygon, &doc.rect) {
            (Some(points), _) => parse_points(points).map(Polygon::new),
            (None, Some(rect)) => parse_rect(rect).map(Polygon::from_rect),
            (None, None) => None,
        }
        .unwrap_or_else(|| Polygon::new(Vec::new()));
        Zone {
            id: doc.id,
            title: doc.title,
            geometry,
        }
    }
}

impl Zone {
    /// Zone covering an axis-aligned rectangle `[x1, y1, x2, y2]`.
    pub fn rect(id: impl Into<String>, rect: BBox) -> Self {
        Self {
            id: id.into(),
            title: None,
            geometry: Polygon::from_rect(rect),
        }
    }

    /// Zone with a free-form outline.
    pub fn polygon(id: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            title: None,
            geometry: Polygon::new(points),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether the outline can take part in membership tests.
    pub fn is_valid(&self) -> bool {
        self.geometry.is_valid()
    }

    /// Membership test for a point in template space.
    pub fn contains(&self, point: &Point) -> bool {
        self.geometry.contains(point)
    }
}

fn default_canonical_width() -> f64 {
    DEFAULT_CANONICAL_WIDTH
}

fn default_canonical_height() -> f64 {
    DEFAULT_CANONICAL_HEIGHT
}

/// A canvas template: canonical dimensions plus an ordered zone list.
///
/// Zone order matters: when zones overlap, the first one declared wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier
    #[serde(default)]
    pub id: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form version tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Canonical canvas width
    #[serde(default = "default_canonical_width")]
    pub canonical_width: f64,
    /// Canonical canvas height
    #[serde(default = "default_canonical_height")]
    pub canonical_height: f64,
    /// Space the zone geometry is authored in
    #[serde(default)]
    pub units: ZoneUnits,
    /// Zones in declaration (priority) order
    pub zones: Vec<Zone>,
}

impl Template {
    /// Create an empty fraction-unit template with default canonical size.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            version: None,
            canonical_width: DEFAULT_CANONICAL_WIDTH,
            canonical_height: DEFAULT_CANONICAL_HEIGHT,
            units: ZoneUnits::Fraction,
            zones: Vec::new(),
        }
    }

    /// Set the canonical canvas size.
    pub fn with_canonical_size(mut self, width: f64, height: f64) -> Self {
        self.canonical_width = width;
        self.canonical_height = height;
        self
    }

    /// Set the zone units.
    pub fn with_units(mut self, units: ZoneUnits) -> Self {
        self.units = units;
        self
    }

    /// Append a zone (lowest priority so far).
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    /// Decode a template document, validating its shape first.
    ///
    /// `zones` must be present and be a list; otherwise the document is
    /// rejected with [`Error::InvalidTemplate`] before typed decoding. An empty
    /// `id` in the document is filled in from `id`.
    pub fn from_value(id: &str, value: serde_json::Value) -> Result<Self> {
        match value.get("zones") {
            Some(serde_json::Value::Array(_)) => {},
            Some(_) => return Err(Error::invalid_template(id, "zones must be a list")),
            None => return Err(Error::invalid_template(id, "zones missing")),
        }

        let mut template: Template = serde_json::from_value(value)
            .map_err(|e| Error::invalid_template(id, e.to_string()))?;
        if template.id.is_empty() {
            template.id = id.to_string();
        }
        Ok(template)
    }

    /// Look up a zone by id.
    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }
}
