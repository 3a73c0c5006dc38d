//! Zone assignment by centroid-in-polygon testing.
//!
//! Every block is reduced to the centroid of its box, the centroid is brought
//! into the template's zone space, and the block is assigned to the **first**
//! zone (in declaration order) whose polygon contains it. Overlapping zones are
//! therefore resolved by template order. Blocks outside every zone get `None`.
//!
//! Two normalization paths are provided:
//! - [`ZoneMapper::map_to_zones`]: divide the centroid by the page's own
//!   dimensions (usually the observed block extents), giving unit-square
//!   coordinates in source orientation.
//! - [`ZoneMapper::map_canonical`]: apply the document's [`CanvasTransform`]
//!   first, then divide by the template's canonical size.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, CanvasTransform, Point};
use crate::layout::{Block, PageDims};
use crate::zones::{Template, Zone, ZoneUnits};

/// A block together with the zone it was assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedBlock {
    /// The input block, unchanged
    #[serde(flatten)]
    pub block: Block,
    /// Assigned zone, `None` when no zone contains the centroid
    pub zone_id: Option<String>,
    /// Box in canonical space (only on the canonical path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_bbox: Option<BBox>,
}

/// Result of mapping blocks onto a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMapping {
    /// One entry per input block, in input order
    pub assigned: Vec<AssignedBlock>,
    /// Number of blocks per zone (zones without blocks are absent)
    pub counts: IndexMap<String, usize>,
    /// Zones skipped because their geometry is unusable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_zones: Vec<String>,
}

impl ZoneMapping {
    /// Number of blocks that landed in some zone.
    pub fn assigned_count(&self) -> usize {
        self.counts.values().sum()
    }

    /// Blocks that landed in no zone.
    pub fn unassigned(&self) -> impl Iterator<Item = &AssignedBlock> {
        self.assigned.iter().filter(|a| a.zone_id.is_none())
    }
}

/// Maps blocks onto one template.
///
/// Zones with fewer than three vertices or non-finite coordinates are dropped
/// when the mapper is built (and reported in [`ZoneMapping::skipped_zones`]);
/// the remaining zones keep their relative order.
#[derive(Debug)]
pub struct ZoneMapper<'a> {
    template: &'a Template,
    zones: Vec<&'a Zone>,
    skipped: Vec<String>,
}

impl<'a> ZoneMapper<'a> {
    /// Prepare a mapper for `template`.
    pub fn new(template: &'a Template) -> Self {
        let mut zones = Vec::with_capacity(template.zones.len());
        let mut skipped = Vec::new();
        for zone in &template.zones {
            if zone.is_valid() {
                zones.push(zone);
            } else {
                log::warn!(
                    "Template {}: skipping zone {} with unusable geometry ({} points)",
                    template.id,
                    zone.id,
                    zone.geometry.points().len()
                );
                skipped.push(zone.id.clone());
            }
        }
        Self {
            template,
            zones,
            skipped,
        }
    }

    /// The template being mapped onto.
    pub fn template(&self) -> &Template {
        self.template
    }

    /// First zone containing `point` (in template zone space).
    pub fn zone_for_point(&self, point: &Point) -> Option<&'a Zone> {
        self.zones.iter().copied().find(|z| z.contains(point))
    }

    /// Map a unit-square point into the template's zone space.
    fn to_zone_space(&self, unit: Point) -> Point {
        match self.template.units {
            ZoneUnits::Fraction => unit,
            ZoneUnits::Canonical => Point::new(
                unit.x * self.template.canonical_width,
                unit.y * self.template.canonical_height,
            ),
        }
    }

    /// Map a canonical-space point into the template's zone space.
    fn canonical_to_zone_space(&self, p: Point) -> Point {
        match self.template.units {
            ZoneUnits::Canonical => p,
            ZoneUnits::Fraction => Point::new(
                ratio(p.x, self.template.canonical_width),
                ratio(p.y, self.template.canonical_height),
            ),
        }
    }

    /// Assign blocks using page-local normalization.
    ///
    /// Each centroid is divided by its page's dimensions from `page_dims`
    /// (pages missing from the map use `1 x 1`; a zero dimension yields 0).
    pub fn map_to_zones(&self, blocks: &[Block], page_dims: &BTreeMap<u32, PageDims>) -> ZoneMapping {
        let mut mapping = self.empty_mapping(blocks.len());
        for block in blocks {
            let dims = page_dims.get(&block.page).copied().unwrap_or_else(PageDims::unit);
            let c = block.bbox.centroid();
            let unit = Point::new(ratio(c.x, dims.w), ratio(c.y, dims.h));
            let zone = self.zone_for_point(&self.to_zone_space(unit));
            push_assignment(&mut mapping, block, zone, None);
        }
        self.log_summary(&mapping);
        mapping
    }

    /// Assign blocks after mapping them into canonical space.
    ///
    /// `page_heights` supplies the source page height for the vertical flip;
    /// pages without a height are mapped without flipping.
    pub fn map_canonical(
        &self,
        blocks: &[Block],
        transform: &CanvasTransform,
        page_heights: &BTreeMap<u32, f64>,
    ) -> ZoneMapping {
        let mut mapping = self.empty_mapping(blocks.len());
        for block in blocks {
            let canonical = transform.to_canonical(&block.bbox, page_heights.get(&block.page).copied());
            let point = self.canonical_to_zone_space(canonical.centroid());
            let zone = self.zone_for_point(&point);
            push_assignment(&mut mapping, block, zone, Some(canonical));
        }
        self.log_summary(&mapping);
        mapping
    }

    fn empty_mapping(&self, capacity: usize) -> ZoneMapping {
        ZoneMapping {
            assigned: Vec::with_capacity(capacity),
            counts: IndexMap::new(),
            skipped_zones: self.skipped.clone(),
        }
    }

    fn log_summary(&self, mapping: &ZoneMapping) {
        log::debug!(
            "Template {}: {} of {} blocks assigned across {} zones",
            self.template.id,
            mapping.assigned_count(),
            mapping.assigned.len(),
            mapping.counts.len()
        );
    }
}

fn ratio(value: f64, extent: f64) -> f64 {
    if extent != 0.0 {
        value / extent
    } else {
        0.0
    }
}

fn push_assignment(mapping: &mut ZoneMapping, block: &Block, zone: Option<&Zone>, canonical_bbox: Option<BBox>) {
    let zone_id = zone.map(|z| z.id.clone());
    if let Some(id) = &zone_id {
        *mapping.counts.entry(id.clone()).or_insert(0) += 1;
    }
    mapping.assigned.push(AssignedBlock {
        block: block.clone(),
        zone_id,
        canonical_bbox,
    });
}

/// Assign blocks to zones using page-local normalization.
///
/// Convenience wrapper around [`ZoneMapper::map_to_zones`].
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use canvas_oxide::geometry::BBox;
/// use canvas_oxide::layout::{observe_page_dims, Block};
/// use canvas_oxide::zones::{map_to_zones, Template, Zone};
///
/// let template = Template::new("halves")
///     .with_zone(Zone::rect("left", BBox::new(0.0, 0.0, 0.5, 1.0)))
///     .with_zone(Zone::rect("right", BBox::new(0.5, 0.0, 1.0, 1.0)));
/// let blocks = vec![
///     Block::new(0, 0, BBox::new(0.0, 0.0, 100.0, 100.0)),
///     Block::new(1, 0, BBox::new(300.0, 0.0, 400.0, 100.0)),
/// ];
/// let mapping = map_to_zones(&blocks, &observe_page_dims(&blocks), &template);
/// assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("left"));
/// assert_eq!(mapping.assigned[1].zone_id.as_deref(), Some("right"));
/// assert_eq!(mapping.counts["left"], 1);
/// ```
pub fn map_to_zones(blocks: &[Block], page_dims: &BTreeMap<u32, PageDims>, template: &Template) -> ZoneMapping {
    ZoneMapper::new(template).map_to_zones(blocks, page_dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::observe_page_dims;

    fn block(id: u64, page: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> Block {
        Block::new(id, page, BBox::new(x0, y0, x1, y1))
    }

    fn quadrants() -> Template {
        Template::new("quadrants")
            .with_zone(Zone::rect("top-left", BBox::new(0.0, 0.0, 0.5, 0.5)))
            .with_zone(Zone::rect("top-right", BBox::new(0.5, 0.0, 1.0, 0.5)))
            .with_zone(Zone::rect("bottom", BBox::new(0.0, 0.5, 1.0, 1.0)))
    }

    #[test]
    fn test_assigns_by_centroid() {
        let blocks = vec![
            block(0, 0, 0.0, 0.0, 20.0, 20.0),
            block(1, 0, 80.0, 10.0, 100.0, 20.0),
            block(2, 0, 10.0, 80.0, 90.0, 100.0),
        ];
        let mapping = map_to_zones(&blocks, &observe_page_dims(&blocks), &quadrants());
        let zones: Vec<Option<&str>> = mapping.assigned.iter().map(|a| a.zone_id.as_deref()).collect();
        assert_eq!(zones, vec![Some("top-left"), Some("top-right"), Some("bottom")]);
        assert_eq!(mapping.assigned_count(), 3);
    }

    #[test]
    fn test_first_declared_zone_wins_on_overlap() {
        let template = Template::new("overlap")
            .with_zone(Zone::rect("a", BBox::new(0.0, 0.0, 0.8, 0.8)))
            .with_zone(Zone::rect("b", BBox::new(0.2, 0.2, 1.0, 1.0)));
        let blocks = vec![block(0, 0, 40.0, 40.0, 60.0, 60.0)];
        let dims = BTreeMap::from([(0, PageDims::new(100.0, 100.0))]);
        let mapping = map_to_zones(&blocks, &dims, &template);
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("a"));

        let reversed = Template::new("overlap")
            .with_zone(Zone::rect("b", BBox::new(0.2, 0.2, 1.0, 1.0)))
            .with_zone(Zone::rect("a", BBox::new(0.0, 0.0, 0.8, 0.8)));
        let mapping = map_to_zones(&blocks, &dims, &reversed);
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_outside_every_zone_is_none() {
        let template = Template::new("small").with_zone(Zone::rect("a", BBox::new(0.0, 0.0, 0.1, 0.1)));
        let blocks = vec![block(0, 0, 50.0, 50.0, 60.0, 60.0)];
        let dims = BTreeMap::from([(0, PageDims::new(100.0, 100.0))]);
        let mapping = map_to_zones(&blocks, &dims, &template);
        assert_eq!(mapping.assigned[0].zone_id, None);
        assert!(mapping.counts.is_empty());
        assert_eq!(mapping.unassigned().count(), 1);
    }

    #[test]
    fn test_missing_page_dims_default_to_unit() {
        let template = Template::new("t").with_zone(Zone::rect("a", BBox::new(0.0, 0.0, 1.0, 1.0)));
        let blocks = vec![block(0, 3, 0.2, 0.2, 0.4, 0.4)];
        let mapping = map_to_zones(&blocks, &BTreeMap::new(), &template);
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_zero_dims_and_zero_area_do_not_panic() {
        let template = Template::new("t").with_zone(Zone::rect("a", BBox::new(0.0, 0.0, 1.0, 1.0)));
        let blocks = vec![block(0, 0, 0.0, 0.0, 0.0, 0.0)];
        let mapping = map_to_zones(&blocks, &observe_page_dims(&blocks), &template);
        // centroid collapses to (0, 0): lower-left corner is inside under the half-open rule
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_counts_follow_first_seen_order() {
        let blocks = vec![
            block(0, 0, 60.0, 60.0, 90.0, 90.0),
            block(1, 0, 0.0, 0.0, 10.0, 10.0),
            block(2, 0, 60.0, 70.0, 90.0, 100.0),
        ];
        let dims = BTreeMap::from([(0, PageDims::new(100.0, 100.0))]);
        let mapping = map_to_zones(&blocks, &dims, &quadrants());
        let keys: Vec<&str> = mapping.counts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["bottom", "top-left"]);
        assert_eq!(mapping.counts["bottom"], 2);
    }

    #[test]
    fn test_invalid_zone_is_skipped_not_fatal() {
        let template = Template::new("t")
            .with_zone(Zone::polygon("broken", vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]))
            .with_zone(Zone::rect("ok", BBox::new(0.0, 0.0, 1.0, 1.0)));
        let blocks = vec![block(0, 0, 10.0, 10.0, 20.0, 20.0)];
        let dims = BTreeMap::from([(0, PageDims::new(100.0, 100.0))]);
        let mapping = map_to_zones(&blocks, &dims, &template);
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("ok"));
        assert_eq!(mapping.skipped_zones, vec!["broken".to_string()]);
    }

    #[test]
    fn test_canonical_units_template() {
        let template = Template::new("px")
            .with_canonical_size(1000.0, 1400.0)
            .with_units(ZoneUnits::Canonical)
            .with_zone(Zone::rect("top", BBox::new(0.0, 0.0, 1000.0, 700.0)));
        let blocks = vec![block(0, 0, 0.0, 0.0, 100.0, 100.0), block(1, 0, 0.0, 900.0, 100.0, 1000.0)];
        let dims = BTreeMap::from([(0, PageDims::new(500.0, 1000.0))]);
        let mapping = map_to_zones(&blocks, &dims, &template);
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("top"));
        assert_eq!(mapping.assigned[1].zone_id, None);
    }

    #[test]
    fn test_map_canonical_flips_before_testing() {
        // Bottom-left quadrant of a 100x100 canonical canvas
        let template = Template::new("bl")
            .with_canonical_size(100.0, 100.0)
            .with_zone(Zone::rect("bottom-left", BBox::new(0.0, 0.0, 0.5, 0.5)));
        let transform = CanvasTransform::fit_to_canonical(100.0, 100.0, 100.0, 100.0);
        // Source top-left origin: y=85..95 is near the bottom of the page
        let blocks = vec![block(0, 0, 5.0, 85.0, 15.0, 95.0)];
        let heights = BTreeMap::from([(0, 100.0)]);
        let mapping = ZoneMapper::new(&template).map_canonical(&blocks, &transform, &heights);
        assert_eq!(mapping.assigned[0].zone_id.as_deref(), Some("bottom-left"));
        assert_eq!(mapping.assigned[0].canonical_bbox, Some(BBox::new(5.0, 5.0, 15.0, 15.0)));
        assert_eq!(mapping.assigned[0].block.bbox, BBox::new(5.0, 85.0, 15.0, 95.0));
    }

    #[test]
    fn test_assigned_block_json_is_flat() {
        let template = Template::new("t").with_zone(Zone::rect("a", BBox::new(0.0, 0.0, 1.0, 1.0)));
        let blocks = vec![block(4, 0, 0.1, 0.1, 0.2, 0.2).with_text("hi")];
        let mapping = map_to_zones(&blocks, &BTreeMap::new(), &template);
        let v = serde_json::to_value(&mapping).unwrap();
        assert_eq!(v["assigned"][0]["zoneId"], "a");
        assert_eq!(v["assigned"][0]["text"], "hi");
        assert_eq!(v["assigned"][0]["id"], 4);
        assert_eq!(v["counts"]["a"], 1);
    }
}
