//! Conversion of raw engine element JSON into [`Block`]s.
//!
//! Two engine dialects are understood:
//!
//! - structured extraction output: an object with a `content` or `elements`
//!   array whose entries carry `bounds` (or `Bounds`, `bound`, `Boundary`) as
//!   `[x0, y0, x1, y1]`, a 0-based `page` (or `Page`), `text`/`Text` and
//!   `type`/`Type`;
//! - partition output: a bare array (or `elements`) whose entries carry
//!   `coordinates.points` polygons, `metadata.page_number` (1-based), `text`
//!   and `type`/`category`.
//!
//! Anything unreadable degrades to defaults (page 0, zero box, no text) rather
//! than failing the whole document.

use serde_json::Value;

use crate::geometry::{BBox, Point};
use crate::layout::{Block, BlockRole};

const BOUNDS_KEYS: &[&str] = &["bounds", "Bounds", "bound", "Boundary"];

/// Parse an engine document into blocks, ids assigned by element index.
///
/// # Examples
///
/// ```
/// use canvas_oxide::extract::parse_elements;
/// use canvas_oxide::layout::BlockRole;
/// use serde_json::json;
///
/// let doc = json!({
///     "elements": [
///         { "Path": "//Document/H1", "Type": "Title", "Text": "Mission", "Page": 0,
///           "Bounds": [10.0, 700.0, 200.0, 720.0] }
///     ]
/// });
/// let blocks = parse_elements(&doc);
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].role, BlockRole::Heading);
/// assert_eq!(blocks[0].text.as_deref(), Some("Mission"));
/// ```
pub fn parse_elements(document: &Value) -> Vec<Block> {
    element_list(document)
        .iter()
        .enumerate()
        .map(|(i, el)| parse_element(i as u64, el))
        .collect()
}

fn element_list(document: &Value) -> &[Value] {
    if let Some(items) = document.as_array() {
        return items;
    }
    ["content", "elements"]
        .iter()
        .find_map(|key| document.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn parse_element(id: u64, el: &Value) -> Block {
    let role = BlockRole::from_engine_type(first_str(el, &["type", "Type", "category"]).unwrap_or(""));
    let mut block = Block::new(id, page_of(el), bbox_of(el)).with_role(role);
    if let Some(text) = first_str(el, &["text", "Text"]) {
        block = block.with_text(text);
    }
    if role == BlockRole::Table {
        if let Some(table) = el.get("table").or_else(|| el.get("Table")) {
            block = block.with_table_data(table.clone());
        } else if let Some(html) = el.get("text_as_html").and_then(Value::as_str) {
            block = block.with_table_data(serde_json::json!({ "html": html }));
        }
    }
    block
}

fn first_str<'v>(el: &'v Value, keys: &[&str]) -> Option<&'v str> {
    keys.iter().find_map(|k| el.get(*k).and_then(Value::as_str))
}

/// 0-based page: explicit 1-based page numbers win over a 0-based `page`.
fn page_of(el: &Value) -> u32 {
    let one_based = el
        .get("metadata")
        .and_then(|m| m.get("page_number"))
        .or_else(|| el.get("page_number"))
        .and_then(Value::as_f64);
    if let Some(page1) = one_based {
        return (page1 - 1.0).max(0.0) as u32;
    }
    el.get("page")
        .or_else(|| el.get("Page"))
        .and_then(Value::as_f64)
        .map(|p| p.max(0.0) as u32)
        .unwrap_or(0)
}

fn bbox_of(el: &Value) -> BBox {
    let coords = el.get("coordinates");
    let points = coords
        .and_then(|c| c.get("points"))
        .or(coords)
        .and_then(Value::as_array);
    if let Some(points) = points {
        let points: Vec<Point> = points.iter().map(point_of).collect();
        if let Some(bbox) = BBox::enclosing(&points) {
            return bbox;
        }
    }

    let bounds = BOUNDS_KEYS
        .iter()
        .find_map(|k| el.get(*k).and_then(Value::as_array))
        .filter(|b| b.len() >= 4);
    match bounds {
        Some(b) => BBox::new(number(&b[0]), number(&b[1]), number(&b[2]), number(&b[3])),
        None => BBox::new(0.0, 0.0, 0.0, 0.0),
    }
}

fn point_of(value: &Value) -> Point {
    let coord = |i: usize| value.get(i).map(number).unwrap_or(0.0);
    Point::new(coord(0), coord(1))
}

fn number(value: &Value) -> f64 {
    value.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_output() {
        let doc = json!({
            "elements": [
                { "Type": "P", "Text": "Body", "Page": 2, "Bounds": [1, 2, 3, 4] },
                { "type": "Table", "page": 0, "bounds": [0, 0, 10, 10], "table": {"rows": 2} }
            ]
        });
        let blocks = parse_elements(&doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id, 0);
        assert_eq!(blocks[0].page, 2);
        assert_eq!(blocks[0].bbox, BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(blocks[0].role, BlockRole::Paragraph);
        assert_eq!(blocks[1].id, 1);
        assert_eq!(blocks[1].role, BlockRole::Table);
        assert_eq!(blocks[1].table_data, Some(json!({"rows": 2})));
    }

    #[test]
    fn test_partition_output() {
        let doc = json!([
            {
                "type": "Title",
                "text": "CORE SERVICES",
                "metadata": { "page_number": 3 },
                "coordinates": { "points": [[10, 20], [10, 40], [90, 40], [90, 20]] }
            },
            {
                "type": "Table",
                "text": "a b",
                "text_as_html": "<table></table>",
                "metadata": { "page_number": 1 },
                "coordinates": { "points": [[0, 0], [5, 5]] }
            }
        ]);
        let blocks = parse_elements(&doc);
        assert_eq!(blocks[0].page, 2);
        assert_eq!(blocks[0].role, BlockRole::Heading);
        assert_eq!(blocks[0].bbox, BBox::new(10.0, 20.0, 90.0, 40.0));
        assert_eq!(blocks[1].page, 0);
        assert_eq!(blocks[1].table_data, Some(json!({"html": "<table></table>"})));
    }

    #[test]
    fn test_content_array() {
        let doc = json!({ "content": [{ "text": "x", "bounds": [0, 0, 1, 1] }] });
        assert_eq!(parse_elements(&doc).len(), 1);
    }

    #[test]
    fn test_malformed_elements_degrade() {
        let doc = json!({
            "elements": [
                { "text": 42, "bounds": [1, 2] },
                { "metadata": { "page_number": 0 }, "coordinates": { "points": [] } },
                "not an object"
            ]
        });
        let blocks = parse_elements(&doc);
        assert_eq!(blocks.len(), 3);
        for b in &blocks {
            assert_eq!(b.page, 0);
            assert_eq!(b.bbox, BBox::new(0.0, 0.0, 0.0, 0.0));
            assert!(b.text.is_none());
        }
    }

    #[test]
    fn test_unknown_shape_is_empty() {
        assert!(parse_elements(&json!({"pages": []})).is_empty());
        assert!(parse_elements(&json!(null)).is_empty());
    }
}
