//! Integration tests for canvas calibration and polygon membership.

use canvas_oxide::geometry::{point_in_polygon, BBox, CanvasTransform, Point};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn unit_square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ]
}

fn non_zero_scale() -> impl Strategy<Value = f64> {
    prop_oneof![0.01f64..100.0, -100.0f64..-0.01]
}

fn ordered_bbox() -> impl Strategy<Value = BBox> {
    (-1.0e4f64..1.0e4, -1.0e4f64..1.0e4, 0.0f64..1.0e3, 0.0f64..1.0e3)
        .prop_map(|(x, y, w, h)| BBox::new(x, y, x + w, y + h))
}

// ============================================================================
// Round trip
// ============================================================================

proptest! {
    #[test]
    fn prop_round_trip_recovers_bbox(
        bbox in ordered_bbox(),
        sx in non_zero_scale(),
        sy in non_zero_scale(),
        ox in -1.0e4f64..1.0e4,
        oy in -1.0e4f64..1.0e4,
        flip in any::<bool>(),
        page_height in prop::option::of(1.0f64..5.0e3),
    ) {
        let t = CanvasTransform::identity()
            .with_scale(sx, sy)
            .with_offset(ox, oy)
            .with_flip_y(flip);
        let canonical = t.to_canonical(&bbox, page_height);
        let back = t.from_canonical(&canonical, page_height).unwrap();
        prop_assert!(back.approx_eq(&bbox, 1e-6), "{:?} -> {:?} -> {:?}", bbox, canonical, back);
    }

    #[test]
    fn prop_point_in_polygon_is_deterministic(x in -2.0f64..3.0, y in -2.0f64..3.0) {
        let square = unit_square();
        let p = Point::new(x, y);
        let first = point_in_polygon(&p, &square);
        for _ in 0..3 {
            prop_assert_eq!(point_in_polygon(&p, &square), first);
        }
    }

    #[test]
    fn prop_interior_points_inside(x in 0.01f64..0.99, y in 0.01f64..0.99) {
        prop_assert!(point_in_polygon(&Point::new(x, y), &unit_square()));
    }
}

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn test_unit_square_membership() {
    let square = unit_square();
    assert!(point_in_polygon(&Point::new(0.5, 0.5), &square));
    assert!(!point_in_polygon(&Point::new(1.5, 0.5), &square));
}

#[test]
fn test_zero_scale_collapses_to_offset() {
    let t = CanvasTransform::identity().with_scale(0.0, 0.0).with_offset(7.0, 9.0);
    let out = t.to_canonical(&BBox::new(10.0, 20.0, 30.0, 40.0), Some(100.0));
    assert_eq!(out, BBox::new(7.0, 9.0, 7.0, 9.0));
    assert!(t.from_canonical(&out, Some(100.0)).is_none());
}

#[test]
fn test_default_fit_for_a4_poster() {
    // 595x842 pt page into the 1000x1400 canvas: height is the binding side
    let t = CanvasTransform::fit_to_canonical(595.0, 842.0, 1000.0, 1400.0);
    let k = 1400.0 / 842.0;
    assert!((t.scale_x - k).abs() < 1e-12);
    assert_eq!(t.scale_x, t.scale_y);
    let page = t.to_canonical(&BBox::new(0.0, 0.0, 595.0, 842.0), Some(842.0));
    assert!(page.x1 <= 1000.0 + 1e-9);
    assert!((page.y1 - 1400.0).abs() < 1e-9);
}

#[test]
fn test_transform_json_shape() {
    let t: CanvasTransform =
        serde_json::from_str(r#"{"scaleX": 2.0, "scaleY": 3.0, "offsetX": 1.0, "offsetY": -1.0, "flipY": true}"#)
            .unwrap();
    assert_eq!(t.scale_y, 3.0);
    assert!(t.flip_y);
    let json = serde_json::to_value(t).unwrap();
    assert_eq!(json["offsetY"], serde_json::json!(-1.0));

    let minimal: CanvasTransform = serde_json::from_str(r#"{"scaleX": 1.0, "scaleY": 1.0}"#).unwrap();
    assert_eq!(minimal, CanvasTransform::identity());
}
