//! Geometric primitives for zone mapping.
//!
//! This module provides the point, bounding-box and polygon types shared by the
//! coordinate transform, the zone mapper and the reconciler, together with the
//! ray-casting membership test used for every zone.

pub mod transform;

pub use transform::{CanvasTransform, DEFAULT_CANONICAL_HEIGHT, DEFAULT_CANONICAL_WIDTH};

use serde::{Deserialize, Serialize};

/// Denominator floor for horizontal polygon edges in [`point_in_polygon`].
pub const EDGE_EPSILON: f64 = 1e-9;

/// A 2D point. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// An axis-aligned bounding box `(x0, y0, x1, y1)`. Serialized as a 4-element array.
///
/// Zero-area boxes (point annotations) are valid everywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f64,
    /// Lower coordinate on the vertical axis
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Upper coordinate on the vertical axis
    pub y1: f64,
}

impl BBox {
    /// Create a box from its two corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::geometry::BBox;
    ///
    /// let bbox = BBox::new(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(bbox.width(), 100.0);
    /// assert_eq!(bbox.height(), 50.0);
    /// ```
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build the tightest box around a set of points.
    ///
    /// Returns `None` for an empty set.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BBox::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.x0 = bbox.x0.min(p.x);
            bbox.y0 = bbox.y0.min(p.y);
            bbox.x1 = bbox.x1.max(p.x);
            bbox.y1 = bbox.y1.max(p.y);
        }
        Some(bbox)
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area of the box (zero for point annotations).
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Smaller of the two vertical coordinates; reading-order key.
    pub fn min_y(&self) -> f64 {
        self.y0.min(self.y1)
    }

    /// Geometric center of the box.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::geometry::BBox;
    ///
    /// let c = BBox::new(0.0, 0.0, 100.0, 50.0).centroid();
    /// assert_eq!((c.x, c.y), (50.0, 25.0));
    /// ```
    pub fn centroid(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Inclusive containment check, used for quick rejection before polygon tests.
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// The four corners, counter-clockwise from `(x0, y0)`.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ]
    }

    /// All four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &BBox, tolerance: f64) -> bool {
        (self.x0 - other.x0).abs() <= tolerance
            && (self.y0 - other.y0).abs() <= tolerance
            && (self.x1 - other.x1).abs() <= tolerance
            && (self.y1 - other.y1).abs() <= tolerance
    }
}

impl From<[f64; 4]> for BBox {
    fn from([x0, y0, x1, y1]: [f64; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// A closed polygon given by its ordered vertices.
///
/// The enclosing box is computed once on construction and used to reject
/// far-away points before the ray-casting test. It lives with the polygon, so
/// replacing a template replaces its bounds too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon {
    points: Vec<Point>,
    bounds: Option<BBox>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(points: Vec<Point>) -> Self {
        let bounds = BBox::enclosing(&points);
        Self { points, bounds }
    }

    /// Polygon covering an axis-aligned rectangle `[x1, y1, x2, y2]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::geometry::{BBox, Point, Polygon};
    ///
    /// let quadrant = Polygon::from_rect(BBox::new(0.0, 0.0, 0.5, 0.5));
    /// assert_eq!(quadrant.points().len(), 4);
    /// assert!(quadrant.contains(&Point::new(0.1, 0.1)));
    /// assert!(!quadrant.contains(&Point::new(0.9, 0.9)));
    /// ```
    pub fn from_rect(rect: BBox) -> Self {
        Self::new(rect.corners().to_vec())
    }

    /// Vertices in declaration order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Enclosing box, `None` when the polygon has no vertices.
    pub fn bounds(&self) -> Option<BBox> {
        self.bounds
    }

    /// At least three vertices, all finite.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3 && self.points.iter().all(Point::is_finite)
    }

    /// Membership test with bounding-box rejection.
    pub fn contains(&self, point: &Point) -> bool {
        match self.bounds {
            Some(bounds) if bounds.contains_point(point) => point_in_polygon(point, &self.points),
            _ => false,
        }
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(p: Polygon) -> Self {
        p.points
    }
}

/// Ray-casting point-in-polygon test (even-odd rule).
///
/// A horizontal ray from `point` toggles the result at each edge it crosses.
/// Horizontal edges would divide by zero; their denominator is floored to
/// [`EDGE_EPSILON`]. Points exactly on an edge may resolve either way: the
/// half-open `>` comparison includes lower/left boundaries and excludes
/// upper/right ones for axis-aligned polygons.
///
/// # Examples
///
/// ```
/// use canvas_oxide::geometry::{point_in_polygon, Point};
///
/// let square = [
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
/// ];
/// assert!(point_in_polygon(&Point::new(0.5, 0.5), &square));
/// assert!(!point_in_polygon(&Point::new(1.5, 0.5), &square));
/// ```
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    if polygon.is_empty() {
        return false;
    }

    let (x, y) = (point.x, point.y);
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        if (yi > y) != (yj > y) {
            let mut den = yj - yi;
            if den == 0.0 {
                den = EDGE_EPSILON;
            }
            if x < (xj - xi) * (y - yi) / den + xi {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
