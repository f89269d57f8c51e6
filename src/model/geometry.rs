//! Geometry primitives and the annotation shape union.
//!
//! All coordinates are canvas-intrinsic: the image's own pixel space,
//! independent of zoom and pan. Everything here is pure; the controller and
//! the tools build on these helpers.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_POLYGON_VERTICES, TEXT_GLYPH_WIDTH_RATIO, style};

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Return this point shifted by a delta.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Delta that moves `origin` onto `self`.
    pub fn delta_from(&self, origin: &Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Shortest distance from this point to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let (abx, aby) = b.delta_from(a);
        let len_sq = abx * abx + aby * aby;
        if len_sq == 0.0 {
            return self.distance_to(a);
        }
        let (apx, apy) = self.delta_from(a);
        let t = ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0);
        self.distance_to(&Point::new(a.x + t * abx, a.y + t * aby))
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f64,
    /// Top-left corner Y coordinate
    pub y: f64,
    /// Width of the box
    pub width: f64,
    /// Height of the box
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized bounding box from two corner points.
    ///
    /// The origin is always the min corner and the extents are never
    /// negative, whatever order the corners come in. Drawing and resizing
    /// both go through here.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box containing all points, or `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Check if a point is inside the box.
    pub fn contains(&self, point: &Point) -> bool {
        self.contains_with_tolerance(point, 0.0)
    }

    /// Check if a point is inside the box grown by `tolerance` on every side.
    pub fn contains_with_tolerance(&self, point: &Point, tolerance: f64) -> bool {
        point.x >= self.x - tolerance
            && point.x <= self.x + self.width + tolerance
            && point.y >= self.y - tolerance
            && point.y <= self.y + self.height + tolerance
    }

    /// Get the area of the box.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get the top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Position of a named corner.
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::Nw => self.top_left(),
            Corner::Ne => Point::new(self.x + self.width, self.y),
            Corner::Sw => Point::new(self.x, self.y + self.height),
            Corner::Se => self.bottom_right(),
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Corner of a rectangle used as a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// All corners, in handle hit-test order.
    pub fn all() -> &'static [Corner] {
        &[Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se]
    }

    /// The diagonally opposite corner, which stays fixed during a resize.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::Nw => Corner::Se,
            Corner::Ne => Corner::Sw,
            Corner::Sw => Corner::Ne,
            Corner::Se => Corner::Nw,
        }
    }
}

/// An interactive hotspot on a selected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Rectangle resize corner.
    Corner(Corner),
    /// Line endpoint, by point index (0 or 1).
    Endpoint(usize),
}

// ============================================================================
// Skeleton Parts
// ============================================================================

/// A skeleton joint, tagged with the label that was active when it was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonPoint {
    pub x: f64,
    pub y: f64,
    pub label_id: String,
    pub label_name: String,
    pub color: String,
}

impl SkeletonPoint {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A bone between two skeleton joints, referenced by point index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonEdge {
    pub from: usize,
    pub to: usize,
    pub label_id: String,
    pub label_name: String,
    pub color: String,
}

// ============================================================================
// Shape Union
// ============================================================================

/// Discriminant of [`Geometry`], also used as the wire `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Rectangle,
    Polygon,
    Line,
    Path,
    Brush,
    Text,
    Point,
    Skeleton,
}

impl AnnotationKind {
    /// Get the wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Polygon => "polygon",
            AnnotationKind::Line => "line",
            AnnotationKind::Path => "path",
            AnnotationKind::Brush => "brush",
            AnnotationKind::Text => "text",
            AnnotationKind::Point => "point",
            AnnotationKind::Skeleton => "skeleton",
        }
    }

    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Get all kinds.
    pub fn all() -> &'static [AnnotationKind] {
        &[
            AnnotationKind::Rectangle,
            AnnotationKind::Polygon,
            AnnotationKind::Line,
            AnnotationKind::Path,
            AnnotationKind::Brush,
            AnnotationKind::Text,
            AnnotationKind::Point,
            AnnotationKind::Skeleton,
        ]
    }
}

/// Shape data for an annotation, keyed by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// Axis-aligned rectangle; extents are non-negative.
    Rectangle {
        position: Point,
        width: f64,
        height: f64,
    },
    /// Closed polygon; the pen tool repeats the first point at the end.
    Polygon { points: Vec<Point> },
    /// Straight two-point line.
    Line { points: Vec<Point> },
    /// Freehand path.
    Path { points: Vec<Point> },
    /// Freehand brush stroke.
    Brush { points: Vec<Point> },
    /// Text label anchored at a point.
    Text {
        position: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Single point marker.
    Point {
        position: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Multi-label keypoint skeleton.
    Skeleton {
        points: Vec<SkeletonPoint>,
        edges: Vec<SkeletonEdge>,
    },
}

impl Geometry {
    /// Rectangle geometry from a (normalized) bounding box.
    pub fn rectangle(bbox: BoundingBox) -> Self {
        Geometry::Rectangle {
            position: bbox.top_left(),
            width: bbox.width,
            height: bbox.height,
        }
    }

    /// Get the type of this shape.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Geometry::Rectangle { .. } => AnnotationKind::Rectangle,
            Geometry::Polygon { .. } => AnnotationKind::Polygon,
            Geometry::Line { .. } => AnnotationKind::Line,
            Geometry::Path { .. } => AnnotationKind::Path,
            Geometry::Brush { .. } => AnnotationKind::Brush,
            Geometry::Text { .. } => AnnotationKind::Text,
            Geometry::Point { .. } => AnnotationKind::Point,
            Geometry::Skeleton { .. } => AnnotationKind::Skeleton,
        }
    }

    /// Point list of polyline-like shapes.
    pub fn polyline(&self) -> Option<&[Point]> {
        match self {
            Geometry::Polygon { points }
            | Geometry::Line { points }
            | Geometry::Path { points }
            | Geometry::Brush { points } => Some(points),
            _ => None,
        }
    }

    /// Get the bounding box of this shape.
    ///
    /// Skeletons are bounded by their points only. Returns `None` for an
    /// empty point list.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Geometry::Rectangle {
                position,
                width,
                height,
            } => Some(BoundingBox::new(position.x, position.y, *width, *height)),
            Geometry::Text { position, .. } | Geometry::Point { position, .. } => {
                Some(BoundingBox::new(position.x, position.y, 0.0, 0.0))
            }
            Geometry::Skeleton { points, .. } => {
                let positions: Vec<Point> = points.iter().map(SkeletonPoint::position).collect();
                BoundingBox::from_points(&positions)
            }
            _ => self.polyline().and_then(BoundingBox::from_points),
        }
    }

    /// Check whether `point` hits this shape within `tolerance`.
    ///
    /// Text is measured with the default font size; use
    /// [`Annotation::hit_test`](crate::model::Annotation::hit_test) to honor
    /// the annotation's own style.
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> bool {
        self.hit_test_with_font(point, tolerance, style::DEFAULT_FONT_SIZE)
    }

    pub(crate) fn hit_test_with_font(&self, point: &Point, tolerance: f64, font_size: f64) -> bool {
        match self {
            Geometry::Rectangle { .. } => self
                .bounding_box()
                .is_some_and(|b| b.contains_with_tolerance(point, tolerance)),
            Geometry::Polygon { points } => {
                polygon_contains(points, point) || near_polyline(points, point, tolerance, true)
            }
            Geometry::Line { points } | Geometry::Path { points } | Geometry::Brush { points } => {
                near_polyline(points, point, tolerance, false)
            }
            Geometry::Point { position, .. } => position.distance_to(point) <= tolerance,
            Geometry::Text { position, text } => {
                text_box(position, text.as_deref(), font_size)
                    .contains_with_tolerance(point, tolerance)
            }
            Geometry::Skeleton { points, edges } => {
                points
                    .iter()
                    .any(|p| p.position().distance_to(point) <= tolerance)
                    || edges.iter().any(|e| {
                        match (points.get(e.from), points.get(e.to)) {
                            (Some(a), Some(b)) => {
                                point.distance_to_segment(&a.position(), &b.position())
                                    <= tolerance
                            }
                            _ => false,
                        }
                    })
            }
        }
    }

    /// Handles exposed when this shape is selected.
    ///
    /// Rectangles get four corners, lines get their two endpoints; every
    /// other shape has no resize affordance.
    pub fn handles(&self) -> Vec<(Handle, Point)> {
        match self {
            Geometry::Rectangle { .. } => match self.bounding_box() {
                Some(bbox) => Corner::all()
                    .iter()
                    .map(|c| (Handle::Corner(*c), bbox.corner(*c)))
                    .collect(),
                None => Vec::new(),
            },
            Geometry::Line { points } => points
                .iter()
                .take(2)
                .enumerate()
                .map(|(i, p)| (Handle::Endpoint(i), *p))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Find the handle under `point`, if any.
    pub fn hit_test_handle(&self, point: &Point, radius: f64) -> Option<Handle> {
        self.handles()
            .into_iter()
            .find(|(_, pos)| pos.distance_to(point) <= radius)
            .map(|(handle, _)| handle)
    }

    /// Copy of this shape moved by a delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Geometry {
        let shift = |points: &[Point]| points.iter().map(|p| p.offset(dx, dy)).collect();
        match self {
            Geometry::Rectangle {
                position,
                width,
                height,
            } => Geometry::Rectangle {
                position: position.offset(dx, dy),
                width: *width,
                height: *height,
            },
            Geometry::Polygon { points } => Geometry::Polygon {
                points: shift(points),
            },
            Geometry::Line { points } => Geometry::Line {
                points: shift(points),
            },
            Geometry::Path { points } => Geometry::Path {
                points: shift(points),
            },
            Geometry::Brush { points } => Geometry::Brush {
                points: shift(points),
            },
            Geometry::Text { position, text } => Geometry::Text {
                position: position.offset(dx, dy),
                text: text.clone(),
            },
            Geometry::Point { position, text } => Geometry::Point {
                position: position.offset(dx, dy),
                text: text.clone(),
            },
            Geometry::Skeleton { points, edges } => Geometry::Skeleton {
                points: points
                    .iter()
                    .map(|p| SkeletonPoint {
                        x: p.x + dx,
                        y: p.y + dy,
                        ..p.clone()
                    })
                    .collect(),
                edges: edges.clone(),
            },
        }
    }

    /// Rectangle resized by dragging `corner` by a delta.
    ///
    /// The opposite corner stays fixed. Returns `None` for non-rectangles.
    pub fn resized(&self, corner: Corner, dx: f64, dy: f64) -> Option<Geometry> {
        if !matches!(self, Geometry::Rectangle { .. }) {
            return None;
        }
        let bbox = self.bounding_box()?;
        let fixed = bbox.corner(corner.opposite());
        let moved = bbox.corner(corner).offset(dx, dy);
        Some(Geometry::rectangle(BoundingBox::from_corners(fixed, moved)))
    }

    /// Line with one endpoint moved by a delta. Returns `None` for
    /// non-lines or an out-of-range index.
    pub fn with_endpoint_moved(&self, index: usize, dx: f64, dy: f64) -> Option<Geometry> {
        let Geometry::Line { points } = self else {
            return None;
        };
        if index >= points.len() {
            return None;
        }
        let mut points = points.clone();
        points[index] = points[index].offset(dx, dy);
        Some(Geometry::Line { points })
    }
}

/// Estimated box covered by a text label.
pub fn text_box(position: &Point, text: Option<&str>, font_size: f64) -> BoundingBox {
    let chars = text.map(|t| t.chars().count()).unwrap_or(0).max(1);
    BoundingBox::new(
        position.x,
        position.y,
        chars as f64 * font_size * TEXT_GLYPH_WIDTH_RATIO,
        font_size,
    )
}

/// SVG path data (`M x y L x y ...`) for a point sequence.
pub fn svg_path_data(points: &[Point]) -> String {
    let mut data = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            data.push(' ');
        }
        data.push_str(&format!("{} {} {}", if i == 0 { 'M' } else { 'L' }, p.x, p.y));
    }
    data
}

/// Point-in-polygon test (ray casting).
fn polygon_contains(vertices: &[Point], point: &Point) -> bool {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = &vertices[i];
        let vj = &vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn near_polyline(points: &[Point], point: &Point, tolerance: f64, closed: bool) -> bool {
    match points {
        [] => false,
        [only] => only.distance_to(point) <= tolerance,
        _ => {
            let open = points
                .windows(2)
                .any(|w| point.distance_to_segment(&w[0], &w[1]) <= tolerance);
            let closing = closed
                && points
                    .first()
                    .zip(points.last())
                    .is_some_and(|(first, last)| {
                        point.distance_to_segment(last, first) <= tolerance
                    });
            open || closing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((Point::new(5.0, 3.0).distance_to_segment(&a, &b) - 3.0).abs() < 1e-9);
        assert!((Point::new(13.0, 4.0).distance_to_segment(&a, &b) - 5.0).abs() < 1e-9);
        // Degenerate segment
        assert!((Point::new(3.0, 4.0).distance_to_segment(&a, &a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_from_corners() {
        let bbox = BoundingBox::from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0));
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 40.0, 60.0));

        // Test with reversed corners
        let bbox2 = BoundingBox::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(bbox, bbox2);
    }

    #[test]
    fn test_bounding_box_per_kind() {
        let poly = Geometry::Polygon { points: square() };
        assert_eq!(
            poly.bounding_box(),
            Some(BoundingBox::new(0.0, 0.0, 100.0, 100.0))
        );

        let text = Geometry::Text {
            position: Point::new(5.0, 6.0),
            text: Some("hi".into()),
        };
        assert_eq!(text.bounding_box(), Some(BoundingBox::new(5.0, 6.0, 0.0, 0.0)));

        let empty = Geometry::Brush { points: vec![] };
        assert_eq!(empty.bounding_box(), None);
    }

    #[test]
    fn test_skeleton_bounding_box_uses_points_only() {
        let joint = |x, y| SkeletonPoint {
            x,
            y,
            label_id: "l".into(),
            label_name: "head".into(),
            color: "#00ff00".into(),
        };
        let skeleton = Geometry::Skeleton {
            points: vec![joint(10.0, 10.0), joint(30.0, 50.0)],
            edges: vec![],
        };
        assert_eq!(
            skeleton.bounding_box(),
            Some(BoundingBox::new(10.0, 10.0, 20.0, 40.0))
        );
    }

    #[test]
    fn test_hit_test_shapes() {
        let rect = Geometry::rectangle(BoundingBox::new(10.0, 10.0, 50.0, 50.0));
        assert!(rect.hit_test(&Point::new(30.0, 30.0), 0.0));
        assert!(rect.hit_test(&Point::new(8.0, 30.0), 3.0));
        assert!(!rect.hit_test(&Point::new(100.0, 100.0), 3.0));

        let poly = Geometry::Polygon { points: square() };
        assert!(poly.hit_test(&Point::new(50.0, 50.0), 0.0));
        assert!(poly.hit_test(&Point::new(102.0, 50.0), 3.0));
        assert!(!poly.hit_test(&Point::new(150.0, 50.0), 3.0));

        let line = Geometry::Line {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        };
        assert!(line.hit_test(&Point::new(50.0, 2.0), 3.0));
        assert!(!line.hit_test(&Point::new(50.0, 20.0), 3.0));

        let point = Geometry::Point {
            position: Point::new(5.0, 5.0),
            text: None,
        };
        assert!(point.hit_test(&Point::new(7.0, 5.0), 3.0));
    }

    #[test]
    fn test_handles() {
        let rect = Geometry::rectangle(BoundingBox::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(rect.handles().len(), 4);
        assert_eq!(
            rect.hit_test_handle(&Point::new(111.0, 61.0), 4.0),
            Some(Handle::Corner(Corner::Se))
        );

        let line = Geometry::Line {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        };
        assert_eq!(
            line.hit_test_handle(&Point::new(99.0, 1.0), 4.0),
            Some(Handle::Endpoint(1))
        );

        let path = Geometry::Path { points: square() };
        assert!(path.handles().is_empty());
    }

    #[test]
    fn test_resize_se_and_nw() {
        let rect = Geometry::rectangle(BoundingBox::new(10.0, 10.0, 100.0, 50.0));

        let se = rect.resized(Corner::Se, 20.0, 10.0).unwrap();
        assert_eq!(se, Geometry::rectangle(BoundingBox::new(10.0, 10.0, 120.0, 60.0)));

        let nw = rect.resized(Corner::Nw, 5.0, -5.0).unwrap();
        assert_eq!(nw, Geometry::rectangle(BoundingBox::new(15.0, 5.0, 95.0, 55.0)));
    }

    #[test]
    fn test_resize_past_opposite_corner_flips() {
        let rect = Geometry::rectangle(BoundingBox::new(10.0, 10.0, 100.0, 50.0));
        // Drag se past nw: box flips, origin is the new min corner
        let flipped = rect.resized(Corner::Se, -150.0, -70.0).unwrap();
        assert_eq!(
            flipped,
            Geometry::rectangle(BoundingBox::new(-40.0, -10.0, 50.0, 20.0))
        );
    }

    #[test]
    fn test_line_endpoint_moved() {
        let line = Geometry::Line {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        };
        let moved = line.with_endpoint_moved(1, 0.0, 50.0).unwrap();
        assert_eq!(
            moved,
            Geometry::Line {
                points: vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)]
            }
        );
        assert!(line.with_endpoint_moved(2, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_translated_keeps_kind() {
        let text = Geometry::Text {
            position: Point::new(1.0, 2.0),
            text: Some("a".into()),
        };
        assert_eq!(
            text.translated(3.0, 4.0),
            Geometry::Text {
                position: Point::new(4.0, 6.0),
                text: Some("a".into())
            }
        );
    }

    #[test]
    fn test_svg_path_data() {
        let data = svg_path_data(&[Point::new(1.0, 2.0), Point::new(3.5, 4.0)]);
        assert_eq!(data, "M 1 2 L 3.5 4");
        assert_eq!(svg_path_data(&[]), "");
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in AnnotationKind::all() {
            assert_eq!(AnnotationKind::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(AnnotationKind::parse("ellipse"), None);
    }
}
