//! Freehand drawing, shared by the path and brush tools.

use crate::constants::MIN_POLYLINE_POINTS;
use crate::model::{Geometry, Point, svg_path_data};
use crate::tools::ToolResponse;

/// Which shape a freehand stroke commits as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreehandKind {
    Path,
    Brush,
}

/// Freehand stroke state: collected points plus the incrementally built
/// SVG path string the preview renders.
#[derive(Debug, Clone)]
pub struct FreehandTool {
    kind: FreehandKind,
    points: Vec<Point>,
    path_data: String,
    drawing: bool,
}

impl FreehandTool {
    pub fn new(kind: FreehandKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
            path_data: String::new(),
            drawing: false,
        }
    }

    pub fn kind(&self) -> FreehandKind {
        self.kind
    }

    pub fn pointer_down(&mut self, point: Point) -> ToolResponse {
        self.points.clear();
        self.points.push(point);
        self.path_data = svg_path_data(&self.points);
        self.drawing = true;
        ToolResponse::Preview
    }

    pub fn pointer_move(&mut self, point: Point) -> ToolResponse {
        if !self.drawing {
            return ToolResponse::Ignored;
        }
        self.push_point(point);
        ToolResponse::Preview
    }

    /// End the stroke; fewer than two points is a tap and is discarded.
    pub fn pointer_up(&mut self, point: Point) -> ToolResponse {
        if !self.drawing {
            return ToolResponse::Ignored;
        }
        self.push_point(point);
        let points = std::mem::take(&mut self.points);
        self.clear();

        if points.len() < MIN_POLYLINE_POINTS {
            log::debug!("Freehand: discarded stroke with {} point(s)", points.len());
            return ToolResponse::Discarded;
        }
        log::info!("Freehand {:?}: COMMIT {} points", self.kind, points.len());
        ToolResponse::Commit(self.geometry(points))
    }

    /// Append a sample, skipping exact repeats of the previous one.
    fn push_point(&mut self, point: Point) {
        if self.points.last() == Some(&point) {
            return;
        }
        self.path_data.push_str(&format!(" L {} {}", point.x, point.y));
        self.points.push(point);
    }

    fn geometry(&self, points: Vec<Point>) -> Geometry {
        match self.kind {
            FreehandKind::Path => Geometry::Path { points },
            FreehandKind::Brush => Geometry::Brush { points },
        }
    }

    /// SVG path data for the stroke so far.
    pub fn path_data(&self) -> &str {
        &self.path_data
    }

    pub fn preview(&self) -> Option<Geometry> {
        if !self.drawing {
            return None;
        }
        Some(self.geometry(self.points.clone()))
    }

    pub fn is_active(&self) -> bool {
        self.drawing
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.path_data.clear();
        self.drawing = false;
    }
}
