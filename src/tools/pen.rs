//! Pen tool: click vertices, close on the first one.

use crate::constants::{MIN_POLYGON_VERTICES, POLYGON_CLOSE_RADIUS};
use crate::model::{Geometry, Point};
use crate::tools::ToolResponse;

/// Polygon being built vertex by vertex.
#[derive(Debug, Clone)]
pub struct PenTool {
    points: Vec<Point>,
    /// Pointer position, for the rubber-band segment in the preview.
    hover: Option<Point>,
    close_radius: f64,
}

impl Default for PenTool {
    fn default() -> Self {
        Self::new(POLYGON_CLOSE_RADIUS)
    }
}

impl PenTool {
    pub fn new(close_radius: f64) -> Self {
        Self {
            points: Vec::new(),
            hover: None,
            close_radius,
        }
    }

    pub fn set_close_radius(&mut self, radius: f64) {
        self.close_radius = radius;
    }

    /// Whether a click at `point` would close the polygon.
    pub fn can_close_at(&self, point: &Point) -> bool {
        match self.points.first() {
            Some(first) if self.points.len() >= MIN_POLYGON_VERTICES => {
                point.distance_to(first) <= self.close_radius
            }
            _ => false,
        }
    }

    pub fn click(&mut self, point: Point) -> ToolResponse {
        if self.can_close_at(&point) {
            return self.close();
        }
        self.points.push(point);
        log::debug!("Pen: vertex {} at ({:.1}, {:.1})", self.points.len(), point.x, point.y);
        ToolResponse::Preview
    }

    pub fn pointer_move(&mut self, point: Point) -> ToolResponse {
        if self.points.is_empty() {
            return ToolResponse::Ignored;
        }
        self.hover = Some(point);
        ToolResponse::Preview
    }

    /// Close explicitly. Fewer than three vertices are dropped.
    pub fn finish(&mut self) -> ToolResponse {
        if self.points.len() >= MIN_POLYGON_VERTICES {
            return self.close();
        }
        let had_points = !self.points.is_empty();
        self.clear();
        if had_points {
            ToolResponse::Discarded
        } else {
            ToolResponse::Ignored
        }
    }

    fn close(&mut self) -> ToolResponse {
        let mut points = std::mem::take(&mut self.points);
        self.hover = None;
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        log::info!("Pen: COMMIT polygon with {} vertices", points.len() - 1);
        ToolResponse::Commit(Geometry::Polygon { points })
    }

    /// Open polygon so far, plus the segment to the pointer.
    pub fn preview(&self) -> Option<Geometry> {
        if self.points.is_empty() {
            return None;
        }
        let mut points = self.points.clone();
        points.extend(self.hover);
        Some(Geometry::Polygon { points })
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_active(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.hover = None;
    }
}
