//! Point tool: one click, one marker.

use crate::model::{Geometry, Point};
use crate::tools::ToolResponse;

#[derive(Debug, Clone, Copy, Default)]
pub struct PointTool;

impl PointTool {
    pub fn click(&self, point: Point) -> ToolResponse {
        log::info!("Point: COMMIT ({:.1}, {:.1})", point.x, point.y);
        ToolResponse::Commit(Geometry::Point {
            position: point,
            text: None,
        })
    }
}
