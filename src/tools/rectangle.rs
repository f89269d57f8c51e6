//! Rectangle tool: press, drag, release.

use crate::model::{BoundingBox, Geometry, Point};
use crate::tools::ToolResponse;

/// State of the rectangle tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RectangleTool {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// Dragging - stores the starting corner and the pointer position.
    Dragging { start: Point, current: Point },
}

impl RectangleTool {
    pub fn pointer_down(&mut self, point: Point) -> ToolResponse {
        *self = RectangleTool::Dragging {
            start: point,
            current: point,
        };
        log::debug!("Rectangle: STARTED at ({:.1}, {:.1})", point.x, point.y);
        ToolResponse::Preview
    }

    pub fn pointer_move(&mut self, point: Point) -> ToolResponse {
        match self {
            RectangleTool::Dragging { current, .. } => {
                *current = point;
                ToolResponse::Preview
            }
            RectangleTool::Idle => ToolResponse::Ignored,
        }
    }

    /// Finish the drag. A release on the press position (no extent at all)
    /// is an accidental click and is discarded.
    pub fn pointer_up(&mut self, point: Point) -> ToolResponse {
        let RectangleTool::Dragging { start, .. } = std::mem::take(self) else {
            return ToolResponse::Ignored;
        };
        let bbox = BoundingBox::from_corners(start, point);
        if bbox.width == 0.0 && bbox.height == 0.0 {
            log::debug!("Rectangle: discarded empty drag");
            return ToolResponse::Discarded;
        }
        log::info!(
            "Rectangle: COMMIT ({:.1}, {:.1}) {:.1}x{:.1}",
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        );
        ToolResponse::Commit(Geometry::rectangle(bbox))
    }

    /// Normalized rectangle for the current drag.
    pub fn preview(&self) -> Option<Geometry> {
        match self {
            RectangleTool::Dragging { start, current } => {
                Some(Geometry::rectangle(BoundingBox::from_corners(*start, *current)))
            }
            RectangleTool::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, RectangleTool::Idle)
    }

    pub fn clear(&mut self) {
        *self = RectangleTool::Idle;
    }
}
