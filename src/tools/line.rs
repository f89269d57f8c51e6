//! Line tool: press records the start, release commits a two-point line.

use crate::model::{Geometry, Point};
use crate::tools::ToolResponse;

/// State of the line tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LineTool {
    #[default]
    Idle,
    Dragging { start: Point, current: Point },
}

impl LineTool {
    pub fn pointer_down(&mut self, point: Point) -> ToolResponse {
        *self = LineTool::Dragging {
            start: point,
            current: point,
        };
        ToolResponse::Preview
    }

    pub fn pointer_move(&mut self, point: Point) -> ToolResponse {
        match self {
            LineTool::Dragging { current, .. } => {
                *current = point;
                ToolResponse::Preview
            }
            LineTool::Idle => ToolResponse::Ignored,
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> ToolResponse {
        let LineTool::Dragging { start, .. } = std::mem::take(self) else {
            return ToolResponse::Ignored;
        };
        if start == point {
            log::debug!("Line: discarded zero-length segment");
            return ToolResponse::Discarded;
        }
        log::info!(
            "Line: COMMIT ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            start.x,
            start.y,
            point.x,
            point.y
        );
        ToolResponse::Commit(Geometry::Line {
            points: vec![start, point],
        })
    }

    /// Segment from the press position to the pointer.
    pub fn preview(&self) -> Option<Geometry> {
        match self {
            LineTool::Dragging { start, current } => Some(Geometry::Line {
                points: vec![*start, *current],
            }),
            LineTool::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, LineTool::Idle)
    }

    pub fn clear(&mut self) {
        *self = LineTool::Idle;
    }
}
