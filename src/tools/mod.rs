//! Drawing tools.
//!
//! Each tool is a small state machine that turns canvas-space pointer
//! events into a draft [`preview`](ToolSet::preview) and, when the gesture
//! completes, a finished [`Geometry`]. Tools never touch the annotation
//! store; the editor commits what they return.

mod freehand;
mod line;
mod pen;
mod point;
mod rectangle;
mod skeleton;
mod text;

pub use freehand::{FreehandKind, FreehandTool};
pub use line::LineTool;
pub use pen::PenTool;
pub use point::PointTool;
pub use rectangle::RectangleTool;
pub use skeleton::SkeletonTool;
pub use text::TextTool;

use serde::{Deserialize, Serialize};

use crate::model::{Geometry, Label, Point};

/// The active interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Selection and transform (no drawing).
    #[default]
    Move,
    Rectangle,
    Line,
    Path,
    Brush,
    Pen,
    Text,
    Point,
    Skeleton,
}

impl ToolKind {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Move => "Move",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Line => "Line",
            ToolKind::Path => "Path",
            ToolKind::Brush => "Brush",
            ToolKind::Pen => "Pen",
            ToolKind::Text => "Text",
            ToolKind::Point => "Point",
            ToolKind::Skeleton => "Skeleton",
        }
    }

    /// Get all tools.
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Move,
            ToolKind::Rectangle,
            ToolKind::Line,
            ToolKind::Path,
            ToolKind::Brush,
            ToolKind::Pen,
            ToolKind::Text,
            ToolKind::Point,
            ToolKind::Skeleton,
        ]
    }

    /// Whether this tool draws with press/drag/release (as opposed to clicks).
    pub fn uses_drag(&self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Line | ToolKind::Path | ToolKind::Brush
        )
    }

    /// Whether this tool creates annotations.
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, ToolKind::Move)
    }
}

/// What the host knows at event time that a tool may need.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// The label new shapes will be tagged with.
    pub label: Option<&'a Label>,
    /// Radius for picking existing skeleton joints, in canvas units.
    pub pick_radius: f64,
}

/// Outcome of feeding one event to a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// The event means nothing in the tool's current state.
    Ignored,
    /// The draft changed; re-render the preview.
    Preview,
    /// The gesture finished with a shape to commit.
    Commit(Geometry),
    /// The gesture ended without a shape.
    Discarded,
    /// A skeleton joint was placed.
    Appended { advance_label: bool },
}

/// Every tool, and which one is active.
#[derive(Debug, Clone)]
pub struct ToolSet {
    active: ToolKind,
    rectangle: RectangleTool,
    line: LineTool,
    path: FreehandTool,
    brush: FreehandTool,
    pen: PenTool,
    text: TextTool,
    point: PointTool,
    skeleton: SkeletonTool,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new(crate::constants::POLYGON_CLOSE_RADIUS, false)
    }
}

impl ToolSet {
    pub fn new(close_radius: f64, skeleton_auto_advance: bool) -> Self {
        Self {
            active: ToolKind::default(),
            rectangle: RectangleTool::default(),
            line: LineTool::default(),
            path: FreehandTool::new(FreehandKind::Path),
            brush: FreehandTool::new(FreehandKind::Brush),
            pen: PenTool::new(close_radius),
            text: TextTool::default(),
            point: PointTool,
            skeleton: SkeletonTool::new(skeleton_auto_advance),
        }
    }

    pub fn active(&self) -> ToolKind {
        self.active
    }

    /// Switch tools. Pending text is committed as on blur; every other
    /// draft is dropped.
    pub fn set_active(&mut self, tool: ToolKind) -> ToolResponse {
        if tool == self.active {
            return ToolResponse::Ignored;
        }
        let response = match self.active {
            ToolKind::Text => self.text.commit(),
            _ => {
                self.cancel();
                ToolResponse::Ignored
            }
        };
        log::debug!("Tool: {} -> {}", self.active.name(), tool.name());
        self.active = tool;
        response
    }

    pub fn pointer_down(&mut self, point: Point) -> ToolResponse {
        match self.active {
            ToolKind::Rectangle => self.rectangle.pointer_down(point),
            ToolKind::Line => self.line.pointer_down(point),
            ToolKind::Path => self.path.pointer_down(point),
            ToolKind::Brush => self.brush.pointer_down(point),
            _ => ToolResponse::Ignored,
        }
    }

    pub fn pointer_move(&mut self, point: Point) -> ToolResponse {
        match self.active {
            ToolKind::Rectangle => self.rectangle.pointer_move(point),
            ToolKind::Line => self.line.pointer_move(point),
            ToolKind::Path => self.path.pointer_move(point),
            ToolKind::Brush => self.brush.pointer_move(point),
            ToolKind::Pen => self.pen.pointer_move(point),
            _ => ToolResponse::Ignored,
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> ToolResponse {
        match self.active {
            ToolKind::Rectangle => self.rectangle.pointer_up(point),
            ToolKind::Line => self.line.pointer_up(point),
            ToolKind::Path => self.path.pointer_up(point),
            ToolKind::Brush => self.brush.pointer_up(point),
            _ => ToolResponse::Ignored,
        }
    }

    pub fn click(&mut self, point: Point, ctx: &ToolContext<'_>) -> ToolResponse {
        match self.active {
            ToolKind::Pen => self.pen.click(point),
            ToolKind::Text => self.text.click(point),
            ToolKind::Point => self.point.click(point),
            ToolKind::Skeleton => self.skeleton.click(point, ctx),
            _ => ToolResponse::Ignored,
        }
    }

    /// Enter: finish the active multi-step gesture.
    pub fn finish(&mut self) -> ToolResponse {
        match self.active {
            ToolKind::Pen => self.pen.finish(),
            ToolKind::Text => self.text.commit(),
            ToolKind::Skeleton => self.skeleton.finish(),
            _ => ToolResponse::Ignored,
        }
    }

    /// Escape: drop the active tool's draft.
    pub fn cancel(&mut self) -> bool {
        let had_draft = self.is_drawing();
        match self.active {
            ToolKind::Move | ToolKind::Point => {}
            ToolKind::Rectangle => self.rectangle.clear(),
            ToolKind::Line => self.line.clear(),
            ToolKind::Path => self.path.clear(),
            ToolKind::Brush => self.brush.clear(),
            ToolKind::Pen => self.pen.clear(),
            ToolKind::Text => self.text.clear(),
            ToolKind::Skeleton => self.skeleton.clear(),
        }
        had_draft
    }

    /// Whether the active tool holds an unfinished draft.
    pub fn is_drawing(&self) -> bool {
        match self.active {
            ToolKind::Move | ToolKind::Point => false,
            ToolKind::Rectangle => self.rectangle.is_active(),
            ToolKind::Line => self.line.is_active(),
            ToolKind::Path => self.path.is_active(),
            ToolKind::Brush => self.brush.is_active(),
            ToolKind::Pen => self.pen.is_active(),
            ToolKind::Text => self.text.is_active(),
            ToolKind::Skeleton => self.skeleton.is_active(),
        }
    }

    /// Ephemeral shape for the active draft.
    pub fn preview(&self) -> Option<Geometry> {
        match self.active {
            ToolKind::Move | ToolKind::Point => None,
            ToolKind::Rectangle => self.rectangle.preview(),
            ToolKind::Line => self.line.preview(),
            ToolKind::Path => self.path.preview(),
            ToolKind::Brush => self.brush.preview(),
            ToolKind::Pen => self.pen.preview(),
            ToolKind::Text => self.text.preview(),
            ToolKind::Skeleton => self.skeleton.preview(),
        }
    }

    pub fn text(&self) -> &TextTool {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextTool {
        &mut self.text
    }

    pub fn pen_mut(&mut self) -> &mut PenTool {
        &mut self.pen
    }

    pub fn skeleton_mut(&mut self) -> &mut SkeletonTool {
        &mut self.skeleton
    }
}
