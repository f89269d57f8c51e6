//! Text tool: click to place, type, commit on Enter or blur.

use crate::model::{Geometry, Point};
use crate::tools::ToolResponse;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextTool {
    #[default]
    Idle,
    /// An inline editor is open at `position`.
    Editing { position: Point, buffer: String },
}

impl TextTool {
    /// Open an editor at `point`. A click while editing is a blur and
    /// commits the pending text instead.
    pub fn click(&mut self, point: Point) -> ToolResponse {
        match self {
            TextTool::Idle => {
                *self = TextTool::Editing {
                    position: point,
                    buffer: String::new(),
                };
                log::debug!("Text: editor opened at ({:.1}, {:.1})", point.x, point.y);
                ToolResponse::Preview
            }
            TextTool::Editing { .. } => self.commit(),
        }
    }

    pub fn insert_text(&mut self, text: &str) -> ToolResponse {
        match self {
            TextTool::Editing { buffer, .. } => {
                buffer.push_str(text);
                ToolResponse::Preview
            }
            TextTool::Idle => ToolResponse::Ignored,
        }
    }

    pub fn backspace(&mut self) -> ToolResponse {
        match self {
            TextTool::Editing { buffer, .. } => {
                buffer.pop();
                ToolResponse::Preview
            }
            TextTool::Idle => ToolResponse::Ignored,
        }
    }

    /// Commit the trimmed text; whitespace-only text is discarded.
    pub fn commit(&mut self) -> ToolResponse {
        let TextTool::Editing { position, buffer } = std::mem::take(self) else {
            return ToolResponse::Ignored;
        };
        let text = buffer.trim();
        if text.is_empty() {
            log::debug!("Text: discarded empty text");
            return ToolResponse::Discarded;
        }
        log::info!("Text: COMMIT '{}'", text);
        ToolResponse::Commit(Geometry::Text {
            position,
            text: Some(text.to_string()),
        })
    }

    /// Close the editor without committing.
    pub fn cancel(&mut self) -> ToolResponse {
        match std::mem::take(self) {
            TextTool::Editing { .. } => ToolResponse::Discarded,
            TextTool::Idle => ToolResponse::Ignored,
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match self {
            TextTool::Editing { buffer, .. } => Some(buffer),
            TextTool::Idle => None,
        }
    }

    pub fn preview(&self) -> Option<Geometry> {
        match self {
            TextTool::Editing { position, buffer } => Some(Geometry::Text {
                position: *position,
                text: Some(buffer.clone()),
            }),
            TextTool::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TextTool::Editing { .. })
    }

    pub fn clear(&mut self) {
        *self = TextTool::Idle;
    }
}
