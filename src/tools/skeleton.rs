//! Skeleton tool: place labeled joints, connected as they are placed.
//!
//! Each click either picks an existing joint (it becomes the anchor for the
//! next one) or appends a new joint tagged with the current label. A new
//! joint is connected to the picked anchor, or to the joint placed just
//! before it.

use crate::model::{Geometry, Label, Point, SkeletonEdge, SkeletonPoint};
use crate::tools::{ToolContext, ToolResponse};

#[derive(Debug, Clone, Default)]
pub struct SkeletonTool {
    points: Vec<SkeletonPoint>,
    edges: Vec<SkeletonEdge>,
    /// Joint the next one attaches to, picked by clicking it.
    selected: Option<usize>,
    /// Ask the host to move to the next label after each joint.
    auto_advance: bool,
}

impl SkeletonTool {
    pub fn new(auto_advance: bool) -> Self {
        Self {
            auto_advance,
            ..Self::default()
        }
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
    }

    fn joint_at(&self, point: &Point, radius: f64) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.position().distance_to(point) <= radius)
    }

    pub fn click(&mut self, point: Point, ctx: &ToolContext<'_>) -> ToolResponse {
        if let Some(index) = self.joint_at(&point, ctx.pick_radius) {
            log::debug!("Skeleton: picked joint {}", index);
            self.selected = Some(index);
            return ToolResponse::Preview;
        }

        let Some(label) = ctx.label else {
            log::warn!("Skeleton: no label selected, joint not placed");
            return ToolResponse::Ignored;
        };

        let index = self.points.len();
        self.points.push(joint(point, label));
        let anchor = self.selected.take().or(index.checked_sub(1));
        if let Some(from) = anchor {
            self.edges.push(SkeletonEdge {
                from,
                to: index,
                label_id: label.id.clone(),
                label_name: label.name.clone(),
                color: label.color.clone(),
            });
        }
        log::debug!(
            "Skeleton: joint {} '{}' ({} edges)",
            index,
            label.name,
            self.edges.len()
        );
        ToolResponse::Appended {
            advance_label: self.auto_advance,
        }
    }

    /// Commit the skeleton built so far.
    pub fn finish(&mut self) -> ToolResponse {
        if self.points.is_empty() {
            self.clear();
            return ToolResponse::Ignored;
        }
        let points = std::mem::take(&mut self.points);
        let edges = std::mem::take(&mut self.edges);
        self.selected = None;
        log::info!(
            "Skeleton: COMMIT {} joints, {} edges",
            points.len(),
            edges.len()
        );
        ToolResponse::Commit(Geometry::Skeleton { points, edges })
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn preview(&self) -> Option<Geometry> {
        if self.points.is_empty() {
            return None;
        }
        Some(Geometry::Skeleton {
            points: self.points.clone(),
            edges: self.edges.clone(),
        })
    }

    pub fn is_active(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.edges.clear();
        self.selected = None;
    }
}

fn joint(point: Point, label: &Label) -> SkeletonPoint {
    SkeletonPoint {
        x: point.x,
        y: point.y,
        label_id: label.id.clone(),
        label_name: label.name.clone(),
        color: label.color.clone(),
    }
}
