//! Selection and transform of existing annotations.
//!
//! Active while the move tool is selected. Pressing on a handle of the
//! selected shape starts a resize or endpoint drag, pressing on any shape
//! selects it and starts a move, pressing on empty canvas clears the
//! selection. During a drag the shape is always recomputed from the
//! geometry it had at press time plus the total pointer delta, so rounding
//! never accumulates.

use crate::history::History;
use crate::model::{AnnotationKey, AnnotationStore, Corner, Geometry, Handle, Point, Snapshot};
use crate::viewport::Viewport;

/// The drag in progress, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle,
    Move {
        key: AnnotationKey,
        start: Point,
        original: Geometry,
    },
    ResizeRect {
        key: AnnotationKey,
        corner: Corner,
        start: Point,
        original: Geometry,
    },
    LineEndpointDrag {
        key: AnnotationKey,
        index: usize,
        start: Point,
        original: Geometry,
    },
}

impl Interaction {
    fn key(&self) -> Option<AnnotationKey> {
        match self {
            Interaction::Idle => None,
            Interaction::Move { key, .. }
            | Interaction::ResizeRect { key, .. }
            | Interaction::LineEndpointDrag { key, .. } => Some(*key),
        }
    }

    fn original(&self) -> Option<&Geometry> {
        match self {
            Interaction::Idle => None,
            Interaction::Move { original, .. }
            | Interaction::ResizeRect { original, .. }
            | Interaction::LineEndpointDrag { original, .. } => Some(original),
        }
    }

    /// Geometry for the pointer at `current`.
    fn apply(&self, current: Point) -> Option<Geometry> {
        match self {
            Interaction::Idle => None,
            Interaction::Move {
                start, original, ..
            } => {
                let (dx, dy) = current.delta_from(start);
                Some(original.translated(dx, dy))
            }
            Interaction::ResizeRect {
                corner,
                start,
                original,
                ..
            } => {
                let (dx, dy) = current.delta_from(start);
                original.resized(*corner, dx, dy)
            }
            Interaction::LineEndpointDrag {
                index,
                start,
                original,
                ..
            } => {
                let (dx, dy) = current.delta_from(start);
                original.with_endpoint_moved(*index, dx, dy)
            }
        }
    }
}

/// Selection, drag state and the viewport.
#[derive(Debug, Clone)]
pub struct InteractionController {
    viewport: Viewport,
    selected: Option<AnnotationKey>,
    interaction: Interaction,
    /// Collection as it was at press time; recorded on release if the drag
    /// changed anything.
    checkpoint: Option<Snapshot>,
    /// Shape hit tolerance, screen pixels.
    hit_tolerance: f64,
    /// Handle hit radius, screen pixels.
    handle_radius: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(
            Viewport::default(),
            crate::constants::HIT_TOLERANCE,
            crate::constants::HANDLE_HIT_RADIUS,
        )
    }
}

impl InteractionController {
    pub fn new(viewport: Viewport, hit_tolerance: f64, handle_radius: f64) -> Self {
        Self {
            viewport,
            selected: None,
            interaction: Interaction::Idle,
            checkpoint: None,
            hit_tolerance,
            handle_radius,
        }
    }

    /// Update the hit thresholds, screen pixels.
    pub fn set_tolerances(&mut self, hit_tolerance: f64, handle_radius: f64) {
        self.hit_tolerance = hit_tolerance;
        self.handle_radius = handle_radius;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Client coordinates to canvas coordinates.
    pub fn to_canvas(&self, client: Point) -> Point {
        self.viewport.to_canvas(client)
    }

    /// Shape hit tolerance at the current zoom, in canvas units.
    pub fn hit_tolerance(&self) -> f64 {
        self.viewport.screen_to_canvas_distance(self.hit_tolerance)
    }

    /// Handle hit radius at the current zoom, in canvas units.
    pub fn handle_radius(&self) -> f64 {
        self.viewport.screen_to_canvas_distance(self.handle_radius)
    }

    pub fn selected(&self) -> Option<AnnotationKey> {
        self.selected
    }

    pub fn select(&mut self, key: Option<AnnotationKey>) {
        self.selected = key;
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.interaction, Interaction::Idle)
    }

    /// Handles of the selected shape.
    pub fn handles(&self, store: &AnnotationStore) -> Vec<(Handle, Point)> {
        self.selected
            .and_then(|key| store.get(key))
            .map(|ann| ann.geometry.handles())
            .unwrap_or_default()
    }

    /// Pointer pressed at a canvas position.
    ///
    /// Handles of the current selection win over shape bodies; among
    /// overlapping shapes the topmost wins. Returns whether a drag started.
    pub fn begin(&mut self, store: &AnnotationStore, point: Point) -> bool {
        self.interaction = Interaction::Idle;
        self.checkpoint = None;

        let handle = self.selected.and_then(|key| {
            let ann = store.get(key)?;
            let handle = ann.geometry.hit_test_handle(&point, self.handle_radius())?;
            Some((key, handle, ann.geometry.clone()))
        });

        self.interaction = match handle {
            Some((key, Handle::Corner(corner), original)) => Interaction::ResizeRect {
                key,
                corner,
                start: point,
                original,
            },
            Some((key, Handle::Endpoint(index), original)) => Interaction::LineEndpointDrag {
                key,
                index,
                start: point,
                original,
            },
            None => match store.hit_test(&point, self.hit_tolerance()) {
                Some(key) => {
                    self.selected = Some(key);
                    let Some(ann) = store.get(key) else {
                        return false;
                    };
                    Interaction::Move {
                        key,
                        start: point,
                        original: ann.geometry.clone(),
                    }
                }
                None => {
                    if self.selected.take().is_some() {
                        log::debug!("Selection cleared");
                    }
                    return false;
                }
            },
        };

        log::debug!("Drag started: {:?}", self.interaction.key());
        self.checkpoint = Some(store.snapshot());
        true
    }

    /// Pointer moved to a canvas position. Returns whether a shape changed.
    pub fn drag(&mut self, store: &mut AnnotationStore, point: Point) -> bool {
        let (Some(key), Some(geometry)) = (self.interaction.key(), self.interaction.apply(point))
        else {
            return false;
        };
        store.set_geometry(key, geometry)
    }

    /// Pointer released at a canvas position.
    ///
    /// Returns the key of the changed annotation; in that case the press
    /// time collection has been recorded in `history`. A release that
    /// changed nothing leaves no history entry.
    pub fn end(
        &mut self,
        store: &mut AnnotationStore,
        history: &mut History,
        point: Point,
    ) -> Option<AnnotationKey> {
        self.drag(store, point);
        let interaction = std::mem::replace(&mut self.interaction, Interaction::Idle);
        let checkpoint = self.checkpoint.take();

        let key = interaction.key()?;
        let original = interaction.original()?;
        let current = store.get(key)?;
        if current.geometry == *original {
            return None;
        }
        if let Some(before) = checkpoint {
            history.checkpoint(before);
        }
        log::info!("Transform committed for {}", key);
        Some(key)
    }

    /// Abort the drag and put the shape back. Returns whether a drag was active.
    pub fn cancel(&mut self, store: &mut AnnotationStore) -> bool {
        let interaction = std::mem::replace(&mut self.interaction, Interaction::Idle);
        self.checkpoint = None;
        match (interaction.key(), interaction.original()) {
            (Some(key), Some(original)) => {
                store.set_geometry(key, original.clone());
                log::debug!("Drag cancelled for {}", key);
                true
            }
            _ => false,
        }
    }

    /// Drop selection and drag state that point at vanished annotations.
    pub fn retain_existing(&mut self, store: &AnnotationStore) {
        if self.selected.is_some_and(|key| !store.contains(key)) {
            self.selected = None;
        }
        if self.interaction.key().is_some_and(|key| !store.contains(key)) {
            self.interaction = Interaction::Idle;
            self.checkpoint = None;
        }
    }

    /// Forget selection and any drag.
    pub fn reset(&mut self) {
        self.selected = None;
        self.interaction = Interaction::Idle;
        self.checkpoint = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, BoundingBox};

    fn setup(geometry: Geometry) -> (AnnotationStore, History, AnnotationKey) {
        let mut store = AnnotationStore::new();
        let key = store.insert(Annotation::new(geometry, Some("l".into()), Some("u".into())));
        (store, History::new(100), key)
    }

    #[test]
    fn test_move_applies_total_delta() {
        let (mut store, mut history, key) =
            setup(Geometry::rectangle(BoundingBox::new(10.0, 10.0, 100.0, 50.0)));
        let mut controller = InteractionController::default();

        assert!(controller.begin(&store, Point::new(50.0, 30.0)));
        assert_eq!(controller.selected(), Some(key));
        controller.drag(&mut store, Point::new(55.0, 35.0));
        controller.drag(&mut store, Point::new(60.0, 40.0));
        assert_eq!(controller.end(&mut store, &mut history, Point::new(70.0, 50.0)), Some(key));

        assert_eq!(
            store.get(key).unwrap().geometry,
            Geometry::rectangle(BoundingBox::new(30.0, 30.0, 100.0, 50.0))
        );
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_resize_se_corner() {
        let (mut store, mut history, key) =
            setup(Geometry::rectangle(BoundingBox::new(10.0, 10.0, 100.0, 50.0)));
        let mut controller = InteractionController::default();
        controller.select(Some(key));

        assert!(controller.begin(&store, Point::new(110.0, 60.0)));
        assert!(matches!(
            controller.interaction(),
            Interaction::ResizeRect {
                corner: Corner::Se,
                ..
            }
        ));
        controller.end(&mut store, &mut history, Point::new(130.0, 70.0));

        assert_eq!(
            store.get(key).unwrap().geometry,
            Geometry::rectangle(BoundingBox::new(10.0, 10.0, 120.0, 60.0))
        );
    }

    #[test]
    fn test_resize_past_opposite_corner_normalizes() {
        let (mut store, mut history, key) =
            setup(Geometry::rectangle(BoundingBox::new(10.0, 10.0, 100.0, 50.0)));
        let mut controller = InteractionController::default();
        controller.select(Some(key));

        controller.begin(&store, Point::new(110.0, 60.0));
        controller.end(&mut store, &mut history, Point::new(0.0, 0.0));

        assert_eq!(
            store.get(key).unwrap().geometry,
            Geometry::rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_line_endpoint_drag() {
        let (mut store, mut history, key) = setup(Geometry::Line {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        });
        let mut controller = InteractionController::default();
        controller.select(Some(key));

        controller.begin(&store, Point::new(100.0, 0.0));
        controller.end(&mut store, &mut history, Point::new(100.0, 50.0));

        assert_eq!(
            store.get(key).unwrap().geometry,
            Geometry::Line {
                points: vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)]
            }
        );
    }

    #[test]
    fn test_click_without_motion_records_nothing() {
        let (mut store, mut history, key) =
            setup(Geometry::rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0)));
        let mut controller = InteractionController::default();

        controller.begin(&store, Point::new(5.0, 5.0));
        assert_eq!(controller.end(&mut store, &mut history, Point::new(5.0, 5.0)), None);
        assert_eq!(controller.selected(), Some(key));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_empty_canvas_clears_selection() {
        let (store, _, key) = setup(Geometry::rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0)));
        let mut controller = InteractionController::default();
        controller.select(Some(key));

        assert!(!controller.begin(&store, Point::new(500.0, 500.0)));
        assert_eq!(controller.selected(), None);
        assert!(controller.handles(&store).is_empty());
    }

    #[test]
    fn test_cancel_restores_original() {
        let original = Geometry::rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        let (mut store, _, key) = setup(original.clone());
        let mut controller = InteractionController::default();

        controller.begin(&store, Point::new(5.0, 5.0));
        controller.drag(&mut store, Point::new(50.0, 50.0));
        assert_ne!(store.get(key).unwrap().geometry, original);

        assert!(controller.cancel(&mut store));
        assert_eq!(store.get(key).unwrap().geometry, original);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        let mut controller = InteractionController::default();
        controller.viewport_mut().set_zoom(200.0);
        assert_eq!(controller.hit_tolerance(), crate::constants::HIT_TOLERANCE / 2.0);
        assert_eq!(controller.handle_radius(), crate::constants::HANDLE_HIT_RADIUS / 2.0);
    }
}
