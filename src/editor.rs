//! The annotation editor.
//!
//! [`Editor`] owns everything one canvas needs: the annotation store, the
//! undo history, the tools, the selection controller, the labels, the active
//! image and the signed-in user. Input goes in as client-space pointer and
//! key events; every call that changes the collection returns the
//! [`EditorEvent`]s the host must forward (mostly to the
//! [`SyncAdapter`](crate::sync::SyncAdapter)).
//!
//! The editor never performs I/O and never waits.

use crate::config::EditorConfig;
use crate::controller::InteractionController;
use crate::history::{History, diff_snapshots};
use crate::keybindings::{EditorAction, KeyBindings, KeyCode, Modifiers};
use crate::model::{
    Annotation, AnnotationId, AnnotationKey, AnnotationStore, Geometry, Handle, ImageInfo, Label,
    LabelPalette, Point, Style, User,
};
use crate::sync::SyncIntent;
use crate::tools::{ToolContext, ToolKind, ToolResponse, ToolSet};
use crate::viewport::Viewport;

/// Something the host has to act on after an editor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Forward to the sync adapter.
    Sync(SyncIntent),
    /// The skeleton tool asks for the next label to be selected.
    AdvanceLabel,
}

/// Interactive annotation editor for a single image at a time.
#[derive(Debug, Clone)]
pub struct Editor {
    store: AnnotationStore,
    history: History,
    controller: InteractionController,
    tools: ToolSet,
    keybindings: KeyBindings,
    palette: LabelPalette,
    current_label: Option<String>,
    user: Option<User>,
    image: Option<ImageInfo>,
    default_style: Style,
    /// Radius for picking skeleton joints, canvas units.
    skeleton_point_radius: f64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: &EditorConfig) -> Self {
        let prefs = &config.preferences;
        let viewport = Viewport::new(
            prefs.min_zoom_percent,
            prefs.max_zoom_percent,
            prefs.zoom_step,
        );
        Self {
            store: AnnotationStore::new(),
            history: History::new(prefs.max_history),
            controller: InteractionController::new(
                viewport,
                prefs.hit_tolerance,
                prefs.handle_radius,
            ),
            tools: ToolSet::new(prefs.close_radius, prefs.skeleton_auto_advance),
            keybindings: config.keybindings.to_keybindings(),
            palette: LabelPalette::default(),
            current_label: None,
            user: None,
            image: None,
            default_style: config.default_style.clone(),
            skeleton_point_radius: prefs.skeleton_point_radius,
        }
    }

    /// Apply edited preferences, keybindings and default style.
    ///
    /// Zoom limits and history depth are fixed at construction.
    pub fn apply_config(&mut self, config: &EditorConfig) {
        let prefs = &config.preferences;
        self.keybindings = config.keybindings.to_keybindings();
        self.default_style = config.default_style.clone();
        self.skeleton_point_radius = prefs.skeleton_point_radius;
        self.tools.pen_mut().set_close_radius(prefs.close_radius);
        self.tools
            .skeleton_mut()
            .set_auto_advance(prefs.skeleton_auto_advance);
        self.controller
            .set_tolerances(prefs.hit_tolerance, prefs.handle_radius);
    }

    // ========================================================================
    // Session context
    // ========================================================================

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    /// Switch to another image.
    ///
    /// Drops the collection, the history, the selection and any draft; the
    /// host then loads the new image's annotations through the adapter.
    pub fn set_image(&mut self, image: ImageInfo) {
        log::info!("Image: {} ({}x{})", image.id, image.width, image.height);
        self.store.clear();
        self.history.clear();
        self.controller.reset();
        self.tools.cancel();
        self.image = Some(image);
    }

    pub fn palette(&self) -> &LabelPalette {
        &self.palette
    }

    /// Replace the labels. The current label is kept if it still exists,
    /// otherwise the first label becomes current.
    pub fn set_labels(&mut self, labels: Vec<Label>) {
        self.palette.replace(labels);
        let still_known = self
            .current_label
            .as_deref()
            .is_some_and(|id| self.palette.get(id).is_some());
        if !still_known {
            self.current_label = self.palette.labels().first().map(|l| l.id.clone());
        }
    }

    pub fn current_label(&self) -> Option<&Label> {
        self.current_label
            .as_deref()
            .and_then(|id| self.palette.get(id))
    }

    /// Make `id` the label for new shapes. Returns `false` for unknown labels.
    pub fn set_label(&mut self, id: &str) -> bool {
        if self.palette.get(id).is_none() {
            log::warn!("Unknown label '{}'", id);
            return false;
        }
        self.current_label = Some(id.to_string());
        true
    }

    /// Move to the next label in palette order, wrapping around.
    pub fn advance_label(&mut self) -> Option<&Label> {
        let next = match self.current_label.as_deref() {
            Some(id) => self.palette.next_after(id),
            None => self.palette.labels().first(),
        }?;
        self.current_label = Some(next.id.clone());
        self.current_label()
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Annotations in render order.
    pub fn annotations(&self) -> &[Annotation] {
        self.store.as_slice()
    }

    /// Style to render an annotation with (current label color).
    pub fn style_for(&self, annotation: &Annotation) -> Style {
        self.palette.resolve_style(annotation)
    }

    /// Draft shape of the active tool.
    pub fn preview(&self) -> Option<Geometry> {
        self.tools.preview()
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.active()
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn selected_key(&self) -> Option<AnnotationKey> {
        self.controller.selected()
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.controller.selected().and_then(|key| self.store.get(key))
    }

    /// Handles of the selected shape, in canvas coordinates.
    pub fn handles(&self) -> Vec<(Handle, Point)> {
        self.controller.handles(&self.store)
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn zoom_percent(&self) -> f64 {
        self.controller.viewport().zoom_percent()
    }

    pub fn viewport(&self) -> &Viewport {
        self.controller.viewport()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    // ========================================================================
    // Tools
    // ========================================================================

    /// Switch tools; pending text is committed, other drafts are dropped.
    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<EditorEvent> {
        if tool.is_drawing_tool() {
            self.controller.cancel(&mut self.store);
            self.controller.select(None);
        }
        let response = self.tools.set_active(tool);
        self.handle_response(response)
    }

    // ========================================================================
    // Pointer input (client coordinates)
    // ========================================================================

    pub fn pointer_down(&mut self, client: Point) -> Vec<EditorEvent> {
        let point = self.controller.to_canvas(client);
        if self.tools.active() == ToolKind::Move {
            self.controller.begin(&self.store, point);
            return Vec::new();
        }
        let response = self.tools.pointer_down(point);
        self.handle_response(response)
    }

    pub fn pointer_move(&mut self, client: Point) -> Vec<EditorEvent> {
        let point = self.controller.to_canvas(client);
        if self.tools.active() == ToolKind::Move {
            self.controller.drag(&mut self.store, point);
            return Vec::new();
        }
        let response = self.tools.pointer_move(point);
        self.handle_response(response)
    }

    pub fn pointer_up(&mut self, client: Point) -> Vec<EditorEvent> {
        let point = self.controller.to_canvas(client);
        if self.tools.active() == ToolKind::Move {
            return self
                .controller
                .end(&mut self.store, &mut self.history, point)
                .map(|key| vec![EditorEvent::Sync(SyncIntent::Update(key))])
                .unwrap_or_default();
        }
        let response = self.tools.pointer_up(point);
        self.handle_response(response)
    }

    /// A click (press and release without a drag) for the discrete tools.
    pub fn click(&mut self, client: Point) -> Vec<EditorEvent> {
        let point = self.controller.to_canvas(client);
        let label = self
            .current_label
            .as_deref()
            .and_then(|id| self.palette.get(id));
        let ctx = ToolContext {
            label,
            pick_radius: self
                .controller
                .viewport()
                .screen_to_canvas_distance(self.skeleton_point_radius),
        };
        let response = self.tools.click(point, &ctx);
        self.handle_response(response)
    }

    // ========================================================================
    // Keyboard input
    // ========================================================================

    /// A key press. While text is being edited only the editing keys are
    /// handled; printable input arrives through [`Editor::text_input`].
    pub fn key_down(&mut self, key: KeyCode, modifiers: Modifiers) -> Vec<EditorEvent> {
        if self.tools.text().is_active() {
            return match key {
                KeyCode::Escape => self.cancel(),
                KeyCode::Enter => self.finish(),
                KeyCode::Backspace => {
                    self.tools.text_mut().backspace();
                    Vec::new()
                }
                _ => Vec::new(),
            };
        }

        match self.keybindings.action_for(key, modifiers) {
            Some(action) => self.perform(action),
            None => Vec::new(),
        }
    }

    /// Typed text, for the text tool's inline editor.
    pub fn text_input(&mut self, text: &str) {
        self.tools.text_mut().insert_text(text);
    }

    /// Run an editor action.
    pub fn perform(&mut self, action: EditorAction) -> Vec<EditorEvent> {
        match action {
            EditorAction::SelectTool(tool) => self.set_tool(tool),
            EditorAction::SelectLabel(index) => {
                if let Some(id) = self.palette.labels().get(index).map(|l| l.id.clone()) {
                    self.set_label(&id);
                }
                Vec::new()
            }
            EditorAction::Cancel => self.cancel(),
            EditorAction::Finish => self.finish(),
            EditorAction::DeleteSelected => self.delete_selected(),
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::ZoomIn => {
                self.zoom_in();
                Vec::new()
            }
            EditorAction::ZoomOut => {
                self.zoom_out();
                Vec::new()
            }
            EditorAction::ZoomReset => {
                self.zoom_reset();
                Vec::new()
            }
        }
    }

    /// Escape: abort a drag, else drop the draft, else clear the selection.
    pub fn cancel(&mut self) -> Vec<EditorEvent> {
        if self.controller.cancel(&mut self.store) {
            return Vec::new();
        }
        if !self.tools.cancel() {
            self.controller.select(None);
        }
        Vec::new()
    }

    /// Enter: finish the pen polygon, skeleton or text.
    pub fn finish(&mut self) -> Vec<EditorEvent> {
        let response = self.tools.finish();
        self.handle_response(response)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Remove the selected annotation.
    pub fn delete_selected(&mut self) -> Vec<EditorEvent> {
        let Some(key) = self.controller.selected() else {
            return Vec::new();
        };
        self.controller.cancel(&mut self.store);
        let Some(id) = self.store.get(key).map(|ann| ann.id.clone()) else {
            self.controller.select(None);
            return Vec::new();
        };

        let mut next = self.store.snapshot();
        next.retain(|ann| ann.key != key);
        self.history.record(&mut self.store, next);
        self.controller.select(None);
        log::info!("Deleted {} ({})", key, id);
        vec![EditorEvent::Sync(SyncIntent::Delete(id))]
    }

    pub fn undo(&mut self) -> Vec<EditorEvent> {
        self.controller.cancel(&mut self.store);
        let before = self.store.snapshot();
        if !self.history.undo(&mut self.store) {
            return Vec::new();
        }
        self.after_history_step(&before)
    }

    pub fn redo(&mut self) -> Vec<EditorEvent> {
        self.controller.cancel(&mut self.store);
        let before = self.store.snapshot();
        if !self.history.redo(&mut self.store) {
            return Vec::new();
        }
        self.after_history_step(&before)
    }

    fn after_history_step(&mut self, before: &[Annotation]) -> Vec<EditorEvent> {
        self.controller.retain_existing(&self.store);
        diff_snapshots(before, self.store.as_slice())
            .into_iter()
            .map(EditorEvent::Sync)
            .collect()
    }

    fn handle_response(&mut self, response: ToolResponse) -> Vec<EditorEvent> {
        match response {
            ToolResponse::Commit(geometry) => {
                let key = self.commit(geometry);
                vec![EditorEvent::Sync(SyncIntent::Create(key))]
            }
            ToolResponse::Appended {
                advance_label: true,
            } => vec![EditorEvent::AdvanceLabel],
            ToolResponse::Ignored
            | ToolResponse::Preview
            | ToolResponse::Discarded
            | ToolResponse::Appended { .. } => Vec::new(),
        }
    }

    /// Insert a finished shape, tagged with the current label and user.
    fn commit(&mut self, geometry: Geometry) -> AnnotationKey {
        let kind = geometry.kind();
        let label = self.current_label();
        let mut style = match label {
            Some(label) => self.default_style.clone().with_color(label.color.clone()),
            None => self.default_style.clone(),
        };
        if matches!(geometry, Geometry::Text { .. }) && style.font_size.is_none() {
            style.font_size = Some(style.font_size_or_default());
        }

        let mut annotation = Annotation::new(
            geometry,
            label.map(|l| l.id.clone()),
            self.user.as_ref().map(|u| u.id.clone()),
        )
        .with_style(style);
        annotation.label_name = label.map(|l| l.name.clone());

        self.history.checkpoint(self.store.snapshot());
        let key = self.store.insert(annotation);
        log::info!("Committed {} as {}", kind.as_str(), key);
        key
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn zoom_in(&mut self) {
        self.controller.viewport_mut().zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.controller.viewport_mut().zoom_out();
    }

    pub fn zoom_reset(&mut self) {
        self.controller.viewport_mut().reset();
    }

    /// Zoom keeping the canvas point under `cursor` (client space) fixed.
    pub fn zoom_at(&mut self, percent: f64, cursor: Point) {
        self.controller.viewport_mut().zoom_at(percent, cursor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.controller.viewport_mut().pan_by(dx, dy);
    }

    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.controller.viewport_mut().set_origin(origin);
    }

    // ========================================================================
    // Sync hooks
    // ========================================================================

    /// Remove an annotation whose create was rejected or failed, from the
    /// collection and from the history.
    pub(crate) fn discard_annotation(&mut self, key: AnnotationKey) {
        if self.store.remove(key).is_some() {
            log::debug!("Rolled back {}", key);
        }
        self.history.forget(key);
        self.controller.retain_existing(&self.store);
    }

    /// Swap in the canonical id after a successful create.
    pub(crate) fn reconcile_created(
        &mut self,
        key: AnnotationKey,
        canonical: AnnotationId,
        label_name: Option<String>,
    ) -> bool {
        self.history.reconcile_id(key, &canonical);
        self.store.reconcile_id(key, canonical, label_name)
    }

    /// Replace the collection with a fresh load, keeping pending creates.
    ///
    /// The history is rebased onto the load so undo never reverts what
    /// other participants stored.
    pub(crate) fn merge_remote(&mut self, annotations: Vec<Annotation>) {
        let before = self.store.snapshot();
        self.store.merge_remote(annotations);
        self.history.rebase(&before, self.store.as_slice());
        self.controller.retain_existing(&self.store);
    }
}
