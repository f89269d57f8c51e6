//! Screen ↔ canvas transform.
//!
//! The canvas is drawn at `origin` (client coordinates of the image's
//! top-left corner) and scaled by `pixel_scale = zoom_percent / 100`. This is
//! the only place client coordinates are converted; tools, the controller
//! and the model work purely in image-intrinsic units.

use crate::constants::zoom;
use crate::model::Point;

/// Zoom and pan state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom_percent: f64,
    /// Client position of canvas (0, 0).
    origin: Point,
    min_percent: f64,
    max_percent: f64,
    step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(zoom::MIN_PERCENT, zoom::MAX_PERCENT, zoom::STEP_FACTOR)
    }
}

impl Viewport {
    /// Create a viewport at 100% with the given zoom limits and step.
    pub fn new(min_percent: f64, max_percent: f64, step: f64) -> Self {
        Self {
            zoom_percent: zoom::DEFAULT_PERCENT.clamp(min_percent, max_percent),
            origin: Point::new(0.0, 0.0),
            min_percent,
            max_percent,
            step,
        }
    }

    pub fn zoom_percent(&self) -> f64 {
        self.zoom_percent
    }

    pub fn pixel_scale(&self) -> f64 {
        self.zoom_percent / 100.0
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Place canvas (0, 0) at a client position, e.g. after a layout change.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Client coordinates to canvas-intrinsic coordinates.
    pub fn to_canvas(&self, client: Point) -> Point {
        let scale = self.pixel_scale();
        Point::new(
            (client.x - self.origin.x) / scale,
            (client.y - self.origin.y) / scale,
        )
    }

    /// Canvas-intrinsic coordinates to client coordinates.
    pub fn to_client(&self, canvas: Point) -> Point {
        let scale = self.pixel_scale();
        Point::new(
            canvas.x * scale + self.origin.x,
            canvas.y * scale + self.origin.y,
        )
    }

    /// A screen-pixel distance in canvas units.
    pub fn screen_to_canvas_distance(&self, pixels: f64) -> f64 {
        pixels / self.pixel_scale()
    }

    /// Set the zoom, keeping canvas (0, 0) in place.
    pub fn set_zoom(&mut self, percent: f64) {
        self.zoom_percent = percent.clamp(self.min_percent, self.max_percent);
    }

    /// Zoom in by one step (clamped to the maximum).
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom_percent * self.step);
    }

    /// Zoom out by one step (clamped to the minimum).
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom_percent / self.step);
    }

    /// Zoom to `percent` keeping the canvas point under `cursor` fixed.
    ///
    /// The algorithm:
    /// 1. Find the canvas point under the cursor
    /// 2. After zooming, move the origin so that same point stays under the cursor
    pub fn zoom_at(&mut self, percent: f64, cursor: Point) {
        let anchor = self.to_canvas(cursor);
        self.set_zoom(percent);
        let scale = self.pixel_scale();
        self.origin = Point::new(cursor.x - anchor.x * scale, cursor.y - anchor.y * scale);
    }

    pub fn zoom_in_at(&mut self, cursor: Point) {
        self.zoom_at(self.zoom_percent * self.step, cursor);
    }

    pub fn zoom_out_at(&mut self, cursor: Point) {
        self.zoom_at(self.zoom_percent / self.step, cursor);
    }

    /// Pan by a client-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.origin = self.origin.offset(dx, dy);
    }

    /// Back to 100% with the canvas at the client origin.
    pub fn reset(&mut self) {
        self.zoom_percent = zoom::DEFAULT_PERCENT.clamp(self.min_percent, self.max_percent);
        self.origin = Point::new(0.0, 0.0);
    }
}
