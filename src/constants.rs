//! Global constants for the annotation engine

/// Distance (canvas units) within which a pen click on the first vertex closes the polygon.
pub const POLYGON_CLOSE_RADIUS: f64 = 10.0;

/// Minimum number of vertices required for a closed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum number of points for a committed line, path or brush stroke.
pub const MIN_POLYLINE_POINTS: usize = 2;

/// Hit tolerance for shape selection (screen pixels).
pub const HIT_TOLERANCE: f64 = 5.0;

/// Hit radius for resize and endpoint handles (screen pixels).
pub const HANDLE_HIT_RADIUS: f64 = 8.0;

/// Radius for picking an existing skeleton point (canvas units).
pub const SKELETON_POINT_RADIUS: f64 = 8.0;

/// Default number of undo steps kept.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Width of a text glyph relative to the font size, for hit testing.
pub const TEXT_GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Length of a canonical (server-assigned) annotation id.
pub const CANONICAL_ID_LEN: usize = 24;

/// Zoom limits and step, in percent.
pub mod zoom {
    /// Initial zoom.
    pub const DEFAULT_PERCENT: f64 = 100.0;
    /// Minimum zoom.
    pub const MIN_PERCENT: f64 = 10.0;
    /// Maximum zoom.
    pub const MAX_PERCENT: f64 = 800.0;
    /// Multiplicative step for zoom in/out.
    pub const STEP_FACTOR: f64 = 1.2;
}

/// Style defaults applied when no label color is known yet.
pub mod style {
    /// Fallback stroke color.
    pub const DEFAULT_COLOR: &str = "#ff0000";
    /// Fallback stroke width.
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
    /// Fallback font size for text annotations.
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
}
