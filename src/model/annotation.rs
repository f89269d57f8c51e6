//! Annotation identity, style and the annotation record itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CANONICAL_ID_LEN, style};
use crate::model::geometry::{AnnotationKind, Geometry, Point};

/// Process-local handle for an annotation.
///
/// Assigned by the store on insert and never changed afterwards, so the
/// renderer and late async completions can follow an annotation across the
/// temporary → canonical id swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationKey(pub(crate) u64);

impl fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an annotation: client-side temporary or server canonical.
///
/// The variant is decided by the id's shape, so the two forms can never be
/// confused: canonical ids are exactly 24 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnnotationId {
    /// Generated locally before the first successful create.
    Temporary(String),
    /// Assigned by the annotation store.
    Canonical(String),
}

impl AnnotationId {
    /// Fresh temporary id (UUID v4).
    pub fn new_temporary() -> Self {
        AnnotationId::Temporary(uuid::Uuid::new_v4().to_string())
    }

    /// Classify a raw id by its shape.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if Self::is_canonical_form(&raw) {
            AnnotationId::Canonical(raw)
        } else {
            AnnotationId::Temporary(raw)
        }
    }

    /// Whether a string has the canonical id shape.
    pub fn is_canonical_form(raw: &str) -> bool {
        raw.len() == CANONICAL_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, AnnotationId::Canonical(_))
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, AnnotationId::Temporary(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            AnnotationId::Temporary(raw) | AnnotationId::Canonical(raw) => raw,
        }
    }
}

impl From<String> for AnnotationId {
    fn from(raw: String) -> Self {
        AnnotationId::from_raw(raw)
    }
}

impl From<AnnotationId> for String {
    fn from(id: AnnotationId) -> Self {
        match id {
            AnnotationId::Temporary(raw) | AnnotationId::Canonical(raw) => raw,
        }
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering style of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub color: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: style::DEFAULT_COLOR.to_string(),
            stroke_width: style::DEFAULT_STROKE_WIDTH,
            font_size: None,
            font_family: None,
        }
    }
}

impl Style {
    /// Same style with a different color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Font size, falling back to the default.
    pub fn font_size_or_default(&self) -> f64 {
        self.font_size.unwrap_or(style::DEFAULT_FONT_SIZE)
    }
}

/// A single annotation on an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Store-assigned local handle.
    pub key: AnnotationKey,
    /// Temporary or canonical identifier.
    pub id: AnnotationId,
    /// Label this annotation belongs to. Only `None` while a draw is in progress.
    pub label_id: Option<String>,
    /// Label name as last echoed by the store.
    pub label_name: Option<String>,
    /// Author; fixed at creation.
    created_by: Option<String>,
    /// The shape.
    pub geometry: Geometry,
    /// Rendering style.
    pub style: Style,
}

impl Annotation {
    /// Create a new, not yet persisted annotation with a temporary id.
    ///
    /// The key is a placeholder until the store assigns one on insert.
    pub fn new(geometry: Geometry, label_id: Option<String>, created_by: Option<String>) -> Self {
        Self {
            key: AnnotationKey(0),
            id: AnnotationId::new_temporary(),
            label_id,
            label_name: None,
            created_by,
            geometry,
            style: Style::default(),
        }
    }

    /// Set the style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the id.
    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = id;
        self
    }

    /// Author of this annotation.
    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn kind(&self) -> AnnotationKind {
        self.geometry.kind()
    }

    /// Check whether `point` hits this annotation, honoring its font size.
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> bool {
        self.geometry
            .hit_test_with_font(point, tolerance, self.style.font_size_or_default())
    }

    /// Whether anything besides the local key and id differs.
    pub(crate) fn content_differs(&self, other: &Annotation) -> bool {
        self.geometry != other.geometry
            || self.label_id != other.label_id
            || self.style != other.style
    }
}
