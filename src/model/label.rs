//! Labels, users and images supplied by the host application.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::annotation::{Annotation, Style};

/// An annotation label with a name and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Unique identifier for the label
    pub id: String,
    /// Display name of the label
    pub name: String,
    /// Hex color (`#rrggbb`)
    #[serde(alias = "colorHex")]
    pub color: String,
}

impl Label {
    /// Create a new label with the given ID, name, and color.
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Color as RGB, if it is a valid `#rrggbb` string.
    pub fn rgb(&self) -> Option<[u8; 3]> {
        parse_hex_color(&self.color)
    }
}

/// Parse a `#rrggbb` color.
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// The labels of the active project, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct LabelPalette {
    labels: Vec<Label>,
    index: HashMap<String, usize>,
}

impl LabelPalette {
    pub fn new(labels: Vec<Label>) -> Self {
        let mut palette = Self::default();
        palette.replace(labels);
        palette
    }

    /// Replace all labels, e.g. after the label provider reloads.
    pub fn replace(&mut self, labels: Vec<Label>) {
        for label in &labels {
            if label.rgb().is_none() {
                log::warn!("Label '{}' has invalid color '{}'", label.name, label.color);
            }
        }
        self.index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.id.clone(), i))
            .collect();
        self.labels = labels;
    }

    pub fn get(&self, id: &str) -> Option<&Label> {
        self.index.get(id).map(|&i| &self.labels[i])
    }

    /// Labels in provider order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label following `id` in provider order, wrapping around.
    pub fn next_after(&self, id: &str) -> Option<&Label> {
        let i = *self.index.get(id)?;
        self.labels.get((i + 1) % self.labels.len())
    }

    /// Style to render an annotation with.
    ///
    /// The color always comes from the label's current color, so a label
    /// recolor shows up immediately on every annotation using it. Falls back
    /// to the stored style when the label is unknown.
    pub fn resolve_style(&self, annotation: &Annotation) -> Style {
        match annotation.label_id.as_deref().and_then(|id| self.get(id)) {
            Some(label) => annotation.style.clone().with_color(label.color.clone()),
            None => annotation.style.clone(),
        }
    }
}

/// The authenticated user, injected by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// The image being annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(id: impl Into<String>, url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            width,
            height,
        }
    }
}
