//! Storage wire format.
//!
//! Records carry the shape as `{type, coordinates, isNormalised}` where the
//! layout of `coordinates` depends on the type:
//!
//! | type                            | coordinates                      |
//! |---------------------------------|----------------------------------|
//! | rectangle                       | `{x, y, width, height}`          |
//! | polygon, line, path, brush      | `[[x, y], ...]`                  |
//! | text, point                     | `{x, y, text?}`                  |
//! | skeleton                        | `{points: [...], edges: [...]}`  |
//!
//! Serialization always writes image-intrinsic coordinates. Records flagged
//! `isNormalised` are scaled by the image dimensions when loaded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::{MIN_POLYGON_VERTICES, MIN_POLYLINE_POINTS};
use crate::model::{
    Annotation, AnnotationId, AnnotationKind, BoundingBox, Geometry, ImageInfo, LabelPalette,
    Point, SkeletonEdge, SkeletonPoint, Style,
};
use crate::sync::error::{ValidationError, WireError};

/// One stored annotation, as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAnnotation {
    /// Canonical id; absent on create.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_id: String,
    #[serde(default)]
    pub label_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub shape: WireShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

/// Shape part of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShape {
    /// Shape type name; kept as a string so unknown types can be reported.
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Value,
    #[serde(default)]
    pub is_normalised: bool,
}

#[derive(Debug, Deserialize)]
struct RectCoords {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct PositionCoords {
    x: f64,
    y: f64,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSkeletonPoint {
    x: f64,
    y: f64,
    label_id: String,
    #[serde(default)]
    label_name: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSkeletonEdge {
    from: usize,
    to: usize,
    label_id: String,
    #[serde(default)]
    label_name: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SkeletonCoords {
    points: Vec<WireSkeletonPoint>,
    #[serde(default)]
    edges: Vec<WireSkeletonEdge>,
}

// ============================================================================
// Encoding
// ============================================================================

/// Serialize an annotation for `image_id`.
///
/// Fails before anything is sent when the annotation has no label or no
/// author. The id is only included once it is canonical.
pub fn to_wire(
    annotation: &Annotation,
    image_id: &str,
) -> Result<WireAnnotation, ValidationError> {
    let label_id = annotation
        .label_id
        .clone()
        .ok_or(ValidationError::MissingLabel)?;
    let created_by = annotation
        .created_by()
        .map(str::to_string)
        .ok_or(ValidationError::MissingUser)?;

    Ok(WireAnnotation {
        id: annotation
            .id
            .is_canonical()
            .then(|| annotation.id.as_str().to_string()),
        image_id: image_id.to_string(),
        label_id: Some(label_id),
        label_name: annotation.label_name.clone(),
        label_color: Some(annotation.style.color.clone()),
        created_by: Some(created_by),
        shape: encode_shape(&annotation.geometry),
        style: Some(annotation.style.clone()),
    })
}

/// Wire shape for a geometry (always intrinsic coordinates).
pub fn encode_shape(geometry: &Geometry) -> WireShape {
    let pairs = |points: &[Point]| -> Value {
        Value::Array(points.iter().map(|p| json!([p.x, p.y])).collect())
    };
    let coordinates = match geometry {
        Geometry::Rectangle {
            position,
            width,
            height,
        } => json!({
            "x": position.x,
            "y": position.y,
            "width": width,
            "height": height,
        }),
        Geometry::Polygon { points }
        | Geometry::Line { points }
        | Geometry::Path { points }
        | Geometry::Brush { points } => pairs(points),
        Geometry::Text { position, text } | Geometry::Point { position, text } => match text {
            Some(text) => json!({ "x": position.x, "y": position.y, "text": text }),
            None => json!({ "x": position.x, "y": position.y }),
        },
        Geometry::Skeleton { points, edges } => json!({
            "points": points
                .iter()
                .map(|p| json!({
                    "x": p.x,
                    "y": p.y,
                    "labelId": p.label_id,
                    "labelName": p.label_name,
                    "color": p.color,
                }))
                .collect::<Vec<_>>(),
            "edges": edges
                .iter()
                .map(|e| json!({
                    "from": e.from,
                    "to": e.to,
                    "labelId": e.label_id,
                    "labelName": e.label_name,
                    "color": e.color,
                }))
                .collect::<Vec<_>>(),
        }),
    };

    WireShape {
        kind: geometry.kind().as_str().to_string(),
        coordinates,
        is_normalised: false,
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Parse a raw backend record.
pub fn parse_record(
    value: Value,
    palette: &LabelPalette,
    image: Option<&ImageInfo>,
) -> Result<Annotation, WireError> {
    let record: WireAnnotation = serde_json::from_value(value)?;
    from_wire(record, palette, image)
}

/// Turn a stored record into an annotation.
///
/// Skeleton joint and edge label names and colors come from `palette` when
/// the label is known there; the stored values are only a fallback.
pub fn from_wire(
    record: WireAnnotation,
    palette: &LabelPalette,
    image: Option<&ImageInfo>,
) -> Result<Annotation, WireError> {
    let id = record.id.ok_or_else(|| WireError::missing_field("id"))?;
    let mut geometry = decode_shape(&record.shape, palette)?;

    if record.shape.is_normalised {
        let image = image.ok_or_else(|| {
            WireError::invalid_coordinates(
                geometry.kind(),
                "normalised coordinates without image dimensions",
            )
        })?;
        geometry = scale_geometry(&geometry, image.width as f64, image.height as f64);
    }

    let label_color = record
        .label_id
        .as_deref()
        .and_then(|id| palette.get(id))
        .map(|label| label.color.clone())
        .or(record.label_color);
    let style = match record.style {
        Some(style) => style,
        None => match label_color {
            Some(color) => Style::default().with_color(color),
            None => Style::default(),
        },
    };

    let mut annotation = Annotation::new(geometry, record.label_id, record.created_by)
        .with_id(AnnotationId::from_raw(id))
        .with_style(style);
    annotation.label_name = record.label_name;
    Ok(annotation)
}

/// Decode the `coordinates` of a wire shape.
pub fn decode_shape(shape: &WireShape, palette: &LabelPalette) -> Result<Geometry, WireError> {
    let kind = AnnotationKind::parse(&shape.kind)
        .ok_or_else(|| WireError::UnknownShape(shape.kind.clone()))?;
    let coords = &shape.coordinates;

    let geometry = match kind {
        AnnotationKind::Rectangle => {
            let c: RectCoords = typed(kind, coords)?;
            let origin = Point::new(c.x, c.y);
            Geometry::rectangle(BoundingBox::from_corners(
                origin,
                origin.offset(c.width, c.height),
            ))
        }
        AnnotationKind::Polygon => Geometry::Polygon {
            points: point_list(kind, coords, MIN_POLYGON_VERTICES)?,
        },
        AnnotationKind::Line => Geometry::Line {
            points: point_list(kind, coords, MIN_POLYLINE_POINTS)?,
        },
        AnnotationKind::Path => Geometry::Path {
            points: point_list(kind, coords, MIN_POLYLINE_POINTS)?,
        },
        AnnotationKind::Brush => Geometry::Brush {
            points: point_list(kind, coords, MIN_POLYLINE_POINTS)?,
        },
        AnnotationKind::Text => {
            let c: PositionCoords = typed(kind, coords)?;
            Geometry::Text {
                position: Point::new(c.x, c.y),
                text: c.text,
            }
        }
        AnnotationKind::Point => {
            let c: PositionCoords = typed(kind, coords)?;
            Geometry::Point {
                position: Point::new(c.x, c.y),
                text: c.text,
            }
        }
        AnnotationKind::Skeleton => decode_skeleton(typed(kind, coords)?, palette)?,
    };
    Ok(geometry)
}

fn typed<T: DeserializeOwned>(kind: AnnotationKind, coords: &Value) -> Result<T, WireError> {
    T::deserialize(coords).map_err(|e| WireError::invalid_coordinates(kind, e.to_string()))
}

fn point_list(kind: AnnotationKind, coords: &Value, min: usize) -> Result<Vec<Point>, WireError> {
    let pairs: Vec<[f64; 2]> = typed(kind, coords)?;
    if pairs.len() < min {
        return Err(WireError::invalid_coordinates(
            kind,
            format!("expected at least {} points, got {}", min, pairs.len()),
        ));
    }
    Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
}

fn decode_skeleton(coords: SkeletonCoords, palette: &LabelPalette) -> Result<Geometry, WireError> {
    let count = coords.points.len();
    let label_fields = |label_id: &str, name: Option<String>, color: Option<String>| {
        match palette.get(label_id) {
            Some(label) => (label.name.clone(), label.color.clone()),
            None => (name.unwrap_or_default(), color.unwrap_or_default()),
        }
    };

    let points = coords
        .points
        .into_iter()
        .map(|p| {
            let (label_name, color) = label_fields(&p.label_id, p.label_name, p.color);
            SkeletonPoint {
                x: p.x,
                y: p.y,
                label_id: p.label_id,
                label_name,
                color,
            }
        })
        .collect();

    let mut edges = Vec::with_capacity(coords.edges.len());
    for e in coords.edges {
        if e.from >= count || e.to >= count {
            return Err(WireError::invalid_coordinates(
                AnnotationKind::Skeleton,
                format!("edge {}->{} out of range ({} points)", e.from, e.to, count),
            ));
        }
        let (label_name, color) = label_fields(&e.label_id, e.label_name, e.color);
        edges.push(SkeletonEdge {
            from: e.from,
            to: e.to,
            label_id: e.label_id,
            label_name,
            color,
        });
    }

    Ok(Geometry::Skeleton { points, edges })
}

/// Scale `[0, 1]` coordinates up to image pixels.
fn scale_geometry(geometry: &Geometry, sx: f64, sy: f64) -> Geometry {
    let scale = |p: &Point| Point::new(p.x * sx, p.y * sy);
    let scale_all = |points: &[Point]| points.iter().map(scale).collect();
    match geometry {
        Geometry::Rectangle {
            position,
            width,
            height,
        } => Geometry::Rectangle {
            position: scale(position),
            width: width * sx,
            height: height * sy,
        },
        Geometry::Polygon { points } => Geometry::Polygon {
            points: scale_all(points),
        },
        Geometry::Line { points } => Geometry::Line {
            points: scale_all(points),
        },
        Geometry::Path { points } => Geometry::Path {
            points: scale_all(points),
        },
        Geometry::Brush { points } => Geometry::Brush {
            points: scale_all(points),
        },
        Geometry::Text { position, text } => Geometry::Text {
            position: scale(position),
            text: text.clone(),
        },
        Geometry::Point { position, text } => Geometry::Point {
            position: scale(position),
            text: text.clone(),
        },
        Geometry::Skeleton { points, edges } => Geometry::Skeleton {
            points: points
                .iter()
                .map(|p| SkeletonPoint {
                    x: p.x * sx,
                    y: p.y * sy,
                    ..p.clone()
                })
                .collect(),
            edges: edges.clone(),
        },
    }
}
