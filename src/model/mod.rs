//! Data models for the annotation engine.

mod annotation;
mod geometry;
mod label;
mod store;

pub use annotation::{Annotation, AnnotationId, AnnotationKey, Style};
pub use geometry::{
    AnnotationKind, BoundingBox, Corner, Geometry, Handle, Point, SkeletonEdge, SkeletonPoint,
    svg_path_data, text_box,
};
pub use label::{ImageInfo, Label, LabelPalette, User, parse_hex_color};
pub use store::{AnnotationStore, Snapshot};
