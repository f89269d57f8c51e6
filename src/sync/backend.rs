//! Interfaces to the collaborators the sync layer talks to.

use std::future::Future;

use serde_json::Value;

use crate::model::Label;
use crate::sync::error::SyncError;
use crate::sync::wire::WireAnnotation;

/// The annotation store, REST shaped.
///
/// Calls return the raw JSON the store answered with; decoding is left to
/// the adapter so a malformed answer can be told apart from a failed call.
/// Implementations are cheap handles: the adapter clones one into every
/// call it sends.
pub trait AnnotationBackend {
    /// Persist a new annotation. The answer echoes the record with its
    /// canonical `id` and refreshed `labelName`.
    fn create(&self, record: WireAnnotation) -> impl Future<Output = Result<Value, SyncError>>;

    /// Overwrite the annotation stored under `id`.
    fn update(
        &self,
        id: &str,
        record: WireAnnotation,
    ) -> impl Future<Output = Result<Value, SyncError>>;

    /// Remove the annotation stored under `id`.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), SyncError>>;

    /// Every annotation of one image.
    fn list_by_image(&self, image_id: &str) -> impl Future<Output = Result<Vec<Value>, SyncError>>;
}

/// Source of the labels of a project.
pub trait LabelProvider {
    fn labels(&self, project_id: &str) -> impl Future<Output = Result<Vec<Label>, SyncError>>;
}

/// Shared, append-only list of annotation ids for one room.
///
/// Participants append the id of every annotation they create; any growth
/// of the list tells the others to reload.
pub trait BroadcastRoom {
    /// Number of ids announced so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an id for every participant to see.
    fn announce(&self, id: &str);
}
