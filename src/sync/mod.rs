//! Persistence and peer synchronization.
//!
//! The editor never awaits. Every mutation it makes is announced as a
//! [`SyncIntent`]; the [`SyncAdapter`] turns intents into backend calls and
//! applies the answers back to the editor.

mod adapter;
mod backend;
mod error;
mod memory;
pub mod wire;

#[cfg(test)]
mod tests;

pub use adapter::{Completion, Request, SyncAdapter};
pub use backend::{AnnotationBackend, BroadcastRoom, LabelProvider};
pub use error::{SyncError, ValidationError, WireError};
pub use memory::{MemoryBackend, MemoryRoom};
pub use wire::{WireAnnotation, WireShape};

use crate::model::{AnnotationId, AnnotationKey};

/// A change to the collection that the backend has to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIntent {
    /// Persist a new annotation.
    Create(AnnotationKey),
    /// Persist changed content; routed to create while the id is temporary.
    Update(AnnotationKey),
    /// Remove a stored annotation.
    Delete(AnnotationId),
}
