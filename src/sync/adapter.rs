//! Applies sync intents against a backend and reconciles the answers.
//!
//! A round trip is split in three so the editor is never borrowed across an
//! await:
//!
//! 1. [`SyncAdapter::request`] validates and serializes (sync, reads the editor)
//! 2. [`SyncAdapter::send`] talks to the backend (async, touches only the backend)
//! 3. [`SyncAdapter::complete`] applies the answer (sync, writes the editor)
//!
//! Completions are matched by [`AnnotationKey`], so a late answer finds its
//! annotation even after the id swap, and does nothing harmful when the
//! annotation is gone.

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;

use serde_json::Value;

use crate::editor::Editor;
use crate::model::{AnnotationId, AnnotationKey};
use crate::sync::SyncIntent;
use crate::sync::backend::{AnnotationBackend, BroadcastRoom, LabelProvider};
use crate::sync::error::{SyncError, ValidationError, WireError};
use crate::sync::wire::{self, WireAnnotation};

/// A backend call ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Create {
        key: AnnotationKey,
        image_id: String,
        record: WireAnnotation,
    },
    Update {
        key: AnnotationKey,
        id: String,
        record: WireAnnotation,
    },
    Delete {
        id: String,
    },
}

/// The answer to a [`Request`].
#[derive(Debug)]
pub enum Completion {
    Created {
        key: AnnotationKey,
        image_id: String,
        result: Result<Value, SyncError>,
    },
    Updated {
        key: AnnotationKey,
        result: Result<Value, SyncError>,
    },
    Deleted {
        id: String,
        result: Result<(), SyncError>,
    },
}

/// Persistence and peer reconciliation for one editor.
pub struct SyncAdapter<B, R> {
    backend: B,
    room: R,
    /// Creates in flight, with the image they belong to.
    creating: HashMap<AnnotationKey, String>,
    /// Keys edited while their create was in flight.
    pending_updates: HashSet<AnnotationKey>,
    /// Room length at the last reload.
    seen_len: usize,
}

impl<B: AnnotationBackend + Clone, R: BroadcastRoom> SyncAdapter<B, R> {
    pub fn new(backend: B, room: R) -> Self {
        let seen_len = room.len();
        Self {
            backend,
            room,
            creating: HashMap::new(),
            pending_updates: HashSet::new(),
            seen_len,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn room(&self) -> &R {
        &self.room
    }

    /// Whether a create for `key` is waiting for its answer.
    pub fn is_creating(&self, key: AnnotationKey) -> bool {
        self.creating.contains_key(&key)
    }

    // ------------------------------------------------------------------------
    // Phase 1: request
    // ------------------------------------------------------------------------

    /// Turn an intent into a backend call.
    ///
    /// Returns `Ok(None)` when there is nothing to send: the annotation is
    /// gone, it was never persisted, or its create is still in flight (the
    /// edit is sent once the create answers). A create that fails
    /// validation is rolled back out of the editor.
    pub fn request(
        &mut self,
        editor: &mut Editor,
        intent: SyncIntent,
    ) -> Result<Option<Request>, ValidationError> {
        match intent {
            SyncIntent::Create(key) => self.request_create(editor, key),
            SyncIntent::Update(key) => {
                if self.creating.contains_key(&key) {
                    log::debug!("Sync: update of {} waits for its create", key);
                    self.pending_updates.insert(key);
                    return Ok(None);
                }
                let Some(ann) = editor.store().get(key) else {
                    return Ok(None);
                };
                if ann.id.is_temporary() {
                    return self.request_create(editor, key);
                }
                let image_id = active_image_id(editor)?;
                let record = wire::to_wire(ann, &image_id)?;
                Ok(Some(Request::Update {
                    key,
                    id: ann.id.as_str().to_string(),
                    record,
                }))
            }
            SyncIntent::Delete(AnnotationId::Canonical(id)) => Ok(Some(Request::Delete { id })),
            SyncIntent::Delete(AnnotationId::Temporary(id)) => {
                log::debug!("Sync: {} was never stored, nothing to delete", id);
                Ok(None)
            }
        }
    }

    fn request_create(
        &mut self,
        editor: &mut Editor,
        key: AnnotationKey,
    ) -> Result<Option<Request>, ValidationError> {
        if self.creating.contains_key(&key) {
            self.pending_updates.insert(key);
            return Ok(None);
        }
        let Some(ann) = editor.store().get(key) else {
            return Ok(None);
        };
        let validated = active_image_id(editor)
            .and_then(|image_id| wire::to_wire(ann, &image_id).map(|record| (image_id, record)));
        match validated {
            Ok((image_id, mut record)) => {
                // A revived annotation still carries the id of its deleted record
                record.id = None;
                self.creating.insert(key, image_id.clone());
                Ok(Some(Request::Create {
                    key,
                    image_id,
                    record,
                }))
            }
            Err(e) => {
                log::warn!("Sync: create of {} rejected: {}", key, e);
                editor.discard_annotation(key);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Phase 2: send
    // ------------------------------------------------------------------------

    /// Perform the backend call.
    ///
    /// The future owns a handle to the backend, not the adapter, so any
    /// number of calls can be in flight while new requests are issued and
    /// earlier ones completed.
    pub fn send(&self, request: Request) -> impl Future<Output = Completion> + use<B, R> {
        let backend = self.backend.clone();
        async move {
            match request {
                Request::Create {
                    key,
                    image_id,
                    record,
                } => Completion::Created {
                    key,
                    image_id,
                    result: backend.create(record).await,
                },
                Request::Update { key, id, record } => Completion::Updated {
                    key,
                    result: backend.update(&id, record).await,
                },
                Request::Delete { id } => {
                    let result = backend.delete(&id).await;
                    Completion::Deleted { id, result }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Phase 3: complete
    // ------------------------------------------------------------------------

    /// Apply a backend answer to the editor.
    ///
    /// Returns follow-up requests: the update coalesced behind a create, or
    /// the delete of a record whose annotation was removed locally while its
    /// create was in flight. Errors are returned after the editor has been
    /// made consistent (a failed create is rolled back; failed updates and
    /// deletes leave the local state as it is).
    pub fn complete(
        &mut self,
        editor: &mut Editor,
        completion: Completion,
    ) -> Result<Vec<Request>, SyncError> {
        match completion {
            Completion::Created {
                key,
                image_id,
                result,
            } => self.complete_create(editor, key, &image_id, result),
            Completion::Updated { key, result } => match result {
                Ok(_) => {
                    log::info!("Sync: {} updated", key);
                    Ok(Vec::new())
                }
                Err(e) => {
                    log::warn!("Sync: update of {} failed, keeping local edit: {}", key, e);
                    Err(e)
                }
            },
            Completion::Deleted { id, result } => match result {
                Ok(()) => {
                    log::info!("Sync: {} deleted", id);
                    Ok(Vec::new())
                }
                Err(e) => {
                    log::warn!("Sync: delete of {} failed: {}", id, e);
                    Err(e)
                }
            },
        }
    }

    fn complete_create(
        &mut self,
        editor: &mut Editor,
        key: AnnotationKey,
        image_id: &str,
        result: Result<Value, SyncError>,
    ) -> Result<Vec<Request>, SyncError> {
        self.creating.remove(&key);
        let coalesced = self.pending_updates.remove(&key);
        let same_image = editor.image().is_some_and(|image| image.id == image_id);

        let echo = result.and_then(|value| {
            let record: WireAnnotation =
                serde_json::from_value(value).map_err(|e| SyncError::Malformed(e.into()))?;
            let raw = record
                .id
                .ok_or_else(|| SyncError::Malformed(WireError::missing_field("id")))?;
            if !AnnotationId::is_canonical_form(&raw) {
                return Err(SyncError::Malformed(WireError::InvalidId(raw)));
            }
            Ok((AnnotationId::Canonical(raw), record.label_name))
        });

        let (canonical, label_name) = match echo {
            Ok(echo) => echo,
            Err(e) => {
                log::warn!("Sync: create of {} failed, rolling back: {}", key, e);
                if same_image {
                    editor.discard_annotation(key);
                }
                return Err(e);
            }
        };

        if !same_image {
            log::debug!(
                "Sync: {} stored for image {} after switching away",
                canonical,
                image_id
            );
            return Ok(Vec::new());
        }

        if !editor.store().contains(key) {
            log::info!(
                "Sync: {} was deleted while being created, removing {}",
                key,
                canonical
            );
            return Ok(vec![Request::Delete {
                id: canonical.as_str().to_string(),
            }]);
        }

        editor.reconcile_created(key, canonical.clone(), label_name);
        self.room.announce(canonical.as_str());
        log::info!("Sync: {} created as {}", key, canonical);

        let mut follow_ups = Vec::new();
        if coalesced {
            if let Some(request) = self.request(editor, SyncIntent::Update(key))? {
                follow_ups.push(request);
            }
        }
        Ok(follow_ups)
    }

    // ------------------------------------------------------------------------
    // Convenience drivers
    // ------------------------------------------------------------------------

    /// Run an intent to completion, including its follow-ups.
    ///
    /// Holds the editor for the whole round trip; hosts that keep the UI
    /// responsive use the three phases directly instead.
    pub async fn dispatch(
        &mut self,
        editor: &mut Editor,
        intent: SyncIntent,
    ) -> Result<(), SyncError> {
        let mut queue: VecDeque<Request> = self.request(editor, intent)?.into_iter().collect();
        let mut first_error = None;
        while let Some(request) = queue.pop_front() {
            let completion = self.send(request).await;
            match self.complete(editor, completion) {
                Ok(follow_ups) => queue.extend(follow_ups),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Dispatch several intents in order, returning every error.
    pub async fn dispatch_all(
        &mut self,
        editor: &mut Editor,
        intents: impl IntoIterator<Item = SyncIntent>,
    ) -> Vec<SyncError> {
        let mut errors = Vec::new();
        for intent in intents {
            if let Err(e) = self.dispatch(editor, intent).await {
                errors.push(e);
            }
        }
        errors
    }

    // ------------------------------------------------------------------------
    // Loading and peers
    // ------------------------------------------------------------------------

    /// Fetch the raw records of an image.
    pub async fn fetch(&self, image_id: &str) -> Result<Vec<Value>, SyncError> {
        self.backend.list_by_image(image_id).await
    }

    /// Merge fetched records into the editor. Malformed records are skipped.
    ///
    /// Returns the number of annotations loaded; records fetched for an image
    /// that is no longer active are dropped.
    pub fn apply_loaded(
        &mut self,
        editor: &mut Editor,
        image_id: &str,
        records: Vec<Value>,
    ) -> usize {
        if editor.image().is_none_or(|image| image.id != image_id) {
            log::debug!("Sync: dropping stale load for image {}", image_id);
            return 0;
        }

        let mut annotations = Vec::with_capacity(records.len());
        for record in records {
            match wire::parse_record(record, editor.palette(), editor.image()) {
                Ok(ann) => annotations.push(ann),
                Err(e) => log::warn!("Sync: skipping malformed record: {}", e),
            }
        }
        let count = annotations.len();
        editor.merge_remote(annotations);
        self.seen_len = self.room.len();
        log::info!("Sync: loaded {} annotations for image {}", count, image_id);
        count
    }

    /// Load every annotation of the active image.
    pub async fn load_for_image(&mut self, editor: &mut Editor) -> Result<usize, SyncError> {
        let image_id = active_image_id(editor)?;
        let records = self.fetch(&image_id).await?;
        Ok(self.apply_loaded(editor, &image_id, records))
    }

    /// Whether peers announced ids since the last load.
    pub fn needs_reload(&self) -> bool {
        self.room.len() > self.seen_len
    }

    /// Reload if the room grew. Returns whether a reload happened.
    pub async fn poll_peers(&mut self, editor: &mut Editor) -> Result<bool, SyncError> {
        if !self.needs_reload() {
            return Ok(false);
        }
        log::debug!("Sync: room grew {} -> {}, reloading", self.seen_len, self.room.len());
        self.load_for_image(editor).await?;
        Ok(true)
    }
}

impl<B: AnnotationBackend + LabelProvider + Clone, R: BroadcastRoom> SyncAdapter<B, R> {
    /// Replace the editor's labels with the project's current set.
    pub async fn refresh_labels(
        &self,
        editor: &mut Editor,
        project_id: &str,
    ) -> Result<usize, SyncError> {
        let labels = self.backend.labels(project_id).await?;
        let count = labels.len();
        editor.set_labels(labels);
        log::info!("Sync: {} labels for project {}", count, project_id);
        Ok(count)
    }
}

fn active_image_id(editor: &Editor) -> Result<String, ValidationError> {
    editor
        .image()
        .map(|image| image.id.clone())
        .ok_or(ValidationError::MissingImage)
}
