//! In-process backend and room.
//!
//! Both are cheap handles over shared state: clones see the same records,
//! which is how tests and the replay tool simulate several participants.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::model::Label;
use crate::sync::backend::{AnnotationBackend, BroadcastRoom, LabelProvider};
use crate::sync::error::SyncError;
use crate::sync::wire::WireAnnotation;

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Value>,
    labels: Vec<Label>,
    next_id: u64,
    /// Number of upcoming calls that fail with a network error.
    failures: usize,
}

/// Annotation store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose label table fills in `labelName` on create.
    pub fn with_labels(labels: Vec<Label>) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().labels = labels;
        backend
    }

    /// Make the next `count` calls fail with a network error.
    pub fn fail_next(&self, count: usize) {
        self.state.borrow_mut().failures = count;
    }

    /// Store a raw record as is, bypassing validation.
    pub fn insert_raw(&self, record: Value) {
        self.state.borrow_mut().records.push(record);
    }

    /// All stored records.
    pub fn records(&self) -> Vec<Value> {
        self.state.borrow().records.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().records.is_empty()
    }

    fn take_failure(&self) -> Result<(), SyncError> {
        let mut state = self.state.borrow_mut();
        if state.failures > 0 {
            state.failures -= 1;
            return Err(SyncError::network("connection refused"));
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.state
            .borrow()
            .records
            .iter()
            .position(|r| record_id(r) == Some(id))
    }

    fn encode(record: &WireAnnotation) -> Result<Value, SyncError> {
        serde_json::to_value(record).map_err(|e| SyncError::Malformed(e.into()))
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

impl AnnotationBackend for MemoryBackend {
    async fn create(&self, mut record: WireAnnotation) -> Result<Value, SyncError> {
        self.take_failure()?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        record.id = Some(format!("{:024x}", state.next_id));
        if let Some(label) = record
            .label_id
            .as_deref()
            .and_then(|id| state.labels.iter().find(|l| l.id == id))
        {
            record.label_name = Some(label.name.clone());
        }
        let value = Self::encode(&record)?;
        state.records.push(value.clone());
        Ok(value)
    }

    async fn update(&self, id: &str, mut record: WireAnnotation) -> Result<Value, SyncError> {
        self.take_failure()?;
        let index = self
            .position(id)
            .ok_or_else(|| SyncError::server(404, format!("annotation {} not found", id)))?;
        record.id = Some(id.to_string());
        let value = Self::encode(&record)?;
        self.state.borrow_mut().records[index] = value.clone();
        Ok(value)
    }

    async fn delete(&self, id: &str) -> Result<(), SyncError> {
        self.take_failure()?;
        let index = self
            .position(id)
            .ok_or_else(|| SyncError::server(404, format!("annotation {} not found", id)))?;
        self.state.borrow_mut().records.remove(index);
        Ok(())
    }

    async fn list_by_image(&self, image_id: &str) -> Result<Vec<Value>, SyncError> {
        self.take_failure()?;
        Ok(self
            .state
            .borrow()
            .records
            .iter()
            .filter(|r| r.get("imageId").and_then(Value::as_str) == Some(image_id))
            .cloned()
            .collect())
    }
}

impl LabelProvider for MemoryBackend {
    async fn labels(&self, _project_id: &str) -> Result<Vec<Label>, SyncError> {
        Ok(self.state.borrow().labels.clone())
    }
}

/// Broadcast room kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoom {
    ids: Rc<RefCell<Vec<String>>>,
}

impl MemoryRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announced ids, oldest first.
    pub fn ids(&self) -> Vec<String> {
        self.ids.borrow().clone()
    }
}

impl BroadcastRoom for MemoryRoom {
    fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    fn announce(&self, id: &str) {
        self.ids.borrow_mut().push(id.to_string());
    }
}
