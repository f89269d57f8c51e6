//! The owned annotation collection for the active image.

use std::collections::HashMap;

use crate::model::annotation::{Annotation, AnnotationId, AnnotationKey};
use crate::model::geometry::{Geometry, Point};

/// Full copy of the collection, as kept by the history.
pub type Snapshot = Vec<Annotation>;

/// Storage for the annotations of a single image, in render order.
///
/// This is the single source of truth the tools and the controller mutate.
/// Annotations are addressed by their [`AnnotationKey`], which survives the
/// temporary → canonical id swap.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    /// All annotations; later entries render on top.
    annotations: Vec<Annotation>,
    /// Counter for generating unique keys.
    next_key: u64,
    /// Dirty flag - set when annotations change, cleared by the renderer.
    dirty: bool,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            next_key: 1,
            dirty: true,
        }
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after re-rendering.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn alloc_key(&mut self) -> AnnotationKey {
        let key = AnnotationKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Add an annotation on top and return its key.
    pub fn insert(&mut self, mut annotation: Annotation) -> AnnotationKey {
        let key = self.alloc_key();
        annotation.key = key;
        self.annotations.push(annotation);
        self.mark_dirty();
        key
    }

    /// Remove an annotation by key.
    pub fn remove(&mut self, key: AnnotationKey) -> Option<Annotation> {
        let index = self.position(key)?;
        self.mark_dirty();
        Some(self.annotations.remove(index))
    }

    fn position(&self, key: AnnotationKey) -> Option<usize> {
        self.annotations.iter().position(|a| a.key == key)
    }

    pub fn get(&self, key: AnnotationKey) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.key == key)
    }

    /// Mutable access; marks the store dirty.
    pub fn get_mut(&mut self, key: AnnotationKey) -> Option<&mut Annotation> {
        let index = self.position(key)?;
        self.mark_dirty();
        self.annotations.get_mut(index)
    }

    pub fn contains(&self, key: AnnotationKey) -> bool {
        self.position(key).is_some()
    }

    /// Find an annotation by its temporary or canonical id string.
    pub fn find_by_id(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id.as_str() == id)
    }

    /// Get all annotations in render order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Clear all annotations.
    pub fn clear(&mut self) {
        if !self.annotations.is_empty() {
            self.mark_dirty();
        }
        self.annotations.clear();
    }

    /// Replace the geometry of an annotation.
    pub fn set_geometry(&mut self, key: AnnotationKey, geometry: Geometry) -> bool {
        match self.get_mut(key) {
            Some(ann) => {
                ann.geometry = geometry;
                true
            }
            None => false,
        }
    }

    /// Swap in the canonical id assigned by a create, in place.
    ///
    /// The previous id is usually temporary; it is canonical when an undone
    /// delete brought the annotation back and it was stored again. Returns
    /// `false` (and changes nothing) when the key is gone or already carries
    /// that id.
    pub fn reconcile_id(
        &mut self,
        key: AnnotationKey,
        canonical: AnnotationId,
        label_name: Option<String>,
    ) -> bool {
        let Some(ann) = self.get_mut(key) else {
            return false;
        };
        if ann.id == canonical || !canonical.is_canonical() {
            return false;
        }
        log::debug!("Annotation {} id {} -> {}", key, ann.id, canonical);
        ann.id = canonical;
        if label_name.is_some() {
            ann.label_name = label_name;
        }
        true
    }

    /// Find the topmost annotation hit by `point`.
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> Option<AnnotationKey> {
        self.annotations
            .iter()
            .rev()
            .find(|ann| ann.hit_test(point, tolerance))
            .map(|ann| ann.key)
    }

    /// Copy of the whole collection.
    pub fn snapshot(&self) -> Snapshot {
        self.annotations.clone()
    }

    /// Replace the collection with a snapshot, keeping key allocation monotonic.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let max_key = snapshot.iter().map(|a| a.key.0).max().unwrap_or(0);
        self.next_key = self.next_key.max(max_key + 1);
        self.annotations = snapshot;
        self.mark_dirty();
    }

    /// Replace the collection with a freshly loaded remote set.
    ///
    /// Annotations whose canonical id is already present keep their local
    /// key, so the renderer sees an update rather than a new shape. Local
    /// entries that still carry a temporary id (create in flight) are kept
    /// on top of the remote set.
    pub fn merge_remote(&mut self, remote: Vec<Annotation>) {
        let existing: HashMap<String, AnnotationKey> = self
            .annotations
            .iter()
            .filter(|a| a.id.is_canonical())
            .map(|a| (a.id.as_str().to_string(), a.key))
            .collect();

        let pending: Vec<Annotation> = self
            .annotations
            .drain(..)
            .filter(|a| a.id.is_temporary())
            .collect();

        let mut merged = Vec::with_capacity(remote.len() + pending.len());
        for mut ann in remote {
            ann.key = match existing.get(ann.id.as_str()) {
                Some(key) => *key,
                None => self.alloc_key(),
            };
            merged.push(ann);
        }
        merged.extend(pending);

        self.annotations = merged;
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::BoundingBox;

    fn rect(x: f64, y: f64) -> Annotation {
        Annotation::new(
            Geometry::rectangle(BoundingBox::new(x, y, 50.0, 50.0)),
            Some("car".into()),
            Some("u1".into()),
        )
    }

    #[test]
    fn test_annotation_store() {
        let mut store = AnnotationStore::new();
        let k1 = store.insert(rect(10.0, 10.0));
        let k2 = store.insert(rect(100.0, 100.0));

        assert_eq!(store.len(), 2);
        assert_ne!(k1, k2);
        assert!(store.get(k1).is_some());

        store.remove(k1);
        assert_eq!(store.len(), 1);
        assert!(store.get(k1).is_none());
        assert!(store.remove(k1).is_none());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut store = AnnotationStore::new();
        let _below = store.insert(rect(10.0, 10.0));
        let above = store.insert(rect(30.0, 30.0));

        assert_eq!(store.hit_test(&Point::new(40.0, 40.0), 0.0), Some(above));
        assert_eq!(store.hit_test(&Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_reconcile_id_in_place() {
        let mut store = AnnotationStore::new();
        let key = store.insert(rect(10.0, 10.0));
        let canonical = AnnotationId::from_raw("0123456789abcdef01234567");

        assert!(store.reconcile_id(key, canonical.clone(), Some("Car".into())));
        let ann = store.get(key).unwrap();
        assert_eq!(ann.id, canonical);
        assert_eq!(ann.key, key);
        assert_eq!(ann.label_name.as_deref(), Some("Car"));

        // Already canonical: nothing to do
        assert!(!store.reconcile_id(key, canonical, None));
    }

    #[test]
    fn test_restore_keeps_keys_monotonic() {
        let mut store = AnnotationStore::new();
        let k1 = store.insert(rect(0.0, 0.0));
        let snapshot = store.snapshot();
        let k2 = store.insert(rect(1.0, 1.0));

        store.restore(snapshot);
        let k3 = store.insert(rect(2.0, 2.0));
        assert_ne!(k3, k1);
        assert_ne!(k3, k2);
    }

    #[test]
    fn test_merge_remote_preserves_keys_and_pending() {
        let mut store = AnnotationStore::new();
        let known = rect(0.0, 0.0).with_id(AnnotationId::from_raw("aaaaaaaaaaaaaaaaaaaaaaaa"));
        let known_key = store.insert(known);
        let pending_key = store.insert(rect(5.0, 5.0));
        let _stale = store.insert(
            rect(9.0, 9.0).with_id(AnnotationId::from_raw("cccccccccccccccccccccccc")),
        );

        let remote = vec![
            rect(1.0, 1.0).with_id(AnnotationId::from_raw("aaaaaaaaaaaaaaaaaaaaaaaa")),
            rect(2.0, 2.0).with_id(AnnotationId::from_raw("bbbbbbbbbbbbbbbbbbbbbbbb")),
        ];
        store.merge_remote(remote);

        assert_eq!(store.len(), 3);
        let updated = store.find_by_id("aaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert_eq!(updated.key, known_key);
        assert_eq!(
            updated.geometry,
            Geometry::rectangle(BoundingBox::new(1.0, 1.0, 50.0, 50.0))
        );
        assert!(store.contains(pending_key));
        assert!(store.find_by_id("cccccccccccccccccccccccc").is_none());
    }
}
