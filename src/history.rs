//! Undo/Redo history for the annotation collection.
//!
//! History is snapshot based: every undo step holds a full copy of the
//! collection as it was before the edit.

use crate::model::{Annotation, AnnotationId, AnnotationKey, AnnotationStore, Snapshot};
use crate::sync::SyncIntent;

// ============================================================================
// Undo Stack
// ============================================================================

/// Two stacks of saved states, newest last.
///
/// The editor keeps full collection snapshots here. A push drops the redo
/// side, and the oldest undo entry goes once `max_history` is exceeded.
#[derive(Debug, Clone)]
pub struct UndoStack<T: Clone> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    max_history: usize,
}

impl<T: Clone> UndoStack<T> {
    /// Stack keeping at most `max_history` undo steps (at least one).
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    /// Save the state an edit is about to replace.
    pub fn push(&mut self, state: T) {
        self.undo_stack.push(state);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Trade `current` for the newest undo state; `current` becomes redoable.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let prev = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(prev)
    }

    /// Trade `current` for the newest redo state.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Every stored state, undo side first.
    fn states_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut())
    }
}

// ============================================================================
// Annotation History
// ============================================================================

/// Undo/redo over the annotation collection of the active image.
#[derive(Debug, Clone)]
pub struct History {
    stack: UndoStack<Snapshot>,
}

impl History {
    pub fn new(max_history: usize) -> Self {
        Self {
            stack: UndoStack::new(max_history),
        }
    }

    /// Apply `new_state`, remembering the current state for undo.
    pub fn record(&mut self, store: &mut AnnotationStore, new_state: Snapshot) {
        self.stack.push(store.snapshot());
        store.restore(new_state);
        log::debug!("History: recorded ({} steps)", self.stack.undo_count());
    }

    /// Remember a pre-mutation snapshot taken before an in-place edit.
    pub fn checkpoint(&mut self, before: Snapshot) {
        self.stack.push(before);
        log::debug!("History: checkpoint ({} steps)", self.stack.undo_count());
    }

    /// Restore the previous state. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(prev) = self.stack.undo(store.snapshot()) else {
            return false;
        };
        store.restore(prev);
        log::debug!("History: undo ({} left)", self.stack.undo_count());
        true
    }

    /// Re-apply an undone state. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(next) = self.stack.redo(store.snapshot()) else {
            return false;
        };
        store.restore(next);
        log::debug!("History: redo ({} left)", self.stack.redo_count());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.stack.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.stack.redo_count()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.stack.clear();
        log::debug!("History: cleared");
    }

    /// Propagate an id swap into every stored snapshot, so undo never brings
    /// back an id the store has already replaced.
    pub fn reconcile_id(&mut self, key: AnnotationKey, canonical: &AnnotationId) {
        for snapshot in self.stack.states_mut() {
            for ann in snapshot.iter_mut().filter(|a| a.key == key && a.id != *canonical) {
                ann.id = canonical.clone();
            }
        }
    }

    /// Drop an annotation from every stored snapshot.
    ///
    /// Used when its create was rolled back: no undo or redo may bring it back.
    pub fn forget(&mut self, key: AnnotationKey) {
        for snapshot in self.stack.states_mut() {
            snapshot.retain(|ann| ann.key != key);
        }
    }

    /// Carry a reload's effect into every stored snapshot.
    ///
    /// `before` is the collection just before the reload and `after` just
    /// past it. Annotations the reload added are inserted into each snapshot,
    /// stored annotations it removed are dropped, and entries still equal to
    /// their pre-reload content take the reloaded content. Undo then only
    /// reverts local edits.
    pub fn rebase(&mut self, before: &[Annotation], after: &[Annotation]) {
        let added: Vec<&Annotation> = after
            .iter()
            .filter(|ann| !before.iter().any(|b| b.key == ann.key))
            .collect();
        let removed: Vec<AnnotationKey> = before
            .iter()
            .filter(|b| b.id.is_canonical() && !after.iter().any(|a| a.key == b.key))
            .map(|b| b.key)
            .collect();
        let changed: Vec<(&Annotation, &Annotation)> = before
            .iter()
            .filter_map(|b| {
                let a = after.iter().find(|a| a.key == b.key)?;
                (b.content_differs(a) || b.id != a.id).then_some((b, a))
            })
            .collect();
        if added.is_empty() && removed.is_empty() && changed.is_empty() {
            return;
        }

        for snapshot in self.stack.states_mut() {
            snapshot.retain(|ann| !removed.contains(&ann.key));
            for ann in snapshot.iter_mut() {
                if let Some((_, reloaded)) = changed
                    .iter()
                    .find(|(old, _)| old.key == ann.key && !old.content_differs(ann))
                {
                    *ann = (*reloaded).clone();
                }
            }
            for ann in &added {
                if !snapshot.iter().any(|s| s.key == ann.key) {
                    snapshot.push((*ann).clone());
                }
            }
        }
        log::debug!(
            "History: rebased onto reload (+{} -{} ~{})",
            added.len(),
            removed.len(),
            changed.len()
        );
    }
}

/// Sync intents that turn the `before` collection into `after`.
///
/// Matching is by key: new entries are created, vanished entries with a
/// canonical id are deleted, changed entries are updated.
pub fn diff_snapshots(before: &[Annotation], after: &[Annotation]) -> Vec<SyncIntent> {
    let mut intents = Vec::new();

    for ann in before {
        if !after.iter().any(|a| a.key == ann.key) && ann.id.is_canonical() {
            intents.push(SyncIntent::Delete(ann.id.clone()));
        }
    }

    for ann in after {
        match before.iter().find(|b| b.key == ann.key) {
            None => intents.push(SyncIntent::Create(ann.key)),
            Some(prev) if prev.content_differs(ann) => intents.push(SyncIntent::Update(ann.key)),
            Some(_) => {}
        }
    }

    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Geometry, Point};

    fn point(x: f64) -> Annotation {
        Annotation::new(
            Geometry::Point {
                position: Point::new(x, x),
                text: None,
            },
            Some("label".into()),
            Some("user".into()),
        )
    }

    #[test]
    fn test_undo_stack_basic() {
        let mut stack: UndoStack<Vec<i32>> = UndoStack::new(10);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());

        stack.push(vec![1]);
        assert!(stack.can_undo());
        assert_eq!(stack.undo(vec![1, 2]), Some(vec![1]));
        assert!(stack.can_redo());
        assert_eq!(stack.redo(vec![1]), Some(vec![1, 2]));
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack: UndoStack<i32> = UndoStack::new(10);
        stack.push(1);
        stack.undo(2);
        assert!(stack.can_redo());

        // Push new state should clear redo
        stack.push(3);
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(4), None);
    }

    #[test]
    fn test_max_history() {
        let mut stack: UndoStack<i32> = UndoStack::new(3);
        for i in 0..5 {
            stack.push(i);
        }
        assert_eq!(stack.undo_count(), 3);
        // Oldest entries are dropped first
        assert_eq!(stack.undo(99), Some(4));
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut store = AnnotationStore::new();
        let mut history = History::new(100);
        let initial = store.snapshot();

        for i in 0..5 {
            let mut next = store.clone();
            next.insert(point(i as f64));
            history.record(&mut store, next.snapshot());
        }
        let last = store.snapshot();

        for _ in 0..5 {
            assert!(history.undo(&mut store));
        }
        assert_eq!(store.snapshot(), initial);
        assert!(!history.undo(&mut store));

        for _ in 0..5 {
            assert!(history.redo(&mut store));
        }
        assert_eq!(store.snapshot(), last);
    }

    #[test]
    fn test_record_after_undo_clears_redo() {
        let mut store = AnnotationStore::new();
        let mut history = History::new(100);

        for i in 0..3 {
            let mut next = store.clone();
            next.insert(point(i as f64));
            history.record(&mut store, next.snapshot());
        }
        history.undo(&mut store);
        history.undo(&mut store);
        assert_eq!(history.redo_count(), 2);

        let mut next = store.clone();
        next.insert(point(42.0));
        history.record(&mut store, next.snapshot());

        let before = store.snapshot();
        assert!(!history.redo(&mut store));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_reconcile_id_rewrites_snapshots() {
        let mut store = AnnotationStore::new();
        let mut history = History::new(100);
        let key = store.insert(point(1.0));
        history.checkpoint(store.snapshot());
        store.set_geometry(
            key,
            Geometry::rectangle(BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
        );

        let canonical = AnnotationId::from_raw("0123456789abcdef01234567");
        store.reconcile_id(key, canonical.clone(), None);
        history.reconcile_id(key, &canonical);

        history.undo(&mut store);
        assert_eq!(store.get(key).unwrap().id, canonical);
    }

    #[test]
    fn test_forget_removes_from_every_state() {
        let mut store = AnnotationStore::new();
        let mut history = History::new(100);
        let dropped = store.insert(point(1.0));
        history.checkpoint(store.snapshot());
        let kept = store.insert(point(2.0));

        store.remove(dropped);
        history.forget(dropped);

        assert!(history.undo(&mut store));
        assert!(store.is_empty());
        assert!(history.redo(&mut store));
        assert!(store.contains(kept));
        assert!(!store.contains(dropped));
    }

    #[test]
    fn test_rebase_follows_reload() {
        let peer_id = "aaaaaaaaaaaaaaaaaaaaaaaa";
        let gone_id = "bbbbbbbbbbbbbbbbbbbbbbbb";
        let mut store = AnnotationStore::new();
        let mut history = History::new(100);
        let peer = store.insert(point(1.0).with_id(AnnotationId::from_raw(peer_id)));
        let gone = store.insert(point(2.0).with_id(AnnotationId::from_raw(gone_id)));

        // Local edit: a new shape
        let mut next = store.clone();
        let mine = next.insert(point(3.0));
        history.record(&mut store, next.snapshot());

        // Reload: the peer shape moved, one vanished, one is new
        let before = store.snapshot();
        store.merge_remote(vec![
            point(5.0).with_id(AnnotationId::from_raw(peer_id)),
            point(6.0).with_id(AnnotationId::from_raw("cccccccccccccccccccccccc")),
        ]);
        history.rebase(&before, store.as_slice());
        let fresh = store.find_by_id("cccccccccccccccccccccccc").unwrap().key;

        // Undo reverts only the local shape
        let current = store.snapshot();
        assert!(history.undo(&mut store));
        assert_eq!(diff_snapshots(&current, store.as_slice()), Vec::new());
        assert!(!store.contains(mine));
        assert!(!store.contains(gone));
        assert!(store.contains(fresh));
        assert_eq!(store.get(peer).unwrap().geometry, point(5.0).geometry);
    }

    #[test]
    fn test_diff_snapshots() {
        let mut store = AnnotationStore::new();
        let kept = store.insert(point(1.0));
        let removed = store.insert(point(2.0).with_id(AnnotationId::from_raw(
            "0123456789abcdef01234567",
        )));
        let before = store.snapshot();

        store.remove(removed);
        store.set_geometry(
            kept,
            Geometry::Point {
                position: Point::new(9.0, 9.0),
                text: None,
            },
        );
        let added = store.insert(point(3.0));
        let after = store.snapshot();

        let intents = diff_snapshots(&before, &after);
        assert_eq!(
            intents,
            vec![
                SyncIntent::Delete(AnnotationId::from_raw("0123456789abcdef01234567")),
                SyncIntent::Update(kept),
                SyncIntent::Create(added),
            ]
        );
    }
}
