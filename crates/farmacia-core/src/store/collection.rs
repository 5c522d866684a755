// ── Ordered reactive collection ──
//
// Insertion-ordered storage keyed by `EntityId`, with a `watch` snapshot
// rebuilt on every mutation.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// Records of one type, in the order they were first inserted.
///
/// Replacing an existing key keeps its position; removal preserves the
/// order of the rest.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    entries: RwLock<IndexMap<EntityId, Arc<T>>>,

    /// Full snapshot, rebuilt on mutation for subscribers.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entries: RwLock::new(IndexMap::new()),
            snapshot,
        }
    }

    /// Insert or replace, returning the stored entity.
    pub(crate) fn upsert(&self, id: EntityId, entity: T) -> Arc<T> {
        let entity = Arc::new(entity);
        self.mutate(|entries| {
            entries.insert(id, Arc::clone(&entity));
        });
        entity
    }

    /// Remove by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let mut removed = None;
        self.mutate(|entries| removed = entries.shift_remove(id));
        removed
    }

    /// Drop everything and load `items` in order.
    pub(crate) fn replace_all(&self, items: impl IntoIterator<Item = (EntityId, T)>) {
        let fresh: IndexMap<EntityId, Arc<T>> = items
            .into_iter()
            .map(|(id, entity)| (id, Arc::new(entity)))
            .collect();
        self.mutate(|entries| *entries = fresh);
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.read().get(id).cloned()
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn read(&self) -> std::sync::RwLockReadGuard<'_, IndexMap<EntityId, Arc<T>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, f: impl FnOnce(&mut IndexMap<EntityId, Arc<T>>)) {
        let values: Vec<Arc<T>> = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut entries);
            entries.values().cloned().collect()
        };
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
