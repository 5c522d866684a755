// ── Master-data store ──
//
// Generic CRUD store for products, suppliers and companies. Same
// validate-then-call-then-apply order as the document store, with writes
// serialized the same way.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::collection::EntityCollection;
use super::{report, report_failure};
use crate::error::CoreError;
use crate::gateway::Gateway;
use crate::model::{EntityId, Record};
use crate::notify::Notifier;
use crate::stream::EntityStream;

pub struct RecordStore<T: Record> {
    records: EntityCollection<T>,
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
    seed: fn() -> Vec<T>,
    writes: Mutex<()>,
}

impl<T: Record> RecordStore<T> {
    /// `seed` provides the initial contents of a fixture-backed store.
    pub(crate) fn new(gateway: Gateway, notifier: Arc<dyn Notifier>, seed: fn() -> Vec<T>) -> Self {
        let records = EntityCollection::new();
        if matches!(gateway, Gateway::Fixture) {
            records.replace_all(
                seed()
                    .into_iter()
                    .filter_map(|r| r.id().cloned().map(|id| (id, r))),
            );
        }
        Self {
            records,
            gateway,
            notifier,
            seed,
            writes: Mutex::new(()),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn list(&self) -> Arc<Vec<Arc<T>>> {
        self.records.snapshot()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &EntityId) -> Result<Arc<T>, CoreError> {
        self.records
            .get(id)
            .ok_or_else(|| CoreError::not_found(T::LABEL, id))
    }

    /// Records whose display name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<Arc<T>> {
        let needle = term.to_lowercase();
        self.list()
            .iter()
            .filter(|r| r.display_name().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> EntityStream<T> {
        EntityStream::new(self.records.subscribe())
    }

    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let _writes = self.writes.lock().await;
        let records = self
            .gateway
            .load_records(self.seed)
            .await
            .inspect_err(|err| report_failure(self.notifier.as_ref(), T::LABEL, "load", err))?;
        let keyed = records
            .into_iter()
            .map(|r| match r.id() {
                Some(id) => Ok((id.clone(), r)),
                None => Err(CoreError::Internal(format!("{} record without id", T::LABEL))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let count = keyed.len();
        self.records.replace_all(keyed);
        Ok(count)
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create(&self, record: T) -> Result<Arc<T>, CoreError> {
        let result = self.try_create(record).await;
        report(self.notifier.as_ref(), T::LABEL, "create", result, |r| {
            format!("{} '{}' created", T::LABEL, r.display_name())
        })
    }

    /// Replace the record stored under `id`.
    pub async fn update(&self, id: &EntityId, record: T) -> Result<Arc<T>, CoreError> {
        let result = self.try_update(id, record).await;
        report(self.notifier.as_ref(), T::LABEL, "update", result, |r| {
            format!("{} '{}' updated", T::LABEL, r.display_name())
        })
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        let result = self.try_delete(id).await;
        report(self.notifier.as_ref(), T::LABEL, "delete", result, |_| {
            format!("{} {id} deleted", T::LABEL)
        })
    }

    // ── Private helpers ──────────────────────────────────────────────

    async fn try_create(&self, record: T) -> Result<Arc<T>, CoreError> {
        record.validate()?;
        let _writes = self.writes.lock().await;
        let created = self.gateway.create_record(record).await?;
        let id = created
            .id()
            .cloned()
            .ok_or_else(|| CoreError::Internal(format!("backend returned a {} without id", T::LABEL)))?;
        info!(record = T::LABEL, %id, "record created");
        Ok(self.records.upsert(id, created))
    }

    async fn try_update(&self, id: &EntityId, mut record: T) -> Result<Arc<T>, CoreError> {
        let _writes = self.writes.lock().await;
        self.get(id)?;
        record.set_id(id.clone());
        record.validate()?;
        let mut saved = self.gateway.save_record(id, record).await?;
        if saved.id().is_none() {
            saved.set_id(id.clone());
        }
        info!(record = T::LABEL, %id, "record updated");
        Ok(self.records.upsert(id.clone(), saved))
    }

    async fn try_delete(&self, id: &EntityId) -> Result<(), CoreError> {
        let _writes = self.writes.lock().await;
        self.get(id)?;
        self.gateway.delete(T::RESOURCE, T::LABEL, id).await?;
        self.records.remove(id);
        info!(record = T::LABEL, %id, "record deleted");
        Ok(())
    }
}
