// ── Document store ──
//
// All documents of one kind. Validation and lifecycle checks run locally
// first; the gateway call follows, and local state changes only once it
// has succeeded. Writes are serialized: each one holds `writes` from the
// first check until the result is applied.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::collection::EntityCollection;
use super::{report, report_failure};
use crate::error::CoreError;
use crate::fixtures;
use crate::gateway::Gateway;
use crate::model::{Document, DocumentHeader, DocumentKind, EntityId, NewLineItem};
use crate::notify::Notifier;
use crate::stream::EntityStream;

pub struct DocumentStore {
    kind: DocumentKind,
    docs: EntityCollection<Document>,
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
    writes: Mutex<()>,
}

impl DocumentStore {
    /// A fixture-backed store starts out holding the fixtures.
    pub(crate) fn new(kind: DocumentKind, gateway: Gateway, notifier: Arc<dyn Notifier>) -> Self {
        let docs = EntityCollection::new();
        if matches!(gateway, Gateway::Fixture) {
            docs.replace_all(fixtures::documents(kind).into_iter().map(|d| (d.id.clone(), d)));
        }
        Self {
            kind,
            docs,
            gateway,
            notifier,
            writes: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Every document, in insertion order.
    pub fn list(&self) -> Arc<Vec<Arc<Document>>> {
        self.docs.snapshot()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &EntityId) -> Result<Arc<Document>, CoreError> {
        self.docs
            .get(id)
            .ok_or_else(|| CoreError::not_found(self.kind.label(), id))
    }

    pub fn subscribe(&self) -> EntityStream<Document> {
        EntityStream::new(self.docs.subscribe())
    }

    /// Reload from the gateway, replacing local contents.
    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let _writes = self.writes.lock().await;
        let docs = self
            .gateway
            .load_documents(self.kind)
            .await
            .inspect_err(|err| report_failure(self.notifier.as_ref(), self.kind.label(), "load", err))?;
        let count = docs.len();
        self.docs
            .replace_all(docs.into_iter().map(|doc| (doc.id.clone(), doc)));
        debug!(kind = %self.kind, count, "documents refreshed");
        Ok(count)
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create(&self, header: DocumentHeader) -> Result<Arc<Document>, CoreError> {
        let result = self.try_create(header).await;
        self.report("create", result, |doc| {
            format!("{} {} created", doc.kind().label(), doc.id)
        })
    }

    /// Replace the header of a Draft document.
    pub async fn update(&self, id: &EntityId, header: DocumentHeader) -> Result<Arc<Document>, CoreError> {
        let result = self
            .modify(id, |doc| doc.update(header).map(|()| true))
            .await;
        self.report("update", result, |doc| {
            format!("{} {} updated", doc.kind().label(), doc.id)
        })
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        let result = self.try_delete(id).await;
        self.report("delete", result, |_| {
            format!("{} {id} deleted", self.kind.label())
        })
    }

    /// Append a line item, returning the updated document.
    pub async fn add_item(&self, id: &EntityId, item: NewLineItem) -> Result<Arc<Document>, CoreError> {
        let result = self
            .modify(id, |doc| doc.add_item(item).map(|_| true))
            .await;
        self.report("add item to", result, |doc| {
            format!("Item added to {} {}", doc.kind().label(), doc.id)
        })
    }

    /// Remove a line item. An unknown item id changes nothing and is not an
    /// error, but the document must still be a Draft.
    pub async fn remove_item(&self, id: &EntityId, item_id: &EntityId) -> Result<Arc<Document>, CoreError> {
        let result = self
            .modify(id, |doc| doc.remove_item(item_id).map(|removed| removed.is_some()))
            .await;
        self.report("remove item from", result, |doc| {
            format!("Item removed from {} {}", doc.kind().label(), doc.id)
        })
    }

    /// Draft → Effective.
    pub async fn finalize(&self, id: &EntityId) -> Result<Arc<Document>, CoreError> {
        let result = self.try_finalize(id).await;
        self.report("finalize", result, |doc| {
            format!("{} {} finalized", doc.kind().label(), doc.id)
        })
    }

    // ── Private helpers ──────────────────────────────────────────────

    async fn try_create(&self, header: DocumentHeader) -> Result<Arc<Document>, CoreError> {
        if header.kind() != self.kind {
            return Err(CoreError::invalid(
                "header",
                format!("expected a {} header, got {}", self.kind, header.kind()),
            ));
        }
        header.validate()?;
        let _writes = self.writes.lock().await;
        let doc = self.gateway.create_document(&header).await?;
        info!(kind = %self.kind, id = %doc.id, "document created");
        Ok(self.docs.upsert(doc.id.clone(), doc))
    }

    async fn try_delete(&self, id: &EntityId) -> Result<(), CoreError> {
        let _writes = self.writes.lock().await;
        let doc = self.get(id)?;
        doc.ensure_deletable()?;
        self.gateway
            .delete(self.kind.resource(), self.kind.label(), id)
            .await?;
        self.docs.remove(id);
        info!(kind = %self.kind, %id, "document deleted");
        Ok(())
    }

    async fn try_finalize(&self, id: &EntityId) -> Result<Arc<Document>, CoreError> {
        let _writes = self.writes.lock().await;
        let current = self.get(id)?;
        let mut next = Document::clone(&current);
        next.finalize()?;
        self.gateway.finalize_document(self.kind, id).await?;
        info!(kind = %self.kind, %id, "document finalized");
        Ok(self.docs.upsert(id.clone(), next))
    }

    /// Apply `change` to a copy of the document and persist it.
    ///
    /// `change` returns whether anything changed; when it did not, the
    /// gateway is not called.
    async fn modify(
        &self,
        id: &EntityId,
        change: impl FnOnce(&mut Document) -> Result<bool, CoreError>,
    ) -> Result<Arc<Document>, CoreError> {
        let _writes = self.writes.lock().await;
        let current = self.get(id)?;
        let mut next = Document::clone(&current);
        if !change(&mut next)? {
            return Ok(current);
        }
        let saved = self.gateway.save_document(next).await?;
        Ok(self.docs.upsert(id.clone(), saved))
    }

    fn report<T>(
        &self,
        verb: &str,
        result: Result<T, CoreError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, CoreError> {
        report(self.notifier.as_ref(), self.kind.label(), verb, result, success)
    }
}
