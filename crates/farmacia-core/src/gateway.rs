// ── Data gateway ──
//
// The single point where mock and remote modes diverge. Stores validate
// and apply; the gateway only answers "what does the source of truth say
// after this call".

use chrono::NaiveDate;
use farmacia_api::{ApiClient, PaymentRequest, Resource, TransmitRequest};
use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;
use crate::fixtures;
use crate::model::{Document, DocumentHeader, DocumentKind, EntityId, Record, StockEntry, User};

#[derive(Debug, Clone)]
pub(crate) enum Gateway {
    /// In-memory fixtures; every write succeeds.
    Fixture,
    Remote(ApiClient),
}

fn malformed(what: impl std::fmt::Display, err: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("Malformed {what} record from backend: {err}"))
}

impl Gateway {
    // ── Documents ────────────────────────────────────────────────────

    pub(crate) async fn load_documents(&self, kind: DocumentKind) -> Result<Vec<Document>, CoreError> {
        match self {
            Self::Fixture => Ok(fixtures::documents(kind)),
            Self::Remote(api) => {
                let raw: Vec<Value> = api.list(kind.resource()).await?;
                debug!(%kind, count = raw.len(), "loaded documents");
                raw.into_iter()
                    .map(|value| Document::from_value(kind, value).map_err(|e| malformed(kind, e)))
                    .collect()
            }
        }
    }

    /// Store a new document built from a validated header.
    pub(crate) async fn create_document(&self, header: &DocumentHeader) -> Result<Document, CoreError> {
        let kind = header.kind();
        match self {
            Self::Fixture => Document::create(EntityId::generate(), header.clone()),
            Self::Remote(api) => {
                let value: Value = api.create(kind.resource(), header).await?;
                Document::from_value(kind, value).map_err(|e| malformed(kind, e))
            }
        }
    }

    /// Replace a stored document with `doc` (header, status and items).
    pub(crate) async fn save_document(&self, doc: Document) -> Result<Document, CoreError> {
        match self {
            Self::Fixture => Ok(doc),
            Self::Remote(api) => {
                let kind = doc.kind();
                let id = doc.id.to_string();
                let value: Value = api
                    .update(kind.resource(), &id, &doc)
                    .await
                    .map_err(|e| CoreError::from(e).with_context(kind.label(), &id))?;
                Document::from_value(kind, value).map_err(|e| malformed(kind, e))
            }
        }
    }

    pub(crate) async fn finalize_document(&self, kind: DocumentKind, id: &EntityId) -> Result<(), CoreError> {
        match self {
            Self::Fixture => Ok(()),
            Self::Remote(api) => {
                let id = id.to_string();
                api.finalize(kind.resource(), &id)
                    .await
                    .map_err(|e| CoreError::from(e).with_context(kind.label(), &id))
            }
        }
    }

    pub(crate) async fn delete(&self, resource: Resource, label: &str, id: &EntityId) -> Result<(), CoreError> {
        match self {
            Self::Fixture => Ok(()),
            Self::Remote(api) => {
                let id = id.to_string();
                api.delete(resource, &id)
                    .await
                    .map_err(|e| CoreError::from(e).with_context(label, &id))
            }
        }
    }

    // ── Master data ──────────────────────────────────────────────────

    pub(crate) async fn load_records<T: Record>(&self, seed: fn() -> Vec<T>) -> Result<Vec<T>, CoreError> {
        match self {
            Self::Fixture => Ok(seed()),
            Self::Remote(api) => Ok(api.list(T::RESOURCE).await?),
        }
    }

    pub(crate) async fn create_record<T: Record>(&self, mut record: T) -> Result<T, CoreError> {
        match self {
            Self::Fixture => {
                record.set_id(EntityId::generate());
                Ok(record)
            }
            Self::Remote(api) => Ok(api.create(T::RESOURCE, &record).await?),
        }
    }

    pub(crate) async fn save_record<T: Record>(&self, id: &EntityId, record: T) -> Result<T, CoreError> {
        match self {
            Self::Fixture => Ok(record),
            Self::Remote(api) => {
                let id = id.to_string();
                api.update(T::RESOURCE, &id, &record)
                    .await
                    .map_err(|e| CoreError::from(e).with_context(T::LABEL, &id))
            }
        }
    }

    // ── Session ──────────────────────────────────────────────────────

    pub(crate) async fn login(&self, email: &str, password: &SecretString) -> Result<User, CoreError> {
        match self {
            Self::Fixture => Ok(fixtures::user(email)),
            Self::Remote(api) => Ok(api.login(email, password).await?),
        }
    }

    pub(crate) async fn register(&self, name: &str, email: &str, password: &SecretString) -> Result<(), CoreError> {
        match self {
            Self::Fixture => Ok(()),
            Self::Remote(api) => Ok(api.register(name, email, password).await?),
        }
    }

    // ── Reports and filings ──────────────────────────────────────────

    pub(crate) async fn stock(&self) -> Result<Vec<StockEntry>, CoreError> {
        match self {
            Self::Fixture => Ok(fixtures::stock()),
            Self::Remote(api) => Ok(api.stock().await?),
        }
    }

    pub(crate) async fn transmit(&self, start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
        match self {
            Self::Fixture => Ok(()),
            Self::Remote(api) => {
                let request = TransmitRequest {
                    data_inicial: start.to_string(),
                    data_final: end.to_string(),
                };
                Ok(api.transmit(&request).await?)
            }
        }
    }

    pub(crate) async fn pay(&self, company: &EntityId) -> Result<(), CoreError> {
        match self {
            Self::Fixture => Ok(()),
            Self::Remote(api) => {
                let request = PaymentRequest {
                    empresa_id: company.to_string(),
                };
                Ok(api.pay(&request).await?)
            }
        }
    }
}
