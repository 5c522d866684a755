// farmacia-core: Document lifecycle engine and session facade over farmacia-api.

pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod store;
pub mod stream;

mod fixtures;
mod gateway;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Credentials, DataMode, SessionConfig, TlsVerification};
pub use controller::{Controller, MOCK_EMAIL};
pub use error::CoreError;
pub use lifecycle::DocumentStatus;
pub use notify::{BroadcastNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use store::{DocumentStore, RecordStore};
pub use stream::EntityStream;

pub use model::{
    Company, Document, DocumentHeader, DocumentKind, EntityId, EntradaHeader, InventarioHeader,
    LineItem, LineItems, NewLineItem, Ordinance, PerdaHeader, Product, Record, SaidaHeader,
    StockEntry, Supplier, TherapeuticClass, User,
};
