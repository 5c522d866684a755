// ── Domain model ──

pub mod document;
pub mod entity_id;
pub mod line_item;
pub mod master;
pub mod stock;
pub mod user;

pub use document::{
    Document, DocumentHeader, DocumentKind, EntradaHeader, InventarioHeader, PerdaHeader,
    SaidaHeader,
};
pub use entity_id::EntityId;
pub use line_item::{LineItem, LineItems, NewLineItem};
pub use master::{Company, Ordinance, Product, Record, Supplier, TherapeuticClass};
pub use stock::StockEntry;
pub use user::User;
