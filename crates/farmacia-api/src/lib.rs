// farmacia-api: Async Rust client for the farmacia stock-management backend

pub mod client;
pub mod error;
pub mod models;
pub mod resource;
pub mod transport;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use models::{PaymentRequest, TransmitRequest};
pub use resource::Resource;
pub use transport::{TlsMode, TransportConfig};
