// Stock positions reported by `GET /estoque`. Read-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: EntityId,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(default)]
    pub ean: String,
    #[serde(rename = "registro_ms", default)]
    pub ms_registration: String,
    #[serde(rename = "quantidade")]
    pub quantity: i64,
    #[serde(rename = "lote", default)]
    pub lot: String,
    #[serde(rename = "data_fabricacao", default)]
    pub manufactured_on: Option<NaiveDate>,
    #[serde(rename = "data_vencimento", default)]
    pub expires_on: Option<NaiveDate>,
}

impl StockEntry {
    /// Whether the lot has expired as of `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|d| d < today)
    }
}
