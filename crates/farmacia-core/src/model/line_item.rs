// ── Line items ──
//
// One product/quantity/lot row of a document, and the ordered collection
// that owns them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::error::CoreError;

/// A validated line item as stored in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: EntityId,
    /// Display name of the product at the time the item was recorded.
    #[serde(rename = "produto")]
    pub product: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "lote")]
    pub lot: String,
    #[serde(
        rename = "dataHoraFabricacao",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub manufactured_on: Option<NaiveDate>,
    #[serde(
        rename = "dataHoraValidade",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_on: Option<NaiveDate>,
}

/// Unvalidated input for `LineItems::add`.
///
/// Fields are optional so that a partially filled form reports every
/// missing value at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    #[serde(rename = "produto", default)]
    pub product: Option<String>,
    #[serde(rename = "quantidade", default)]
    pub quantity: Option<i64>,
    #[serde(rename = "lote", default)]
    pub lot: Option<String>,
    #[serde(rename = "dataHoraFabricacao", default)]
    pub manufactured_on: Option<NaiveDate>,
    #[serde(rename = "dataHoraValidade", default)]
    pub expires_on: Option<NaiveDate>,
}

impl NewLineItem {
    pub fn new(product: impl Into<String>, quantity: i64, lot: impl Into<String>) -> Self {
        Self {
            product: Some(product.into()),
            quantity: Some(quantity),
            lot: Some(lot.into()),
            ..Self::default()
        }
    }

    /// Check the item invariants and assign a fresh id.
    ///
    /// `allow_dates` is false for every document kind except Entrada.
    pub fn validate(self, allow_dates: bool) -> Result<LineItem, CoreError> {
        let product = non_blank(self.product);
        let lot = non_blank(self.lot);

        let mut missing = Vec::new();
        if product.is_none() {
            missing.push("produto");
        }
        if self.quantity.is_none() {
            missing.push("quantidade");
        }
        if lot.is_none() {
            missing.push("lote");
        }
        let (Some(product), Some(quantity), Some(lot)) = (product, self.quantity, lot) else {
            return Err(CoreError::missing_fields(&missing));
        };

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                CoreError::invalid("quantidade", format!("must be a positive integer, got {quantity}"))
            })?;

        if !allow_dates && (self.manufactured_on.is_some() || self.expires_on.is_some()) {
            return Err(CoreError::invalid(
                "dataHoraFabricacao/dataHoraValidade",
                "dates are only recorded on entrada items",
            ));
        }
        if let (Some(made), Some(expires)) = (self.manufactured_on, self.expires_on) {
            if made > expires {
                return Err(CoreError::invalid(
                    "dataHoraValidade",
                    format!("expiry {expires} is before manufacture {made}"),
                ));
            }
        }

        Ok(LineItem {
            id: EntityId::generate(),
            product,
            quantity,
            lot,
            manufactured_on: self.manufactured_on,
            expires_on: self.expires_on,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

// ── Collection ───────────────────────────────────────────────────────

/// Ordered line items of one document.
///
/// Identical product/lot pairs may coexist; there is no update in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    /// Validate and append. The collection is unchanged on error.
    pub fn add(&mut self, item: NewLineItem, allow_dates: bool) -> Result<&LineItem, CoreError> {
        let item = item.validate(allow_dates)?;
        self.0.push(item);
        Ok(&self.0[self.0.len() - 1])
    }

    /// Remove the item with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: &EntityId) -> Option<LineItem> {
        let pos = self.0.iter().position(|item| &item.id == id)?;
        Some(self.0.remove(pos))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total units across all items.
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl From<Vec<LineItem>> for LineItems {
    fn from(items: Vec<LineItem>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
