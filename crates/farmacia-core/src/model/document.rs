// ── Document aggregate ──
//
// One engine for all four stock documents. `DocumentKind` carries the
// per-type configuration (resource path, required header fields, item
// rules); `DocumentHeader` is the tagged header variant.

use chrono::NaiveDate;
use farmacia_api::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{EntityId, LineItem, LineItems, NewLineItem};
use crate::error::CoreError;
use crate::lifecycle::{Action, DocumentStatus};

// ── Kind ─────────────────────────────────────────────────────────────

/// The four stock document types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocumentKind {
    /// Goods received from a supplier.
    Entrada,
    /// Dispensing against a prescription.
    Saida,
    /// Write-off (expiry, breakage).
    Perda,
    /// Stock count.
    Inventario,
}

impl DocumentKind {
    pub fn resource(self) -> Resource {
        match self {
            Self::Entrada => Resource::Entradas,
            Self::Saida => Resource::Saidas,
            Self::Perda => Resource::Perdas,
            Self::Inventario => Resource::Inventarios,
        }
    }

    /// Human label used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Entrada => "Entrada",
            Self::Saida => "Saída",
            Self::Perda => "Perda",
            Self::Inventario => "Inventário",
        }
    }

    /// Every header field accepted for this kind, in display order.
    pub fn header_fields(self) -> &'static [&'static str] {
        match self {
            Self::Entrada => &["id_fornecedor", "nome_fornecedor", "data_entrada"],
            Self::Saida => &[
                "nome_paciente",
                "cpf_paciente",
                "nome_medico",
                "crm",
                "data_saida",
                "data_receita",
                "numero_receita",
                "tipo_receituario",
                "conselho_medico",
            ],
            Self::Perda => &["data_perda", "motivo"],
            Self::Inventario => &["data_inventario", "motivo"],
        }
    }

    /// Header fields that must be non-empty before a document can exist.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Entrada => &["nome_fornecedor", "data_entrada"],
            Self::Saida => &[
                "nome_paciente",
                "cpf_paciente",
                "nome_medico",
                "crm",
                "data_saida",
            ],
            Self::Perda => &["data_perda", "motivo"],
            Self::Inventario => &["data_inventario", "motivo"],
        }
    }

    /// Only received goods carry manufacture/expiry dates per item.
    pub fn allows_item_dates(self) -> bool {
        self == Self::Entrada
    }
}

// ── Headers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntradaHeader {
    #[serde(rename = "id_fornecedor", default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
    #[serde(rename = "nome_fornecedor", default)]
    pub supplier_name: String,
    #[serde(rename = "data_entrada", default)]
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaidaHeader {
    #[serde(rename = "nome_paciente", default)]
    pub patient_name: String,
    #[serde(rename = "cpf_paciente", default)]
    pub patient_cpf: String,
    #[serde(rename = "nome_medico", default)]
    pub doctor_name: String,
    #[serde(rename = "crm", default)]
    pub doctor_license: String,
    #[serde(rename = "data_saida", default)]
    pub exit_date: Option<NaiveDate>,
    #[serde(rename = "data_receita", default, skip_serializing_if = "Option::is_none")]
    pub prescription_date: Option<NaiveDate>,
    #[serde(rename = "numero_receita", default, skip_serializing_if = "Option::is_none")]
    pub prescription_number: Option<String>,
    #[serde(rename = "tipo_receituario", default, skip_serializing_if = "Option::is_none")]
    pub prescription_type: Option<String>,
    #[serde(rename = "conselho_medico", default, skip_serializing_if = "Option::is_none")]
    pub medical_council: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerdaHeader {
    #[serde(rename = "data_perda", default)]
    pub loss_date: Option<NaiveDate>,
    #[serde(rename = "motivo", default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventarioHeader {
    #[serde(rename = "data_inventario", default)]
    pub count_date: Option<NaiveDate>,
    #[serde(rename = "motivo", default)]
    pub reason: String,
}

/// Header of a document, one variant per kind.
///
/// Serializes flat (just the header fields); decoding always goes through
/// `DocumentHeader::from_value` because the kind is known from context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentHeader {
    Entrada(EntradaHeader),
    Saida(SaidaHeader),
    Perda(PerdaHeader),
    Inventario(InventarioHeader),
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl DocumentHeader {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Entrada(_) => DocumentKind::Entrada,
            Self::Saida(_) => DocumentKind::Saida,
            Self::Perda(_) => DocumentKind::Perda,
            Self::Inventario(_) => DocumentKind::Inventario,
        }
    }

    /// Required fields that are empty or absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks: Vec<(&'static str, bool)> = match self {
            Self::Entrada(h) => vec![
                ("nome_fornecedor", blank(&h.supplier_name)),
                ("data_entrada", h.entry_date.is_none()),
            ],
            Self::Saida(h) => vec![
                ("nome_paciente", blank(&h.patient_name)),
                ("cpf_paciente", blank(&h.patient_cpf)),
                ("nome_medico", blank(&h.doctor_name)),
                ("crm", blank(&h.doctor_license)),
                ("data_saida", h.exit_date.is_none()),
            ],
            Self::Perda(h) => vec![
                ("data_perda", h.loss_date.is_none()),
                ("motivo", blank(&h.reason)),
            ],
            Self::Inventario(h) => vec![
                ("data_inventario", h.count_date.is_none()),
                ("motivo", blank(&h.reason)),
            ],
        };
        checks
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::missing_fields(&missing))
        }
    }

    /// Decode a header of `kind` from a JSON object.
    ///
    /// Unknown keys are rejected so that typos surface instead of silently
    /// producing an empty field.
    pub fn from_value(kind: DocumentKind, value: Value) -> Result<Self, CoreError> {
        let Value::Object(map) = value else {
            return Err(CoreError::invalid("header", "expected a JSON object"));
        };
        if let Some(unknown) = map.keys().find(|k| !kind.header_fields().contains(&k.as_str())) {
            return Err(CoreError::invalid(
                unknown.clone(),
                format!(
                    "not a {kind} field (expected one of: {})",
                    kind.header_fields().join(", ")
                ),
            ));
        }
        decode_header(kind, Value::Object(map))
            .map_err(|e| CoreError::invalid("header", e.to_string()))
    }

    /// Build a header from `key=value` pairs, all values as strings.
    pub fn from_pairs<'a>(
        kind: DocumentKind,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CoreError> {
        let map: Map<String, Value> = pairs
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned())))
            .collect();
        Self::from_value(kind, Value::Object(map))
    }

    /// This header with the keys of `patch` overlaid, revalidated as JSON.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, CoreError> {
        let mut base = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(CoreError::Internal(e.to_string())),
        };
        for (key, value) in patch {
            base.insert(key.clone(), value.clone());
        }
        Self::from_value(self.kind(), Value::Object(base))
    }
}

fn decode_header(kind: DocumentKind, value: Value) -> Result<DocumentHeader, serde_json::Error> {
    Ok(match kind {
        DocumentKind::Entrada => DocumentHeader::Entrada(serde_json::from_value(value)?),
        DocumentKind::Saida => DocumentHeader::Saida(serde_json::from_value(value)?),
        DocumentKind::Perda => DocumentHeader::Perda(serde_json::from_value(value)?),
        DocumentKind::Inventario => DocumentHeader::Inventario(serde_json::from_value(value)?),
    })
}

// ── Aggregate ────────────────────────────────────────────────────────

/// A header, its status and its ordered line items.
///
/// Mutators check the lifecycle first and leave the aggregate untouched on
/// any error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: EntityId,
    #[serde(flatten)]
    header: DocumentHeader,
    status: DocumentStatus,
    #[serde(rename = "itens")]
    items: LineItems,
}

/// Backend record shape for a single kind.
#[derive(Deserialize)]
struct WireDocument<H> {
    id: EntityId,
    #[serde(flatten)]
    header: H,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default, rename = "itens")]
    items: Vec<LineItem>,
}

impl<H> WireDocument<H> {
    fn into_document(self, wrap: fn(H) -> DocumentHeader) -> Document {
        Document::restore(self.id, wrap(self.header), self.status, self.items)
    }
}

impl Document {
    /// New Draft document with no items.
    pub fn create(id: EntityId, header: DocumentHeader) -> Result<Self, CoreError> {
        header.validate()?;
        Ok(Self::restore(id, header, DocumentStatus::Draft, Vec::new()))
    }

    /// Rebuild a document from stored parts without validation.
    pub(crate) fn restore(
        id: EntityId,
        header: DocumentHeader,
        status: DocumentStatus,
        items: Vec<LineItem>,
    ) -> Self {
        Self {
            id,
            header,
            status,
            items: items.into(),
        }
    }

    /// Decode a backend record of `kind`.
    pub fn from_value(kind: DocumentKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            DocumentKind::Entrada => {
                WireDocument::<EntradaHeader>::deserialize(value)?.into_document(DocumentHeader::Entrada)
            }
            DocumentKind::Saida => {
                WireDocument::<SaidaHeader>::deserialize(value)?.into_document(DocumentHeader::Saida)
            }
            DocumentKind::Perda => {
                WireDocument::<PerdaHeader>::deserialize(value)?.into_document(DocumentHeader::Perda)
            }
            DocumentKind::Inventario => WireDocument::<InventarioHeader>::deserialize(value)?
                .into_document(DocumentHeader::Inventario),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn kind(&self) -> DocumentKind {
        self.header.kind()
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn items(&self) -> &LineItems {
        &self.items
    }

    /// The date field of the header, whatever the kind calls it.
    pub fn date(&self) -> Option<NaiveDate> {
        match &self.header {
            DocumentHeader::Entrada(h) => h.entry_date,
            DocumentHeader::Saida(h) => h.exit_date,
            DocumentHeader::Perda(h) => h.loss_date,
            DocumentHeader::Inventario(h) => h.count_date,
        }
    }

    /// One-line description for tables: supplier, patient or reason.
    pub fn summary(&self) -> &str {
        match &self.header {
            DocumentHeader::Entrada(h) => &h.supplier_name,
            DocumentHeader::Saida(h) => &h.patient_name,
            DocumentHeader::Perda(h) => &h.reason,
            DocumentHeader::Inventario(h) => &h.reason,
        }
    }

    // ── Mutators ─────────────────────────────────────────────────────

    fn check(&self, action: Action) -> Result<DocumentStatus, CoreError> {
        self.status.after(action).ok_or_else(|| CoreError::InvalidState {
            entity: self.kind().label().to_owned(),
            id: self.id.to_string(),
            status: self.status.to_string(),
            action: action.to_string(),
        })
    }

    /// Replace the header. Draft only; the kind cannot change.
    pub fn update(&mut self, header: DocumentHeader) -> Result<(), CoreError> {
        self.check(Action::EditHeader)?;
        if header.kind() != self.kind() {
            return Err(CoreError::invalid(
                "header",
                format!("expected a {} header, got {}", self.kind(), header.kind()),
            ));
        }
        header.validate()?;
        self.header = header;
        Ok(())
    }

    pub fn add_item(&mut self, item: NewLineItem) -> Result<&LineItem, CoreError> {
        self.check(Action::AddItem)?;
        let allow_dates = self.kind().allows_item_dates();
        self.items.add(item, allow_dates)
    }

    /// Remove an item. Unknown item ids are a no-op on a Draft.
    pub fn remove_item(&mut self, item_id: &EntityId) -> Result<Option<LineItem>, CoreError> {
        self.check(Action::RemoveItem)?;
        Ok(self.items.remove(item_id))
    }

    pub fn ensure_deletable(&self) -> Result<(), CoreError> {
        self.check(Action::Delete).map(|_| ())
    }

    /// Draft → Effective.
    pub fn finalize(&mut self) -> Result<(), CoreError> {
        self.status = self.check(Action::Finalize)?;
        Ok(())
    }
}
