// ── Master data ──
//
// Products, suppliers and companies: flat records managed with plain CRUD.
// Documents never hold references to them; a line item copies the
// product's name at the time it is recorded.

use chrono::NaiveDate;
use farmacia_api::Resource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::EntityId;
use crate::error::CoreError;

/// A master-data record the generic `RecordStore` can manage.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const RESOURCE: Resource;
    /// Label used in notifications and error messages.
    const LABEL: &'static str;

    /// `None` until the record has been stored.
    fn id(&self) -> Option<&EntityId>;
    fn set_id(&mut self, id: EntityId);
    /// Name shown in lists and notifications.
    fn display_name(&self) -> &str;
    fn validate(&self) -> Result<(), CoreError>;
}

fn min_chars(field: &str, value: &str, min: usize) -> Result<(), CoreError> {
    if value.trim().chars().count() < min {
        return Err(CoreError::invalid(
            field,
            format!("must have at least {min} characters"),
        ));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::missing_fields(&[field]));
    }
    Ok(())
}

/// Shape check only: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn email(field: &str, value: &str) -> Result<(), CoreError> {
    required(field, value)?;
    if !is_valid_email(value.trim()) {
        return Err(CoreError::invalid(field, format!("'{value}' is not a valid email address")));
    }
    Ok(())
}

// ── Product ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum TherapeuticClass {
    #[default]
    #[serde(rename = "Antimicrobianos")]
    #[strum(to_string = "Antimicrobianos")]
    Antimicrobial,
    #[serde(rename = "Controle Especial")]
    #[strum(to_string = "Controle Especial")]
    SpecialControl,
}

/// Controlled-substance list of Portaria 344/98.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Ordinance {
    A1,
    A2,
    A3,
    B1,
    B2,
    C1,
    C2,
    C3,
    C4,
    C5,
    #[default]
    AM,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "codigoBarras", default)]
    pub barcode: String,
    #[serde(rename = "registroMs", default)]
    pub ms_registration: String,
    #[serde(rename = "classeTerapeutica", default)]
    pub therapeutic_class: TherapeuticClass,
    #[serde(rename = "portariaMedicamento", default)]
    pub ordinance: Ordinance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
    #[serde(rename = "quantidade", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(rename = "apresentacao", default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
    #[serde(rename = "dataHoraFabricacao", default, skip_serializing_if = "Option::is_none")]
    pub manufactured_on: Option<NaiveDate>,
    #[serde(rename = "dataHoraValidade", default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

impl Record for Product {
    const RESOURCE: Resource = Resource::Produtos;
    const LABEL: &'static str = "Produto";

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), CoreError> {
        min_chars("nome", &self.name, 3)?;
        if let (Some(made), Some(expires)) = (self.manufactured_on, self.expires_on) {
            if made > expires {
                return Err(CoreError::invalid(
                    "dataHoraValidade",
                    format!("expiry {expires} is before manufacture {made}"),
                ));
            }
        }
        Ok(())
    }
}

// ── Supplier ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub cnpj: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
}

impl Record for Supplier {
    const RESOURCE: Resource = Resource::Fornecedores;
    const LABEL: &'static str = "Fornecedor";

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), CoreError> {
        min_chars("nome", &self.name, 3)?;
        min_chars("cnpj", &self.cnpj, 14)?;
        email("email", &self.email)?;
        required("telefone", &self.phone)
    }
}

// ── Company ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "razao_social")]
    pub legal_name: String,
    #[serde(default)]
    pub cnpj: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "estado", default)]
    pub state: String,
    #[serde(default)]
    pub cep: String,
}

impl Record for Company {
    const RESOURCE: Resource = Resource::Empresas;
    const LABEL: &'static str = "Empresa";

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn display_name(&self) -> &str {
        &self.legal_name
    }

    fn validate(&self) -> Result<(), CoreError> {
        let missing: Vec<&str> = [
            ("razao_social", &self.legal_name),
            ("cnpj", &self.cnpj),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(CoreError::missing_fields(&missing));
        }
        email("email", &self.email)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("fornecedor@teste.com"));
        assert!(!is_valid_email("fornecedor@teste"));
        assert!(!is_valid_email("@teste.com"));
        assert!(!is_valid_email("a b@teste.com"));
        assert!(!is_valid_email("a@@teste.com"));
    }

    #[test]
    fn product_needs_three_char_name() {
        let product: Product = serde_json::from_value(json!({ "nome": "AB" })).unwrap();
        assert!(matches!(
            product.validate(),
            Err(CoreError::Validation { ref field, .. }) if field == "nome"
        ));
    }

    #[test]
    fn product_enums_use_display_names() {
        let product: Product = serde_json::from_value(json!({
            "nome": "Amoxicilina",
            "classeTerapeutica": "Controle Especial",
            "portariaMedicamento": "C1"
        }))
        .unwrap();
        assert_eq!(product.therapeutic_class, TherapeuticClass::SpecialControl);
        assert_eq!(product.ordinance, Ordinance::C1);
        assert_eq!("Antimicrobianos".parse::<TherapeuticClass>().unwrap(), TherapeuticClass::Antimicrobial);
    }

    #[test]
    fn supplier_rules() {
        let mut supplier: Supplier = serde_json::from_value(json!({
            "nome": "Fornecedor Teste",
            "cnpj": "12345678901234",
            "email": "fornecedor@teste.com",
            "telefone": "(11) 1234-5678"
        }))
        .unwrap();
        supplier.validate().unwrap();

        supplier.cnpj = "123".into();
        assert!(matches!(supplier.validate(), Err(CoreError::Validation { ref field, .. }) if field == "cnpj"));
    }

    #[test]
    fn company_reports_all_missing_fields() {
        let company: Company = serde_json::from_value(json!({ "razao_social": "" })).unwrap();
        assert!(matches!(
            company.validate(),
            Err(CoreError::Validation { ref field, .. }) if field == "razao_social, cnpj, email"
        ));
    }
}
