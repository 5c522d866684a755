//! Master-data handlers: produtos, fornecedores, empresas.
//!
//! One generic handler drives all three registers; `RecordView` supplies
//! the per-type table row and detail block.

use std::sync::Arc;

use serde_json::Value;
use tabled::Tabled;

use farmacia_core::{Company, EntityId, Product, Record, RecordStore, Supplier};

use crate::cli::{GlobalOpts, RecordsArgs, RecordsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Terminal presentation of a master-data record.
pub trait RecordView: Record {
    type Row: Tabled;

    fn row(&self) -> Self::Row;
    fn detail_fields(&self) -> Vec<(&'static str, String)>;
}

fn id_string(id: Option<&EntityId>) -> String {
    id.map(ToString::to_string).unwrap_or_default()
}

// ── Product ─────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Barcode")]
    barcode: String,
    #[tabled(rename = "MS Reg.")]
    ms_registration: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "List")]
    ordinance: String,
}

impl RecordView for Product {
    type Row = ProductRow;

    fn row(&self) -> ProductRow {
        ProductRow {
            id: id_string(self.id.as_ref()),
            name: self.name.clone(),
            barcode: self.barcode.clone(),
            ms_registration: self.ms_registration.clone(),
            class: self.therapeutic_class.to_string(),
            ordinance: self.ordinance.to_string(),
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_string(self.id.as_ref())),
            ("Name", self.name.clone()),
            ("Description", self.description.clone()),
            ("Barcode", self.barcode.clone()),
            ("GTIN", self.gtin.clone().unwrap_or_default()),
            ("MS registration", self.ms_registration.clone()),
            ("Therapeutic class", self.therapeutic_class.to_string()),
            ("Ordinance list", self.ordinance.to_string()),
            ("Presentation", self.presentation.clone().unwrap_or_default()),
            (
                "Quantity",
                self.quantity.map(|q| q.to_string()).unwrap_or_default(),
            ),
            ("Manufactured", util::fmt_date(self.manufactured_on)),
            ("Expires", util::fmt_date(self.expires_on)),
        ]
    }
}

// ── Supplier ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct SupplierRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "CNPJ")]
    cnpj: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

impl RecordView for Supplier {
    type Row = SupplierRow;

    fn row(&self) -> SupplierRow {
        SupplierRow {
            id: id_string(self.id.as_ref()),
            name: self.name.clone(),
            cnpj: self.cnpj.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_string(self.id.as_ref())),
            ("Name", self.name.clone()),
            ("CNPJ", self.cnpj.clone()),
            ("Email", self.email.clone()),
            ("Phone", self.phone.clone()),
        ]
    }
}

// ── Company ─────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct CompanyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Legal name")]
    legal_name: String,
    #[tabled(rename = "CNPJ")]
    cnpj: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl RecordView for Company {
    type Row = CompanyRow;

    fn row(&self) -> CompanyRow {
        CompanyRow {
            id: id_string(self.id.as_ref()),
            legal_name: self.legal_name.clone(),
            cnpj: self.cnpj.clone(),
            city: if self.state.is_empty() {
                self.city.clone()
            } else {
                format!("{}/{}", self.city, self.state)
            },
            email: self.email.clone(),
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_string(self.id.as_ref())),
            ("Legal name", self.legal_name.clone()),
            ("CNPJ", self.cnpj.clone()),
            ("Email", self.email.clone()),
            ("Phone", self.phone.clone()),
            ("Address", self.address.clone()),
            ("City", self.city.clone()),
            ("State", self.state.clone()),
            ("CEP", self.cep.clone()),
        ]
    }
}

// ── Handler ─────────────────────────────────────────────────────────

fn decode<T: Record>(fields: serde_json::Map<String, Value>) -> Result<T, CliError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| CliError::validation(T::LABEL.to_lowercase(), e.to_string()))
}

fn print_record<T: RecordView>(record: &Arc<T>, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        record,
        |r| output::detail_block(&r.detail_fields()),
        |r| id_string(r.id()),
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle<T: RecordView>(
    store: &RecordStore<T>,
    args: RecordsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    store.refresh().await?;

    match args.command {
        RecordsCommand::List { search } => {
            let records: Vec<Arc<T>> = match search {
                Some(term) => store.search(&term),
                None => store.list().iter().cloned().collect(),
            };
            let out = output::render_list(
                &global.output,
                &records,
                |r| r.row(),
                |r| id_string(r.id()),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RecordsCommand::Get { id } => {
            let record = store.get(&EntityId::from(id))?;
            print_record(&record, global);
            Ok(())
        }

        RecordsCommand::Create { set, from_file } => {
            let mut fields = util::payload(&set, from_file.as_deref())?;
            fields.remove("id");
            let record = store.create(decode::<T>(fields)?).await?;
            print_record(&record, global);
            Ok(())
        }

        RecordsCommand::Update { id, set, from_file } => {
            let id = EntityId::from(id);
            let patch = util::payload(&set, from_file.as_deref())?;
            let current = store.get(&id)?;
            let mut fields = match serde_json::to_value(current.as_ref())? {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
            fields.extend(patch);
            let record = store.update(&id, decode::<T>(fields)?).await?;
            print_record(&record, global);
            Ok(())
        }

        RecordsCommand::Delete { id } => {
            let id = EntityId::from(id);
            let record = store.get(&id)?;
            if !util::confirm(
                &format!("Delete {} '{}'?", T::LABEL, record.display_name()),
                "delete",
                global.yes,
            )? {
                return Ok(());
            }
            store.delete(&id).await?;
            Ok(())
        }
    }
}
