//! Stock document handlers: entradas, saidas, perdas, inventarios.

use std::sync::Arc;

use tabled::Tabled;

use farmacia_core::{
    Controller, Document, DocumentHeader, DocumentKind, DocumentStatus, EntityId, LineItem,
    NewLineItem,
};

use crate::cli::{DocumentsArgs, DocumentsCommand, GlobalOpts, StatusFilter};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Quantity")]
    quantity: u64,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Arc<Document>> for DocumentRow {
    fn from(d: &Arc<Document>) -> Self {
        Self {
            id: d.id.to_string(),
            date: util::fmt_date(d.date()),
            summary: d.summary().to_owned(),
            items: d.items().len(),
            quantity: d.items().total_quantity(),
            status: d.status().to_string(),
        }
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Lot")]
    lot: String,
    #[tabled(rename = "Manufactured")]
    manufactured: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&LineItem> for ItemRow {
    fn from(i: &LineItem) -> Self {
        Self {
            id: i.id.to_string(),
            product: i.product.clone(),
            quantity: i.quantity,
            lot: i.lot.clone(),
            manufactured: util::fmt_date(i.manufactured_on),
            expires: util::fmt_date(i.expires_on),
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

fn header_pairs(header: &DocumentHeader) -> Vec<(&'static str, String)> {
    let text = |s: &Option<String>| s.clone().unwrap_or_default();
    match header {
        DocumentHeader::Entrada(h) => vec![
            (
                "Supplier ID",
                h.supplier_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            ),
            ("Supplier", h.supplier_name.clone()),
            ("Entry date", util::fmt_date(h.entry_date)),
        ],
        DocumentHeader::Saida(h) => vec![
            ("Patient", h.patient_name.clone()),
            ("CPF", h.patient_cpf.clone()),
            ("Doctor", h.doctor_name.clone()),
            ("License", h.doctor_license.clone()),
            ("Council", text(&h.medical_council)),
            ("Exit date", util::fmt_date(h.exit_date)),
            ("Prescribed on", util::fmt_date(h.prescription_date)),
            ("Prescription", text(&h.prescription_number)),
            ("Prescription type", text(&h.prescription_type)),
        ],
        DocumentHeader::Perda(h) => vec![
            ("Loss date", util::fmt_date(h.loss_date)),
            ("Reason", h.reason.clone()),
        ],
        DocumentHeader::Inventario(h) => vec![
            ("Count date", util::fmt_date(h.count_date)),
            ("Reason", h.reason.clone()),
        ],
    }
}

fn detail(doc: &Arc<Document>) -> String {
    let mut fields = vec![
        ("ID", doc.id.to_string()),
        ("Kind", doc.kind().label().to_owned()),
        ("Status", doc.status().to_string()),
    ];
    fields.extend(header_pairs(doc.header()));
    let mut out = output::detail_block(&fields);

    if doc.items().is_empty() {
        out.push_str("\n\nNo items.");
    } else {
        let rows: Vec<ItemRow> = doc.items().iter().map(ItemRow::from).collect();
        out.push_str("\n\n");
        out.push_str(&output::render_table(&rows));
    }
    out
}

fn print_document(doc: &Arc<Document>, global: &GlobalOpts) {
    let out = output::render_single(&global.output, doc, detail, |d| d.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    kind: DocumentKind,
    args: DocumentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = controller.documents(kind)?;
    store.refresh().await?;

    match args.command {
        DocumentsCommand::List { status } => {
            let all = store.list();
            let wanted = status.map(|s| match s {
                StatusFilter::Draft => DocumentStatus::Draft,
                StatusFilter::Effective => DocumentStatus::Effective,
            });
            let docs: Vec<Arc<Document>> = all
                .iter()
                .filter(|d| wanted.is_none_or(|w| d.status() == w))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &docs,
                |d| DocumentRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DocumentsCommand::Get { id } => {
            let doc = store.get(&EntityId::from(id))?;
            print_document(&doc, global);
            Ok(())
        }

        DocumentsCommand::Items { id } => {
            let doc = store.get(&EntityId::from(id))?;
            let items: Vec<&LineItem> = doc.items().iter().collect();
            let out = output::render_list(
                &global.output,
                &items,
                |i| ItemRow::from(*i),
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DocumentsCommand::Create { set, from_file } => {
            let fields = util::payload(&set, from_file.as_deref())?;
            let header = DocumentHeader::from_value(kind, serde_json::Value::Object(fields))?;
            let doc = store.create(header).await?;
            print_document(&doc, global);
            Ok(())
        }

        DocumentsCommand::Update { id, set, from_file } => {
            let id = EntityId::from(id);
            let patch = util::payload(&set, from_file.as_deref())?;
            let header = store.get(&id)?.header().merged(&patch)?;
            let doc = store.update(&id, header).await?;
            print_document(&doc, global);
            Ok(())
        }

        DocumentsCommand::Delete { id } => {
            let id = EntityId::from(id);
            // Surface NotFound before prompting
            store.get(&id)?;
            if !util::confirm(
                &format!("Delete {} {id}? This cannot be undone.", kind.label()),
                "delete",
                global.yes,
            )? {
                return Ok(());
            }
            store.delete(&id).await?;
            Ok(())
        }

        DocumentsCommand::AddItem {
            id,
            produto,
            quantidade,
            lote,
            fabricacao,
            validade,
        } => {
            let mut item = NewLineItem::new(produto, quantidade, lote);
            item.manufactured_on = fabricacao
                .map(|made| util::parse_date("fabricacao", &made))
                .transpose()?;
            item.expires_on = validade
                .map(|expires| util::parse_date("validade", &expires))
                .transpose()?;
            let doc = store.add_item(&EntityId::from(id), item).await?;
            print_document(&doc, global);
            Ok(())
        }

        DocumentsCommand::RemoveItem { id, item } => {
            let doc = store
                .remove_item(&EntityId::from(id), &EntityId::from(item))
                .await?;
            print_document(&doc, global);
            Ok(())
        }

        DocumentsCommand::Finalize { id } => {
            let id = EntityId::from(id);
            store.get(&id)?;
            if !util::confirm(
                &format!("Finalize {} {id}? It cannot be edited afterwards.", kind.label()),
                "finalize",
                global.yes,
            )? {
                return Ok(());
            }
            let doc = store.finalize(&id).await?;
            print_document(&doc, global);
            Ok(())
        }
    }
}
