//! Stock report handler.

use chrono::Local;
use tabled::Tabled;

use farmacia_core::{Controller, StockEntry};

use crate::cli::{GlobalOpts, StockArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct StockRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "EAN")]
    ean: String,
    #[tabled(rename = "MS Reg.")]
    ms_registration: String,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Lot")]
    lot: String,
    #[tabled(rename = "Manufactured")]
    manufactured: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&StockEntry> for StockRow {
    fn from(s: &StockEntry) -> Self {
        Self {
            id: s.id.to_string(),
            description: s.description.clone(),
            ean: s.ean.clone(),
            ms_registration: s.ms_registration.clone(),
            quantity: s.quantity,
            lot: s.lot.clone(),
            manufactured: util::fmt_date(s.manufactured_on),
            expires: util::fmt_date(s.expires_on),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: &StockArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let today = Local::now().date_naive();
    let needle = args.search.as_deref().map(str::to_lowercase);

    let entries: Vec<StockEntry> = controller
        .stock_report()
        .await?
        .into_iter()
        .filter(|s| !args.expired || s.is_expired(today))
        .filter(|s| {
            needle
                .as_deref()
                .is_none_or(|n| s.description.to_lowercase().contains(n))
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |s| StockRow::from(s),
        |s| s.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
