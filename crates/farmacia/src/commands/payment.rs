//! Payment handler.

use farmacia_core::{Controller, EntityId};

use crate::cli::{GlobalOpts, PaymentArgs};
use crate::error::CliError;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: &PaymentArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = EntityId::from(args.empresa.as_str());
    let companies = controller.companies()?;
    companies.refresh().await?;
    let company = companies.get(&id)?;

    if !util::confirm(
        &format!("Register a payment for '{}'?", company.legal_name),
        "pay",
        global.yes,
    )? {
        return Ok(());
    }
    controller.pay(&id).await?;
    Ok(())
}
