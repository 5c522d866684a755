//! Regulatory file transmission handler.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use farmacia_core::Controller;

use crate::cli::{GlobalOpts, TransmitArgs};
use crate::error::CliError;

use super::util;

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub async fn handle(
    controller: &Controller,
    args: &TransmitArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let start = util::parse_date("from", &args.from)?;
    let end = util::parse_date("to", &args.to)?;

    let bar = if global.quiet {
        ProgressBar::hidden()
    } else {
        spinner(format!("Transmitting movements {start} to {end}..."))
    };
    let result = controller.transmit(start, end).await;
    bar.finish_and_clear();

    result.map_err(CliError::from)
}
