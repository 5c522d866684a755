mod cli;
mod commands;
mod config;
mod error;
mod notify;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use farmacia_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::notify::CliNotifier;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a session
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "farmacia", &mut std::io::stdout());
            Ok(())
        }

        // Registration runs before anyone is logged in
        Command::Register(args) => {
            let (controller, notifier) = open_controller(&cli.global)?;
            notifier.arm();
            commands::session::register(&controller, args, &cli.global).await
        }

        cmd => {
            let (controller, notifier) = open_controller(&cli.global)?;
            controller.authenticate().await?;
            notifier.arm();

            tracing::debug!(command = ?cmd, mode = %controller.mode(), "dispatching command");
            commands::dispatch(cmd, &controller, &cli.global).await
        }
    }
}

fn open_controller(global: &cli::GlobalOpts) -> Result<(Controller, Arc<CliNotifier>), CliError> {
    let session = config::build_session_config(global)?;
    let notifier = Arc::new(CliNotifier::new(
        global.quiet,
        output::should_color(&global.color),
    ));
    let controller = Controller::with_notifier(session, notifier.clone())?;
    Ok((controller, notifier))
}
