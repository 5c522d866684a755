//! Command handlers, one module per command group.

pub mod config_cmd;
pub mod documents;
pub mod payment;
pub mod records;
pub mod session;
pub mod stock;
pub mod transmit;
pub mod util;

use farmacia_core::{Controller, DocumentKind};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a session command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Entradas(args) => documents::handle(controller, DocumentKind::Entrada, args, global).await,
        Command::Saidas(args) => documents::handle(controller, DocumentKind::Saida, args, global).await,
        Command::Perdas(args) => documents::handle(controller, DocumentKind::Perda, args, global).await,
        Command::Inventarios(args) => {
            documents::handle(controller, DocumentKind::Inventario, args, global).await
        }
        Command::Produtos(args) => {
            records::handle(controller.products()?.as_ref(), args, global).await
        }
        Command::Fornecedores(args) => {
            records::handle(controller.suppliers()?.as_ref(), args, global).await
        }
        Command::Empresas(args) => {
            records::handle(controller.companies()?.as_ref(), args, global).await
        }
        Command::Estoque(args) => stock::handle(controller, &args, global).await,
        Command::Transmitir(args) => transmit::handle(controller, &args, global).await,
        Command::Pagamento(args) => payment::handle(controller, &args, global).await,
        Command::Login => session::login(controller, global),
        // Config, Completions and Register are handled before dispatch
        Command::Config(_) | Command::Completions(_) | Command::Register(_) => unreachable!(),
    }
}
