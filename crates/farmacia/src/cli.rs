//! Clap derive structures for the `farmacia` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so that `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// farmacia -- pharmacy stock documents from the command line
#[derive(Debug, Parser)]
#[command(
    name = "farmacia",
    version,
    about = "Manage pharmacy stock documents from the command line",
    long_about = "Record goods received (entradas), dispensed (saidas), written off \
        (perdas) and counted (inventarios), finalize them, and manage the \
        product, supplier and company registers.\n\n\
        Runs against built-in demo data (--mock, the default) or a REST \
        backend (--remote).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "FARMACIA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, env = "FARMACIA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Use the built-in demo data
    #[arg(long, global = true, conflicts_with = "remote")]
    pub mock: bool,

    /// Use the REST backend
    #[arg(long, global = true)]
    pub remote: bool,

    /// Login email (overrides profile)
    #[arg(long, env = "FARMACIA_EMAIL", global = true)]
    pub email: Option<String>,

    /// Login password
    #[arg(long, env = "FARMACIA_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FARMACIA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FARMACIA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FARMACIA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Goods received from suppliers
    #[command(alias = "entrada")]
    Entradas(DocumentsArgs),

    /// Medicines dispensed against a prescription
    #[command(alias = "saida")]
    Saidas(DocumentsArgs),

    /// Write-offs (expiry, breakage)
    #[command(alias = "perda")]
    Perdas(DocumentsArgs),

    /// Stock counts
    #[command(alias = "inventario")]
    Inventarios(DocumentsArgs),

    /// Product register
    #[command(alias = "produto")]
    Produtos(RecordsArgs),

    /// Supplier register
    #[command(alias = "fornecedor")]
    Fornecedores(RecordsArgs),

    /// Company register
    #[command(alias = "empresa")]
    Empresas(RecordsArgs),

    /// Current stock positions
    Estoque(StockArgs),

    /// Send the regulatory movement file for a date range
    Transmitir(TransmitArgs),

    /// Register a payment for a company
    Pagamento(PaymentArgs),

    /// Check the configured credentials and show the logged-in user
    Login,

    /// Create a backend account
    #[command(alias = "registrar")]
    Register(RegisterArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared argument parsers ──────────────────────────────────────────

/// Parse `key=value`. A trailing `:` on the key (`key:=value`) marks the
/// value as raw JSON.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.trim().to_owned(), value.to_owned()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOCUMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: DocumentsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    /// Still editable
    Draft,
    /// Finalized
    Effective,
}

#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List documents
    #[command(alias = "ls")]
    List {
        /// Only documents in this status
        #[arg(long)]
        status: Option<StatusFilter>,
    },

    /// Show a document with its items
    Get {
        /// Document ID
        id: String,
    },

    /// Create a draft document
    #[command(after_help = "Header fields per kind:\n  \
        entradas:    id_fornecedor, nome_fornecedor*, data_entrada*\n  \
        saidas:      nome_paciente*, cpf_paciente*, nome_medico*, crm*, data_saida*,\n               \
        data_receita, numero_receita, tipo_receituario, conselho_medico\n  \
        perdas:      data_perda*, motivo*\n  \
        inventarios: data_inventario*, motivo*\n\n\
        (* required; dates as YYYY-MM-DD)")]
    Create {
        /// Header field as key=value (repeatable)
        #[arg(long = "set", short = 's', value_parser = parse_key_val, required_unless_present = "from_file")]
        set: Vec<(String, String)>,

        /// Read the header from a JSON file
        #[arg(long, short = 'F', conflicts_with = "set")]
        from_file: Option<PathBuf>,
    },

    /// Change header fields of a draft document
    Update {
        /// Document ID
        id: String,

        /// Header field as key=value (repeatable)
        #[arg(long = "set", short = 's', value_parser = parse_key_val, required_unless_present = "from_file")]
        set: Vec<(String, String)>,

        /// Read header fields from a JSON file
        #[arg(long, short = 'F', conflicts_with = "set")]
        from_file: Option<PathBuf>,
    },

    /// Delete a draft document
    #[command(alias = "rm")]
    Delete {
        /// Document ID
        id: String,
    },

    /// List the items of a document
    #[command(alias = "itens")]
    Items {
        /// Document ID
        id: String,
    },

    /// Append a line item to a draft document
    AddItem {
        /// Document ID
        id: String,

        /// Product name
        #[arg(long)]
        produto: String,

        /// Quantity (positive)
        #[arg(long, allow_negative_numbers = true)]
        quantidade: i64,

        /// Lot number
        #[arg(long)]
        lote: String,

        /// Manufacture date, YYYY-MM-DD (entradas only)
        #[arg(long)]
        fabricacao: Option<String>,

        /// Expiry date, YYYY-MM-DD (entradas only)
        #[arg(long)]
        validade: Option<String>,
    },

    /// Remove a line item from a draft document
    RemoveItem {
        /// Document ID
        id: String,

        /// Item ID
        item: String,
    },

    /// Make a draft document effective (irreversible)
    #[command(alias = "efetivar")]
    Finalize {
        /// Document ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MASTER DATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List records
    #[command(alias = "ls")]
    List {
        /// Only records whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one record
    Get {
        /// Record ID
        id: String,
    },

    /// Create a record
    #[command(after_help = "Fields use the backend names, e.g. --set nome=Dipirona.\n\
        Use key:=value for raw JSON values, e.g. --set quantidade:=10.")]
    Create {
        /// Field as key=value (repeatable)
        #[arg(long = "set", short = 's', value_parser = parse_key_val, required_unless_present = "from_file")]
        set: Vec<(String, String)>,

        /// Read the record from a JSON file
        #[arg(long, short = 'F', conflicts_with = "set")]
        from_file: Option<PathBuf>,
    },

    /// Change fields of a record
    Update {
        /// Record ID
        id: String,

        /// Field as key=value (repeatable)
        #[arg(long = "set", short = 's', value_parser = parse_key_val, required_unless_present = "from_file")]
        set: Vec<(String, String)>,

        /// Read fields from a JSON file
        #[arg(long, short = 'F', conflicts_with = "set")]
        from_file: Option<PathBuf>,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS AND FILINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StockArgs {
    /// Only lots past their expiry date
    #[arg(long)]
    pub expired: bool,

    /// Only positions whose description contains this text
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransmitArgs {
    /// First day of the period, YYYY-MM-DD
    #[arg(long)]
    pub from: String,

    /// Last day of the period, YYYY-MM-DD
    #[arg(long)]
    pub to: String,
}

#[derive(Debug, Args)]
pub struct PaymentArgs {
    /// Company ID
    pub empresa: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Full name
    #[arg(long)]
    pub nome: String,

    /// Account email (defaults to --email)
    #[arg(long = "account-email")]
    pub account_email: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, mode, email, password_env, ca_cert, insecure, timeout, mock_latency_ms)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long = "for")]
        for_profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
