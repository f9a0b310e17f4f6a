use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use fpfg_convert::config::{ConnectionOverrides, ExtractOverrides};
use fpfg_convert::push_report::OutcomeKind;
use fpfg_convert::record::Category;

#[derive(Parser, Debug)]
#[command(name = "fpfg-convert")]
#[command(about = "Convert Forcepoint SMC XML exports into tables and FortiGate objects")]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Turn every element of an export into one table per tag.
    Tabulate(TabulateArgs),
    /// Extract FortiGate objects from an export.
    Extract(ExtractArgs),
    /// Extract objects and push them to a FortiGate.
    Push(PushArgs),
    /// Check that a FortiGate answers with the given credentials.
    TestConnection(TestConnectionArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
pub struct TabulateArgs {
    /// Forcepoint SMC XML export.
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write one CSV per table into this directory.
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
    /// Write all tables as CSV files into this zip archive.
    #[arg(long)]
    pub zip: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractFlags {
    /// Use a host's own address attribute when it has no nested address.
    #[arg(long)]
    pub host_address_fallback: bool,
    /// Do not map Forcepoint predefined objects to FortiGate built-ins.
    #[arg(long)]
    pub no_builtins: bool,
    /// Replacement built-in mapping TOML file.
    #[arg(long)]
    pub builtins_file: Option<PathBuf>,
    /// Also extract zones and firewall policy rules.
    #[arg(long)]
    pub policies: bool,
    /// Settings TOML file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ExtractFlags {
    pub fn overrides(&self) -> ExtractOverrides {
        ExtractOverrides {
            host_address_fallback: self.host_address_fallback,
            no_builtins: self.no_builtins,
            include_policy_objects: self.policies,
            builtins_file: self.builtins_file.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionFlags {
    /// FortiGate address (or FPFG_HOST).
    #[arg(long)]
    pub host: Option<String>,
    /// Management port; 80 and 8080 use plain HTTP.
    #[arg(long)]
    pub port: Option<u16>,
    /// REST API token (or FPFG_TOKEN).
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub vdom: Option<String>,
    /// Verify the appliance's TLS certificate.
    #[arg(long)]
    pub verify_tls: bool,
}

impl ConnectionFlags {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            host: self.host.clone(),
            port: self.port,
            token: self.token.clone(),
            vdom: self.vdom.clone(),
            verify_tls: self.verify_tls,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Forcepoint SMC XML export.
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write the extraction as JSON to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub extract: ExtractFlags,
}

#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Forcepoint SMC XML export.
    pub file: PathBuf,
    #[command(flatten)]
    pub connection: ConnectionFlags,
    #[command(flatten)]
    pub extract: ExtractFlags,
    /// Push only these categories (repeatable).
    #[arg(long, value_enum)]
    pub only: Vec<Category>,
    /// Print only outcomes of this kind.
    #[arg(long, value_enum)]
    pub show: Option<OutcomeKind>,
    /// Write the outcomes (filtered by --show) as CSV to this file.
    #[arg(long)]
    pub report_csv: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct TestConnectionArgs {
    #[command(flatten)]
    pub connection: ConnectionFlags,
    /// Settings TOML file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
