use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod extract_cmd;
mod push_cmd;
mod tabulate_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Tabulate(args) => tabulate_cmd::run_tabulate(args),
        Command::Extract(args) => extract_cmd::run_extract(args),
        Command::Push(args) => push_cmd::run_push(args),
        Command::TestConnection(args) => push_cmd::run_test_connection(args),
    }
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
