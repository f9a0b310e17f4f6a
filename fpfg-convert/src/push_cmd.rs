use anyhow::{bail, Context, Result};
use fpfg_convert::config::{env_var, Config};
use fpfg_convert::export::write_report_csv;
use fpfg_convert::fortigate::FortiGateClient;
use fpfg_convert::push::PushSession;
use fpfg_convert::record::PUSH_ORDER;
use fpfg_convert::report::{render_connection, render_push_report};

use crate::cli::{OutputFormat, PushArgs, TestConnectionArgs};
use crate::extract_cmd::load_extraction;

pub fn run_push(args: PushArgs) -> Result<()> {
    let categories = if args.only.is_empty() {
        PUSH_ORDER.to_vec()
    } else {
        args.only.clone()
    };
    if !categories.iter().any(|c| c.is_pushable()) {
        bail!("nothing to push: zones and policies are extracted for review only");
    }

    let (config, extraction) = load_extraction(&args.file, &args.extract)?;
    let fortigate = config.fortigate(&args.connection.overrides(), env_var)?;
    let host = fortigate.host.clone();

    let client = FortiGateClient::new(fortigate)?;
    let mut session = PushSession::new(client);
    let version = session
        .connect()
        .with_context(|| format!("cannot reach FortiGate at {host}"))?;
    tracing::info!(host = %host, version = ?version, "pushing");

    let report = session.push_categories(&extraction, &categories)?;

    if let Some(path) = &args.report_csv {
        write_report_csv(&report, path, args.show)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    match args.format {
        OutputFormat::Text => println!("{}", render_push_report(&report, args.show)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

pub fn run_test_connection(args: TestConnectionArgs) -> Result<()> {
    let config = Config::load_optional(args.config.as_deref())?;
    let fortigate = config.fortigate(&args.connection.overrides(), env_var)?;
    let host = fortigate.host.clone();

    let client = FortiGateClient::new(fortigate)?;
    let mut session = PushSession::new(client);
    session
        .connect()
        .with_context(|| format!("cannot reach FortiGate at {host}"))?;
    if let Some(info) = session.remote() {
        println!("{}", render_connection(&host, info));
    }
    Ok(())
}
