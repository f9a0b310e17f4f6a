use std::fs;

use anyhow::{Context, Result};
use fpfg_convert::config::Config;
use fpfg_convert::extract::{extract_objects, Extraction};
use fpfg_convert::report::render_extraction;
use xml_table_core::parse_file;

use crate::cli::{ExtractArgs, ExtractFlags, OutputFormat};

pub fn run_extract(args: ExtractArgs) -> Result<()> {
    let (_, extraction) = load_extraction(&args.file, &args.extract)?;

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&extraction)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write extraction {}", path.display()))?;
    }

    match args.format {
        OutputFormat::Text => println!("{}", render_extraction(&extraction)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&extraction)?),
    }

    Ok(())
}

/// Load settings, parse the export and extract objects.
pub fn load_extraction(
    file: &std::path::Path,
    flags: &ExtractFlags,
) -> Result<(Config, Extraction)> {
    let config = Config::load_optional(flags.config.as_deref())?;
    let options = config.extract_options(&flags.overrides())?;
    let root =
        parse_file(file).with_context(|| format!("failed to parse {}", file.display()))?;
    let extraction = extract_objects(&root, &options);
    tracing::info!(objects = extraction.total(), renamed = extraction.name_map.len(), "extracted");
    Ok((config, extraction))
}
