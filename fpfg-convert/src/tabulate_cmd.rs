use anyhow::{Context, Result};
use fpfg_convert::export::{write_tables_csv, write_tables_zip};
use fpfg_convert::report::render_tabulation;
use xml_table_core::{format_json, parse_file, tabulate};

use crate::cli::{OutputFormat, TabulateArgs};

pub fn run_tabulate(args: TabulateArgs) -> Result<()> {
    let root = parse_file(&args.file)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    let tabulation = tabulate(&root);
    tracing::info!(tables = tabulation.tables.len(), "tabulated");

    if let Some(dir) = &args.csv_dir {
        let written = write_tables_csv(&tabulation, dir)
            .with_context(|| format!("failed to export tables to {}", dir.display()))?;
        tracing::info!(files = written.len(), dir = %dir.display(), "wrote csv tables");
    }
    if let Some(path) = &args.zip {
        write_tables_zip(&tabulation, path)
            .with_context(|| format!("failed to write archive {}", path.display()))?;
    }

    match args.format {
        OutputFormat::Text => println!("{}", render_tabulation(&tabulation)),
        OutputFormat::Json => println!("{}", format_json(&tabulation)),
    }

    Ok(())
}
