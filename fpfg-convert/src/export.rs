//! CSV and zip export of tabulations and push reports.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use xml_table_core::{Table, Tabulation};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::push_report::{OutcomeKind, PushReport};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("zip archive failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// One table as CSV bytes, header row first.
pub fn table_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Write `<table>.csv` for every table into `dir`, creating it if needed.
/// Returns the written paths in table-name order.
pub fn write_tables_csv(tabulation: &Tabulation, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let mut written = Vec::with_capacity(tabulation.tables.len());
    for (name, table) in &tabulation.tables {
        let path = dir.join(format!("{name}.csv"));
        fs::write(&path, table_csv(table)?).map_err(io_error(&path))?;
        written.push(path);
    }
    Ok(written)
}

/// Write every table as `<table>.csv` into one deflated zip archive.
pub fn write_tables_zip(tabulation: &Tabulation, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, table) in &tabulation.tables {
        zip.start_file(format!("{name}.csv"), options)?;
        zip.write_all(&table_csv(table)?).map_err(io_error(path))?;
    }
    zip.finish()?;
    Ok(())
}

/// Write the push report as CSV with header
/// `category,status,name,orig_name,code,message`.
pub fn write_report_csv(
    report: &PushReport,
    path: &Path,
    filter: Option<OutcomeKind>,
) -> Result<usize, ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    let rows = report.rows(filter);
    if rows.is_empty() {
        writer.write_record(["category", "status", "name", "orig_name", "code", "message"])?;
    }
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(io_error(path))?;
    Ok(rows.len())
}
