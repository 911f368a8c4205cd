// src/export/mod.rs

mod csv;
mod fs_utils;
mod json;

pub use self::csv::{CSV_HEADER, write_csv};
pub use self::json::write_json;
pub(crate) use fs_utils::ensure_writable;

use crate::errors::AppResult;
use crate::models::Record;
use crate::ui::messages::success;
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Shown instead of writing an empty file.
pub const NOTHING_TO_EXPORT: &str = "No estimates to download.";

/// Helper comune per messaggi di completamento export.
pub(crate) fn notify_export_success(label: &str, path: &Path, count: usize) {
    success(format!(
        "{label} export completed: {count} record(s) written to {}",
        path.display()
    ));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }
}

/// Write `records` (already in display order) to `path` in the given format.
pub fn export_to_file(records: &[Record], format: ExportFormat, path: &Path) -> AppResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(&mut out, records)?,
        ExportFormat::Json => write_json(&mut out, records)?,
    }
    out.flush()?;
    Ok(())
}
