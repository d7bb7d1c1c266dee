//! Data source implementations.
//!
//! This module contains adapters for the worksheet formats genassign reads
//! (CSV/TSV and Excel).

pub mod csv;
pub mod excel;

pub use csv::{CsvOptions, CsvSource};
pub use excel::ExcelSource;

use std::path::Path;

use crate::error::Result;

/// Trait for data sources that can provide tabular data
pub trait DataSource {
    /// Read every row, header included, as strings
    fn read_all(&self) -> Result<Vec<Vec<String>>>;

    /// Path of the underlying file, for messages
    fn path(&self) -> &str;
}

/// Open the source matching the file extension
///
/// `.xlsx`/`.xlsm` are read with calamine, `.tsv` as tab-separated, anything
/// else as comma-separated.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn DataSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => Ok(Box::new(ExcelSource::new(path)?)),
        "tsv" => Ok(Box::new(CsvSource::with_options(path, CsvOptions::tsv())?)),
        _ => Ok(Box::new(CsvSource::new(path)?)),
    }
}
