//! CSV data source.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::sources::DataSource;

/// Options for CSV parsing
///
/// Fields are always double-quoted and trimmed of surrounding whitespace.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

/// CSV file data source
pub struct CsvSource {
    /// Path to the CSV file
    path: String,
    /// Parsing options
    options: CsvOptions,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Create a new CSV source with custom options
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();

        if !path.as_ref().exists() {
            return Err(DataError::FileNotFound(path_str));
        }

        Ok(Self {
            path: path_str,
            options,
        })
    }
}

impl DataSource for CsvSource {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let file = File::open(&self.path).map_err(DataError::Io)?;
        let reader = BufReader::new(file);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(false) // We handle headers ourselves
            .trim(csv::Trim::All)
            // Row width is validated when records are assembled
            .flexible(true)
            .from_reader(reader);

        let mut result = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            result.push(row);
        }

        // Spreadsheet exports often start with a UTF-8 byte order mark
        if let Some(first) = result.first_mut().and_then(|row| row.first_mut()) {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.trim().to_string();
            }
        }

        Ok(result)
    }

    fn path(&self) -> &str {
        &self.path
    }
}
