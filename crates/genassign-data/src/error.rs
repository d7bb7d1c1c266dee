//! Error types for worksheet loading.

use genassign_core::RecordError;
use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading a worksheet
#[derive(Debug, Error)]
pub enum DataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to open workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Workbook has no readable sheet
    #[error("Workbook has no sheets: {0}")]
    EmptyWorkbook(String),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(String),

    /// Worksheet has no header row
    #[error("Worksheet is empty: {0}")]
    NoHeader(String),

    /// A roster column is absent from the header row
    #[error("Worksheet is missing required column '{0}'")]
    MissingColumn(String),

    /// Rows do not form valid records
    #[error(transparent)]
    Record(#[from] RecordError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Calamine error
    #[error("Excel error: {0}")]
    Calamine(String),
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Calamine(err.to_string())
    }
}

impl From<calamine::XlsxError> for DataError {
    fn from(err: calamine::XlsxError) -> Self {
        DataError::Calamine(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}
