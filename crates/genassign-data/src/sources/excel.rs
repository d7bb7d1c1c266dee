//! Excel/XLSX data source using calamine.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};

use crate::error::{DataError, Result};
use crate::sources::DataSource;

/// Excel workbook data source
///
/// Worksheets exported from a gradebook hold a single sheet, so the first
/// sheet's used range is read.
pub struct ExcelSource {
    /// Path to the Excel file
    path: String,
    /// First sheet in workbook order
    sheet: Option<String>,
}

impl ExcelSource {
    /// Create a new Excel source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();

        if !path.as_ref().exists() {
            return Err(DataError::FileNotFound(path_str));
        }

        let workbook: Xlsx<_> = open_workbook(path.as_ref())
            .map_err(|e: XlsxError| DataError::WorkbookOpen(e.to_string()))?;

        let sheet = workbook.sheet_names().first().cloned();

        Ok(Self {
            path: path_str,
            sheet,
        })
    }

    /// Convert a calamine cell to a string
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                // Student numbers come back as floats
                if f.fract() == 0.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => b.to_string(),
            Data::Error(e) => format!("#ERROR: {:?}", e),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
        }
    }
}

impl DataSource for ExcelSource {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let sheet = self
            .sheet
            .as_deref()
            .ok_or_else(|| DataError::EmptyWorkbook(self.path.clone()))?;

        // Re-open workbook for reading (calamine requires this pattern)
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", self.path, e)))?;

        let range = workbook.worksheet_range(sheet)?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(Self::cell_to_string).collect())
            .collect())
    }

    fn path(&self) -> &str {
        &self.path
    }
}
