//! Worksheet shapes: Moodle roster and generic mail-merge.

use std::path::Path;

use genassign_core::RecordSet;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::open_source;

/// Roster column holding the Moodle participant identifier
pub const IDENTIFIER_COLUMN: &str = "Identifier";
/// Roster column holding the student's full name
pub const FULL_NAME_COLUMN: &str = "Full name";
/// Roster column holding the student number
pub const ID_NUMBER_COLUMN: &str = "ID number";

/// Literal prefix Moodle puts in front of every participant identifier
pub const PARTICIPANT_PREFIX: &str = "Participant ";

/// Template keys of a roster record, in field order (`#1`, `#2`, `#3`)
pub const ROSTER_KEYS: [&str; 3] = ["MoodleID", "FullName", "StudentID"];

/// How a worksheet is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorksheetMode {
    /// Moodle grading worksheet with fixed columns
    #[default]
    Roster,
    /// Any table whose headers are the template keys
    Generic,
}

/// Load a worksheet file in the given mode
pub fn load(path: impl AsRef<Path>, mode: WorksheetMode) -> Result<RecordSet> {
    let source = open_source(path)?;
    let rows = source.read_all()?;
    debug!(path = source.path(), rows = rows.len(), ?mode, "Read worksheet");

    match mode {
        WorksheetMode::Roster => roster_from_rows(rows),
        WorksheetMode::Generic => generic_from_rows(rows),
    }
}

/// Load a Moodle grading worksheet
pub fn load_roster(path: impl AsRef<Path>) -> Result<RecordSet> {
    load(path, WorksheetMode::Roster)
}

/// Load a generic mail-merge worksheet
pub fn load_generic(path: impl AsRef<Path>) -> Result<RecordSet> {
    load(path, WorksheetMode::Generic)
}

/// Build roster records from raw rows (header first)
///
/// Only the three roster columns are kept, in key order. Other gradebook
/// columns (email, status, grade, ...) are ignored.
pub fn roster_from_rows(rows: Vec<Vec<String>>) -> Result<RecordSet> {
    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| DataError::NoHeader("roster".to_string()))?;

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let identifier = column(IDENTIFIER_COLUMN)?;
    let full_name = column(FULL_NAME_COLUMN)?;
    let id_number = column(ID_NUMBER_COLUMN)?;

    let records = rows
        .map(|row| {
            let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
            let moodle_id = cell(identifier);
            let moodle_id = moodle_id
                .strip_prefix(PARTICIPANT_PREFIX)
                .map(str::to_string)
                .unwrap_or(moodle_id);
            vec![moodle_id, cell(full_name), cell(id_number)]
        })
        .collect();

    let keys = ROSTER_KEYS.iter().map(|k| k.to_string()).collect();
    Ok(RecordSet::new(keys, records)?)
}

/// Build generic records from raw rows (header first)
///
/// Headers become template keys verbatim, so they must be identifier-safe.
pub fn generic_from_rows(rows: Vec<Vec<String>>) -> Result<RecordSet> {
    let mut rows = rows.into_iter();
    let keys = rows
        .next()
        .ok_or_else(|| DataError::NoHeader("generic".to_string()))?;

    Ok(RecordSet::with_safe_keys(keys, rows.collect())?)
}
