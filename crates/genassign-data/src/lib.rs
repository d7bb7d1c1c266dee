//! # genassign-data
//!
//! Worksheet loading for genassign - read a Moodle grading worksheet or a
//! generic table and turn it into [`RecordSet`]s for the generator.
//!
//! ## Features
//!
//! - **CSV/TSV Support**: parsed with the `csv` crate, byte order mark aware
//! - **Excel Support**: first sheet of `.xlsx` files via `calamine`
//! - **Roster Mode**: `Identifier`, `Full name`, `ID number` mapped to
//!   `MoodleID`, `FullName`, `StudentID`
//! - **Generic Mode**: headers used verbatim as template keys
//!
//! ## Example
//!
//! ```rust,ignore
//! use genassign_data::{load, WorksheetMode};
//!
//! let records = load("students.csv", WorksheetMode::Roster)?;
//! for record in records.records() {
//!     println!("{}", record.label());
//! }
//! ```

pub mod error;
pub mod sources;
pub mod worksheet;

// Re-exports
pub use error::{DataError, Result};
pub use genassign_core::RecordSet;
pub use sources::{open_source, CsvOptions, CsvSource, DataSource, ExcelSource};
pub use worksheet::{load, load_generic, load_roster, WorksheetMode, ROSTER_KEYS};
