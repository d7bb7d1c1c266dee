//! Error types for the core text operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while expanding a naming mask
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    /// A `#d` reference points past the end of the record
    #[error("Mask field #{index} is out of range for a record with {len} field(s)")]
    FieldOutOfRange {
        /// The 1-based index written in the mask
        index: usize,
        /// Number of values available
        len: usize,
    },
}

/// Errors raised while loading or rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file could not be read
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendered document could not be written
    #[error("Failed to write rendered document {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template does not parse
    #[error("Template syntax error: {0}")]
    Syntax(#[source] minijinja::Error),

    /// Rendering failed (undefined value in strict mode, bad filter call, ...)
    #[error("Failed to render template: {0}")]
    Render(#[source] minijinja::Error),

    /// Placeholder names a key the record does not have (strict mode only)
    #[error("Template placeholder \\VAR{{{0}}} has no matching worksheet column")]
    UnknownKey(String),
}

/// Errors raised while assembling records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Row width differs from the number of keys
    #[error("Row {row} has {found} value(s) but the worksheet has {expected} column(s)")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Key cannot be used as a template placeholder
    #[error("Column name '{0}' must be a single word without spaces, hyphens or underscores")]
    UnsafeKey(String),
}
