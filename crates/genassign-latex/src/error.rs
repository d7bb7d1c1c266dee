//! Error types for compilation and placement

use std::io;
use std::path::PathBuf;

use genassign_core::{MaskError, TemplateError};
use thiserror::Error;

/// Result type for per-record jobs
pub type Result<T> = std::result::Result<T, JobError>;

/// Which toolchain pass ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// `pdflatex`
    Typeset,
    /// `pythontex`
    Computation,
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::Typeset => f.write_str("typesetting"),
            Pass::Computation => f.write_str("computation"),
        }
    }
}

/// Errors from the external LaTeX toolchain
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// The program could not be started (usually not installed)
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// `pdflatex` exited unsuccessfully
    #[error("Typesetting pass failed (exit code {code:?})")]
    TypesetFailed { code: Option<i32> },

    /// `pythontex` exited unsuccessfully
    #[error("Computation pass failed (exit code {code:?})")]
    ComputationFailed { code: Option<i32> },
}

impl ToolchainError {
    /// Failure for a pass that ran and exited with `code`
    pub fn failed(pass: Pass, code: Option<i32>) -> Self {
        match pass {
            Pass::Typeset => ToolchainError::TypesetFailed { code },
            Pass::Computation => ToolchainError::ComputationFailed { code },
        }
    }
}

/// Errors while moving a compiled PDF into the output tree
#[derive(Error, Debug)]
pub enum PlacementError {
    /// The compiler did not produce the expected PDF
    #[error("Compiled PDF not found: {0}")]
    MissingArtifact(PathBuf),

    /// Insufficient permissions on the output tree
    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Something that is not a folder occupies the destination
    #[error("Destination is occupied by a non-directory: {0}")]
    DestinationConflict(PathBuf),

    /// The encryption tool failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Any other filesystem failure
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PlacementError {
    /// Classify an I/O failure at `path`
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => PlacementError::PermissionDenied { path, source },
            _ => PlacementError::Io { path, source },
        }
    }

    /// Failures that affect one record only; the run carries on after them
    pub fn is_expected(&self) -> bool {
        !matches!(self, PlacementError::Io { .. })
    }
}

/// Everything that can go wrong while processing one record
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Scratch directory or working document could not be handled
    #[error("Scratch directory error: {0}")]
    Scratch(#[from] io::Error),
}

impl JobError {
    /// Whether the whole run must stop rather than skip to the next record
    pub fn is_fatal(&self) -> bool {
        match self {
            JobError::Toolchain(ToolchainError::Spawn { .. }) => true,
            JobError::Toolchain(_) => false,
            JobError::Placement(e) => !e.is_expected(),
            JobError::Template(_) | JobError::Mask(_) | JobError::Scratch(_) => true,
        }
    }
}
