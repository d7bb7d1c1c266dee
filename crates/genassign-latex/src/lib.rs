//! genassign-latex - compiling and placing per-record documents
//!
//! This crate turns rendered templates into PDFs with an external
//! LaTeX + PythonTeX toolchain and files them into the output tree.
//!
//! # Pipeline
//!
//! For each record:
//!
//! 1. **Scratch** - a hidden per-record directory holds the `.tex` and every
//!    compiler byproduct
//! 2. **Toolchain** - `pdflatex`, `pythontex`, `pdflatex` for the solutions,
//!    then `pdflatex` twice with solutions hidden for the question paper
//! 3. **Placement** - each PDF is renamed, optionally encrypted with `qpdf`,
//!    and moved into `<root>/<folder>/<file>.pdf`
//!
//! # Example
//!
//! ```ignore
//! use genassign_core::{Naming, Template};
//! use genassign_latex::{run_batch, Driver, LatexToolchain};
//!
//! let driver = Driver::new(template, keys, Naming::generic("#1_#2", "."), LatexToolchain::default());
//! let summary = run_batch(&driver, records.records(), |_, _| {})?;
//! ```

mod batch;
mod driver;
mod encrypt;
mod error;
mod placement;
mod scratch;
mod toolchain;

pub use batch::{run_batch, RunSummary};
pub use driver::{Driver, RecordFailure, RecordOutput, Stage};
pub use encrypt::{PdfEncryptor, Permissions, QpdfEncryptor};
pub use error::{JobError, Pass, PlacementError, Result, ToolchainError};
pub use placement::{place, purge_root, Encryption, Placement};
pub use scratch::{pythonpath_with, texinputs_with, Scratch, SCRATCH_PREFIX};
pub use toolchain::{Job, LatexToolchain, Toolchain, ToolchainConfig};
