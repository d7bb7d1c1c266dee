//! genassign CLI - Command-line interface library
//!
//! This library provides the CLI functionality for genassign: load a LaTeX
//! template and a worksheet, then build one solutions PDF (and optionally
//! one question paper) per worksheet row.
//!
//! # Library Usage
//!
//! ```ignore
//! use genassign_cli::{generate_command, load_settings, Cli, RunOptions};
//!
//! let settings = load_settings(None)?;
//! let options = RunOptions::resolve(&cli, &settings);
//! let summary = generate_command(&options, &settings)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Moodle roster: solutions and question paper per student
//! genassign assignment.tex grades.csv -t "HW1_"
//!
//! # Encrypted solutions only
//! genassign assignment.tex grades.csv -b -e
//!
//! # Mail merge into ./letters/7_Bob.pdf
//! genassign letter.tex people.csv -g -t "#1_#2" -f . -r letters
//! ```

pub mod app;
pub mod config;

// Re-export main entry point and types
pub use app::{generate_command, normalize_input, run_cli, Cli, RunOptions};
pub use config::{load_settings, Settings};
