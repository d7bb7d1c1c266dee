//! genassign-core - Individualized documents from one template
//!
//! Core library for genassign, providing the text-level building blocks of
//! the generation pipeline:
//!
//! - [`Template`]: Jinja rendering with `\VAR{name}` / `\BLOCK{...}` delimiters
//! - [`Mask`]: `#d` positional naming masks for files and folders
//! - [`Naming`]: roster and generic file/folder naming
//! - [`visibility`]: the `\hiddenfalse` / `\hiddentrue` solution toggle
//! - [`RecordSet`]: keys and value rows shared by all of the above
//!
//! # Example
//!
//! ```
//! use genassign_core::{Mask, Template};
//!
//! let keys = ["MoodleID", "FullName", "StudentID"];
//! let values = ["5", "Ann Lee", "S100"];
//!
//! let template = Template::new(r"Name: \VAR{FullName}");
//! assert_eq!(template.render(&keys, &values).unwrap(), "Name: Ann Lee");
//!
//! let mask = Mask::new("#2_#3_sols");
//! assert_eq!(mask.expand(&values).unwrap(), "Ann Lee_S100_sols");
//! ```

pub mod error;
pub mod mask;
pub mod naming;
pub mod record;
pub mod template;
pub mod visibility;

// Re-export main types and functions
pub use error::{MaskError, RecordError, TemplateError};
pub use mask::{expand, Mask};
pub use naming::Naming;
pub use record::{is_identifier_safe, Record, RecordSet};
pub use template::Template;
pub use visibility::{set_hidden, toggle_text, visibility_of, Visibility};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
