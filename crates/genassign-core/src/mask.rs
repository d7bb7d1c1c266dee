//! Positional naming masks.
//!
//! A mask is a plain string in which `#d` (`d` in `1..=9`) stands for the
//! `d`-th value of a record, 1-based. Masks name both the output PDF and the
//! folder it is placed in:
//!
//! ```text
//! mask    "#2_#1_assignsubmission_file_"
//! values  ["5", "Ann Lee", "S100"]
//! result  "Ann Lee_5_assignsubmission_file_"
//! ```
//!
//! `#0` is not a reference, and only a single digit is read, so `#12` is the
//! reference `#1` followed by a literal `2`.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::MaskError;

fn reference_re() -> &'static Regex {
    static REF_RE: OnceLock<Regex> = OnceLock::new();
    REF_RE.get_or_init(|| Regex::new(r"#([1-9])").unwrap())
}

/// A file or folder naming mask
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask(String);

impl Mask {
    /// Wrap a raw mask string
    pub fn new(mask: impl Into<String>) -> Self {
        Self(mask.into())
    }

    /// The raw mask text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append literal text (e.g. a `_sols` stem) to the mask
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }

    /// Distinct 1-based field indices referenced by the mask, ascending
    pub fn references(&self) -> Vec<usize> {
        reference_re()
            .captures_iter(&self.0)
            .filter_map(|caps| caps[1].parse::<usize>().ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Check that every reference fits a record of `len` values
    pub fn check_arity(&self, len: usize) -> Result<(), MaskError> {
        match self.references().into_iter().find(|&index| index > len) {
            Some(index) => Err(MaskError::FieldOutOfRange { index, len }),
            None => Ok(()),
        }
    }

    /// Substitute every reference with the matching value
    ///
    /// Substitution is a single pass, so a value that itself contains `#d`
    /// is inserted verbatim and never expanded again.
    pub fn expand<S: AsRef<str>>(&self, values: &[S]) -> Result<String, MaskError> {
        self.check_arity(values.len())?;

        let expanded = reference_re().replace_all(&self.0, |caps: &Captures| {
            // the capture is a single ASCII digit 1-9, already range-checked
            let index = usize::from(caps[1].as_bytes()[0] - b'0');
            values[index - 1].as_ref().to_string()
        });

        Ok(expanded.into_owned())
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mask {
    fn from(mask: &str) -> Self {
        Self::new(mask)
    }
}

impl From<String> for Mask {
    fn from(mask: String) -> Self {
        Self(mask)
    }
}

/// Expand `mask` against `values` in one call
pub fn expand<S: AsRef<str>>(values: &[S], mask: &str) -> Result<String, MaskError> {
    Mask::new(mask).expand(values)
}
