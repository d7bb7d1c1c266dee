//! Output naming for the two operating modes.
//!
//! In roster mode the masks are derived from the user's title prefix and the
//! Moodle submission type, so the produced folders can be zipped and uploaded
//! back as feedback files:
//!
//! ```text
//! file   <file_mask>#2_#3<stem>                 Ann Lee_S100_sols.pdf
//! folder #2_#1_assignsubmission_<folder_mask>_  Ann Lee_5_assignsubmission_file_
//! ```
//!
//! In generic mode both masks are taken verbatim and only one variant (no
//! stem, no paper) is produced.

use crate::error::MaskError;
use crate::mask::Mask;

/// File and folder masks plus per-variant stems
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    file: Mask,
    folder: Mask,
    solutions_stem: String,
    paper_stem: Option<String>,
}

impl Naming {
    /// Moodle roster naming
    ///
    /// `paper_stem` is `None` when the question paper is not generated.
    pub fn roster(
        file_prefix: &str,
        submission_type: &str,
        solutions_stem: &str,
        paper_stem: Option<&str>,
    ) -> Self {
        Self {
            file: Mask::new(format!("{}#2_#3", file_prefix)),
            folder: Mask::new(format!("#2_#1_assignsubmission_{}_", submission_type)),
            solutions_stem: solutions_stem.to_string(),
            paper_stem: paper_stem.map(str::to_string),
        }
    }

    /// Mail-merge naming: masks used as given, a single output per record
    pub fn generic(file_mask: &str, folder_mask: &str) -> Self {
        Self {
            file: Mask::new(file_mask),
            folder: Mask::new(folder_mask),
            solutions_stem: String::new(),
            paper_stem: None,
        }
    }

    pub fn file_mask(&self) -> &Mask {
        &self.file
    }

    pub fn folder_mask(&self) -> &Mask {
        &self.folder
    }

    /// Whether a question paper (solutions hidden) is produced
    pub fn produces_paper(&self) -> bool {
        self.paper_stem.is_some()
    }

    /// Validate every mask against a record width
    pub fn check_arity(&self, width: usize) -> Result<(), MaskError> {
        self.file.check_arity(width)?;
        self.folder.check_arity(width)
    }

    /// File name (no extension) of the main / solutions PDF
    pub fn solutions_file<S: AsRef<str>>(&self, values: &[S]) -> Result<String, MaskError> {
        self.file.with_suffix(&self.solutions_stem).expand(values)
    }

    /// File name (no extension) of the question paper, if one is produced
    pub fn paper_file<S: AsRef<str>>(&self, values: &[S]) -> Result<Option<String>, MaskError> {
        self.paper_stem
            .as_deref()
            .map(|stem| self.file.with_suffix(stem).expand(values))
            .transpose()
    }

    /// Subfolder name shared by both variants
    pub fn folder<S: AsRef<str>>(&self, values: &[S]) -> Result<String, MaskError> {
        self.folder.expand(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [&str; 3] = ["5", "Ann Lee", "S100"];

    #[test]
    fn test_roster_naming() {
        let naming = Naming::roster("", "file", "_sols", Some("_paper"));

        assert_eq!(naming.solutions_file(&VALUES).unwrap(), "Ann Lee_S100_sols");
        assert_eq!(
            naming.paper_file(&VALUES).unwrap().as_deref(),
            Some("Ann Lee_S100_paper")
        );
        assert_eq!(
            naming.folder(&VALUES).unwrap(),
            "Ann Lee_5_assignsubmission_file_"
        );
    }

    #[test]
    fn test_roster_title_prefix() {
        let naming = Naming::roster("Test 1 ", "onlinetext", "_sols", None);
        assert_eq!(
            naming.solutions_file(&VALUES).unwrap(),
            "Test 1 Ann Lee_S100_sols"
        );
        assert_eq!(
            naming.folder(&VALUES).unwrap(),
            "Ann Lee_5_assignsubmission_onlinetext_"
        );
        assert!(!naming.produces_paper());
        assert_eq!(naming.paper_file(&VALUES).unwrap(), None);
    }

    #[test]
    fn test_generic_naming() {
        let naming = Naming::generic("#1_#2", ".");
        let values = ["7", "Bob"];

        assert_eq!(naming.solutions_file(&values).unwrap(), "7_Bob");
        assert_eq!(naming.folder(&values).unwrap(), ".");
        assert!(!naming.produces_paper());
    }

    #[test]
    fn test_check_arity() {
        let naming = Naming::generic("#1_#3", "#2");
        assert!(naming.check_arity(3).is_ok());
        assert_eq!(
            naming.check_arity(2),
            Err(MaskError::FieldOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn test_roster_prefix_with_reference() {
        // The title prefix may itself reference fields
        let naming = Naming::roster("#1-", "file", "", None);
        assert_eq!(naming.solutions_file(&VALUES).unwrap(), "5-Ann Lee_S100");
    }
}
