//! PDF encryption
//!
//! Produced PDFs can be locked against editing while remaining openable
//! without a password: an owner password only, AES-256, and a fixed set of
//! permissions. The encryption itself is delegated to `qpdf`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{PlacementError, ToolchainError};
use crate::toolchain::version_of;

/// What a reader of an encrypted PDF may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub accessibility: bool,
    pub extract: bool,
    pub modify_annotation: bool,
    pub modify_assembly: bool,
    pub modify_form: bool,
    pub modify_other: bool,
    pub print_lowres: bool,
    pub print_highres: bool,
}

impl Permissions {
    /// Read and print only: no extraction and no modification of any kind
    pub fn restricted() -> Self {
        Self {
            accessibility: true,
            extract: false,
            modify_annotation: false,
            modify_assembly: false,
            modify_form: false,
            modify_other: false,
            print_lowres: true,
            print_highres: true,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::restricted()
    }
}

/// Encrypts a PDF file in place
pub trait PdfEncryptor {
    fn encrypt(
        &self,
        path: &Path,
        owner_password: &str,
        permissions: &Permissions,
    ) -> Result<(), PlacementError>;
}

/// `qpdf --encrypt` wrapper
#[derive(Debug, Clone)]
pub struct QpdfEncryptor {
    program: String,
}

impl Default for QpdfEncryptor {
    fn default() -> Self {
        Self::new("qpdf")
    }
}

impl QpdfEncryptor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that `qpdf` can be launched, before any output is touched
    pub fn check_installed(&self) -> Result<(), ToolchainError> {
        let version = version_of(&self.program)?;
        debug!(program = %self.program, %version, "Found encryption program");
        Ok(())
    }

    /// Command-line arguments for encrypting `input` into `output`
    pub fn arguments(
        input: &Path,
        output: &Path,
        owner_password: &str,
        permissions: &Permissions,
    ) -> Vec<OsString> {
        let flag = |name: &str, allowed: bool| {
            OsString::from(format!("--{}={}", name, if allowed { "y" } else { "n" }))
        };
        let print = match (permissions.print_highres, permissions.print_lowres) {
            (true, _) => "full",
            (false, true) => "low",
            (false, false) => "none",
        };

        vec![
            OsString::from("--encrypt"),
            // empty user password: anyone can open the file
            OsString::new(),
            OsString::from(owner_password),
            OsString::from("256"),
            flag("accessibility", permissions.accessibility),
            flag("extract", permissions.extract),
            flag("annotate", permissions.modify_annotation),
            flag("assemble", permissions.modify_assembly),
            flag("form", permissions.modify_form),
            flag("modify-other", permissions.modify_other),
            OsString::from(format!("--print={}", print)),
            OsString::from("--"),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ]
    }
}

impl PdfEncryptor for QpdfEncryptor {
    fn encrypt(
        &self,
        path: &Path,
        owner_password: &str,
        permissions: &Permissions,
    ) -> Result<(), PlacementError> {
        let mut staged = path.as_os_str().to_owned();
        staged.push(".encrypting");
        let staged = PathBuf::from(staged);

        let output = Command::new(&self.program)
            .args(Self::arguments(path, &staged, owner_password, permissions))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PlacementError::Encryption(format!("{}: {}", self.program, e)))?;

        // qpdf exits 3 when it succeeded with warnings
        if !output.status.success() && output.status.code() != Some(3) {
            let _ = fs::remove_file(&staged);
            return Err(PlacementError::Encryption(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        fs::rename(&staged, path).map_err(|e| PlacementError::from_io(path, e))?;
        debug!(path = %path.display(), "Encrypted PDF");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(perms: &Permissions) -> Vec<String> {
        QpdfEncryptor::arguments(Path::new("in.pdf"), Path::new("out.pdf"), "s3cret", perms)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_restricted_profile_arguments() {
        let args = args_as_strings(&Permissions::restricted());
        assert_eq!(
            args,
            vec![
                "--encrypt",
                "",
                "s3cret",
                "256",
                "--accessibility=y",
                "--extract=n",
                "--annotate=n",
                "--assemble=n",
                "--form=n",
                "--modify-other=n",
                "--print=full",
                "--",
                "in.pdf",
                "out.pdf",
            ]
        );
    }

    #[test]
    fn test_print_levels() {
        let mut perms = Permissions::restricted();
        perms.print_highres = false;
        assert!(args_as_strings(&perms).contains(&"--print=low".to_string()));

        perms.print_lowres = false;
        assert!(args_as_strings(&perms).contains(&"--print=none".to_string()));
    }

    #[test]
    fn test_missing_qpdf() {
        let dir = tempfile::TempDir::new().unwrap();
        let pdf = dir.path().join("a.pdf");
        fs::write(&pdf, "%PDF-1.5\n").unwrap();

        let encryptor = QpdfEncryptor::new("genassign-no-such-qpdf");
        let result = encryptor.encrypt(&pdf, "pw", &Permissions::restricted());
        assert!(matches!(result, Err(PlacementError::Encryption(_))));
        // the original is left untouched
        assert_eq!(fs::read_to_string(&pdf).unwrap(), "%PDF-1.5\n");
    }

    #[test]
    fn test_missing_qpdf_fails_installation_check() {
        let encryptor = QpdfEncryptor::new("genassign-no-such-qpdf");
        match encryptor.check_installed() {
            Err(ToolchainError::Spawn { program, .. }) => {
                assert_eq!(program, "genassign-no-such-qpdf")
            }
            other => panic!("expected Spawn error, got {:?}", other),
        }
    }
}
