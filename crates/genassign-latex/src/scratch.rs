//! Per-record scratch directories.
//!
//! Every record is rendered and compiled in its own hidden directory below
//! the working directory. The rendered `.tex`, the LaTeX byproducts
//! (`.aux`, `.log`, `.synctex.gz`, ...), the `comment` package's
//! `comment.cut` and PythonTeX's `pythontex-files-*` folder all live there,
//! so nothing leaks from one record into the next and dropping the directory
//! is the whole cleanup.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Prefix of every scratch directory name
pub const SCRATCH_PREFIX: &str = ".genassign-";

/// One record's isolated compile area
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
    basename: String,
}

impl Scratch {
    /// Create a fresh scratch directory inside `parent`
    pub fn new_in(parent: impl AsRef<Path>) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)?;

        let basename = dir
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.trim_start_matches('.').to_string())
            .unwrap_or_else(|| "genassign".to_string());

        debug!(dir = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir, basename })
    }

    /// Directory the toolchain runs in
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Basename shared by the document and its byproducts
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Rendered document, `<scratch>/<basename>.tex`
    pub fn tex_path(&self) -> PathBuf {
        self.path().join(format!("{}.tex", self.basename))
    }

    /// PDF produced by the toolchain, `<scratch>/<basename>.pdf`
    pub fn pdf_path(&self) -> PathBuf {
        self.path().join(format!("{}.pdf", self.basename))
    }

    /// Remove the directory, reporting failures instead of ignoring them
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => Ok(()),
            Err(err) if path.exists() => {
                debug!(dir = %path.display(), %err, "Retrying scratch removal");
                remove_dir_all_forced(&path)
            }
            Err(err) => Err(err),
        }
    }
}

/// Remove a directory tree, clearing read-only flags if removal is refused
pub fn remove_dir_all_forced(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            warn!(path = %path.display(), "Clearing read-only flags before removal");
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                let mut permissions = entry.metadata()?.permissions();
                if permissions.readonly() {
                    #[allow(clippy::permissions_set_readonly_false)]
                    permissions.set_readonly(false);
                    fs::set_permissions(entry.path(), permissions)?;
                }
            }
            fs::remove_dir_all(path)
        }
        Err(err) => Err(err),
    }
}

const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// `TEXINPUTS` value that searches `dirs` before the default search path
///
/// Any existing `TEXINPUTS` is kept after `dirs`. An empty trailing entry
/// tells kpathsea to append the system default.
pub fn texinputs_with(dirs: &[PathBuf], existing: Option<OsString>) -> OsString {
    let mut value = OsString::new();
    for dir in dirs {
        value.push(dir.as_os_str());
        value.push(PATH_SEPARATOR);
    }
    if let Some(existing) = existing {
        value.push(existing);
    }
    value
}

/// `PYTHONPATH` value that imports from `dirs` first
///
/// Unlike `TEXINPUTS` there is no trailing separator, since an empty
/// entry would put the scratch directory on the import path.
pub fn pythonpath_with(dirs: &[PathBuf], existing: Option<OsString>) -> OsString {
    let mut value = OsString::new();
    let existing = existing.filter(|e| !e.is_empty());
    for entry in dirs.iter().map(|d| d.as_os_str()).chain(existing.as_deref()) {
        if !value.is_empty() {
            value.push(PATH_SEPARATOR);
        }
        value.push(entry);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_paths() {
        let parent = TempDir::new().unwrap();
        let scratch = Scratch::new_in(parent.path()).unwrap();

        assert!(scratch.path().starts_with(parent.path()));
        assert!(scratch.basename().starts_with("genassign-"));
        assert_eq!(
            scratch.tex_path().file_name().unwrap().to_str().unwrap(),
            format!("{}.tex", scratch.basename())
        );
        assert_eq!(scratch.pdf_path().extension().unwrap(), "pdf");
    }

    #[test]
    fn test_scratch_close_removes_everything() {
        let parent = TempDir::new().unwrap();
        let scratch = Scratch::new_in(parent.path()).unwrap();
        let path = scratch.path().to_path_buf();

        let pythontex = path.join(format!("pythontex-files-{}", scratch.basename()));
        fs::create_dir(&pythontex).unwrap();
        fs::write(pythontex.join("py_default.out"), "x").unwrap();
        fs::write(path.join("comment.cut"), "x").unwrap();
        fs::write(scratch.tex_path(), "x").unwrap();

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_dropped_on_scope_exit() {
        let parent = TempDir::new().unwrap();
        let path = {
            let scratch = Scratch::new_in(parent.path()).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_directories_are_isolated() {
        let parent = TempDir::new().unwrap();
        let a = Scratch::new_in(parent.path()).unwrap();
        let b = Scratch::new_in(parent.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_ne!(a.basename(), b.basename());
    }

    #[test]
    fn test_remove_dir_all_forced_read_only_file() {
        let parent = TempDir::new().unwrap();
        let dir = parent.path().join("old");
        fs::create_dir(&dir).unwrap();
        let file = dir.join("locked.pdf");
        fs::write(&file, "x").unwrap();
        let mut permissions = fs::metadata(&file).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&file, permissions).unwrap();

        remove_dir_all_forced(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_texinputs_with() {
        let value = texinputs_with(&[PathBuf::from("/work/tmpl")], None);
        let expected = if cfg!(windows) { "/work/tmpl;" } else { "/work/tmpl:" };
        assert_eq!(value, OsString::from(expected));

        if !cfg!(windows) {
            let dirs = [PathBuf::from("/a"), PathBuf::from("/cwd")];
            let value = texinputs_with(&dirs, Some(OsString::from("/b:")));
            assert_eq!(value, OsString::from("/a:/cwd:/b:"));
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_pythonpath_with() {
        let dirs = [PathBuf::from("/work/tmpl"), PathBuf::from("/work")];
        assert_eq!(pythonpath_with(&dirs, None), OsString::from("/work/tmpl:/work"));
        assert_eq!(
            pythonpath_with(&dirs, Some(OsString::new())),
            OsString::from("/work/tmpl:/work")
        );
        assert_eq!(
            pythonpath_with(&dirs, Some(OsString::from("/site"))),
            OsString::from("/work/tmpl:/work:/site")
        );
    }
}
