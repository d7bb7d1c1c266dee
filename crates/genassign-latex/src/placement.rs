//! Output placement.
//!
//! A compiled PDF ends up at `<root>/<folder>/<file>.pdf`. Placement is
//! idempotent per record: an existing `<root>/<folder>` is replaced, never
//! merged into, while `<root>` itself is only ever purged once per run by
//! [`purge_root`].

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::encrypt::{PdfEncryptor, Permissions};
use crate::error::PlacementError;
use crate::scratch::remove_dir_all_forced;

/// Where one artifact goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Output root (`solutions`, `questions`, ...)
    pub root: PathBuf,
    /// Per-record subfolder; empty or `.` places directly in the root
    pub folder: String,
    /// File name without the `.pdf` extension
    pub file: String,
}

impl Placement {
    /// Directory the PDF lands in
    pub fn target_dir(&self) -> PathBuf {
        if self.places_in_root() {
            self.root.clone()
        } else {
            self.root.join(&self.folder)
        }
    }

    /// Final path of the PDF
    pub fn destination(&self) -> PathBuf {
        self.target_dir().join(self.file_name())
    }

    fn file_name(&self) -> String {
        format!("{}.pdf", self.file)
    }

    fn places_in_root(&self) -> bool {
        matches!(self.folder.trim(), "" | ".")
    }
}

/// Owner password, permissions and tool used to lock produced PDFs
pub struct Encryption<'a> {
    pub encryptor: &'a dyn PdfEncryptor,
    pub owner_password: String,
    pub permissions: Permissions,
}

/// Move `artifact` into place, encrypting it on the way if requested
///
/// `tag` makes the aside name of a replaced folder unique
/// (`<folder>_<tag>`); the scratch basename is used.
pub fn place(
    artifact: &Path,
    placement: &Placement,
    encryption: Option<&Encryption<'_>>,
    tag: &str,
) -> Result<PathBuf, PlacementError> {
    if !artifact.is_file() {
        return Err(PlacementError::MissingArtifact(artifact.to_path_buf()));
    }

    // Rename next to the compiled output
    let renamed = artifact.with_file_name(placement.file_name());
    if renamed != artifact {
        if renamed.is_file() {
            fs::remove_file(&renamed).map_err(|e| PlacementError::from_io(&renamed, e))?;
        }
        fs::rename(artifact, &renamed).map_err(|e| PlacementError::from_io(&renamed, e))?;
    }

    if let Some(encryption) = encryption {
        encryption.encryptor.encrypt(
            &renamed,
            &encryption.owner_password,
            &encryption.permissions,
        )?;
    }

    fs::create_dir_all(&placement.root)
        .map_err(|e| PlacementError::from_io(&placement.root, e))?;

    let target_dir = placement.target_dir();
    if !placement.places_in_root() {
        replace_dir(&target_dir, tag)?;
    }

    let destination = target_dir.join(placement.file_name());
    if destination.is_dir() {
        return Err(PlacementError::DestinationConflict(destination));
    }
    if destination.is_file() {
        fs::remove_file(&destination).map_err(|e| PlacementError::from_io(&destination, e))?;
    }
    move_file(&renamed, &destination)?;

    debug!(destination = %destination.display(), "Placed PDF");
    Ok(destination)
}

/// Make `dir` an empty directory, discarding a previous one of the same name
fn replace_dir(dir: &Path, tag: &str) -> Result<(), PlacementError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PlacementError::DestinationConflict(dir.to_path_buf()));
        }

        let mut aside_name = dir.file_name().unwrap_or_default().to_os_string();
        aside_name.push(format!("_{}", tag));
        let aside = dir.with_file_name(aside_name);

        if aside.exists() {
            remove_dir_all_forced(&aside).map_err(|e| PlacementError::from_io(&aside, e))?;
        }
        fs::rename(dir, &aside).map_err(|e| PlacementError::from_io(dir, e))?;
        remove_dir_all_forced(&aside).map_err(|e| PlacementError::from_io(&aside, e))?;
        debug!(dir = %dir.display(), "Replaced existing output folder");
    }

    fs::create_dir_all(dir).map_err(|e| PlacementError::from_io(dir, e))
}

/// Rename, falling back to copy + remove across filesystems
fn move_file(from: &Path, to: &Path) -> Result<(), PlacementError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| PlacementError::from_io(to, e))?;
    fs::remove_file(from).map_err(|e| PlacementError::from_io(from, e))
}

/// Empty an output root at the start of a run
///
/// A root that resolves to the working directory (or one of its ancestors)
/// is left alone; wiping it would delete the template and worksheet.
pub fn purge_root(root: &Path) -> io::Result<()> {
    if !root.exists() {
        return Ok(());
    }

    let resolved = root.canonicalize()?;
    let cwd = env::current_dir()?.canonicalize()?;
    if cwd.starts_with(&resolved) {
        warn!(root = %root.display(), "Not purging output root: it contains the working directory");
        return Ok(());
    }

    info!(root = %root.display(), "Purging output root");
    remove_dir_all_forced(root)
}
