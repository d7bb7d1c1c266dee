//! Solution visibility toggle.
//!
//! Templates wrap solutions in a `hidden` environment from the `comment`
//! package and declare a TeX conditional in the preamble:
//!
//! ```latex
//! \usepackage{comment}
//! \newif\ifhidden
//! \hiddenfalse
//! \ifhidden
//!     \excludecomment{hidden}
//! \else
//!     \includecomment{hidden}
//! \fi
//! ```
//!
//! Whether the solutions are shown is therefore decided by a single literal
//! token in the document text. Toggling is a find-and-replace of that token.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Token that shows the hidden environment
pub const SHOWN_TOKEN: &str = r"\hiddenfalse";

/// Token that hides the hidden environment
pub const HIDDEN_TOKEN: &str = r"\hiddentrue";

/// Whether a document currently includes its solutions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `\hiddenfalse`: solutions are typeset
    Shown,
    /// `\hiddentrue`: solutions are excluded
    Hidden,
}

impl Visibility {
    pub fn from_hidden(hidden: bool) -> Self {
        if hidden {
            Visibility::Hidden
        } else {
            Visibility::Shown
        }
    }

    /// Literal token that encodes this state
    pub fn token(self) -> &'static str {
        match self {
            Visibility::Shown => SHOWN_TOKEN,
            Visibility::Hidden => HIDDEN_TOKEN,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Visibility::Shown => Visibility::Hidden,
            Visibility::Hidden => Visibility::Shown,
        }
    }
}

/// Rewrite `text` so that solutions are hidden (`true`) or shown (`false`)
pub fn toggle_text(text: &str, hidden: bool) -> String {
    let target = Visibility::from_hidden(hidden);
    text.replace(target.opposite().token(), target.token())
}

/// Current state of a document, or `None` if it carries neither token or both
pub fn visibility_of(text: &str) -> Option<Visibility> {
    match (text.contains(SHOWN_TOKEN), text.contains(HIDDEN_TOKEN)) {
        (true, false) => Some(Visibility::Shown),
        (false, true) => Some(Visibility::Hidden),
        _ => None,
    }
}

/// Path of the backup written by [`set_hidden`] (`doc.tex` -> `doc.tex.bak`)
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Toggle the document at `path` in place
///
/// The previous content is kept next to it as a `.bak` file. Returns whether
/// the document text changed.
pub fn set_hidden(path: impl AsRef<Path>, hidden: bool) -> io::Result<bool> {
    let path = path.as_ref();
    let original = fs::read_to_string(path)?;
    let updated = toggle_text(&original, hidden);

    fs::write(backup_path(path), &original)?;
    let changed = updated != original;
    if changed {
        fs::write(path, &updated)?;
    }

    debug!(
        path = %path.display(),
        hidden,
        changed,
        "Set solution visibility"
    );
    Ok(changed)
}
