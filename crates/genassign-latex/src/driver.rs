//! Per-record compilation
//!
//! For every record the driver renders the template into a fresh scratch
//! directory, builds the solutions variant (`latex`, `pythontex`, `latex`),
//! optionally builds the question paper (`latex` twice with solutions
//! hidden), and places each PDF into its output root.

use std::path::PathBuf;

use genassign_core::{set_hidden, Naming, Record, Template};
use tracing::{debug, info, warn};

use crate::error::{JobError, Result};
use crate::placement::{place, Encryption, Placement};
use crate::scratch::Scratch;
use crate::toolchain::{Job, Toolchain};

/// How far a record got
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Nothing done yet
    Pending,
    /// Document written to the scratch directory
    Rendered,
    /// Solutions PDF built and placed
    SolutionsCompiled,
    /// Question paper built and placed
    PaperCompiled,
    /// Scratch directory removed
    Cleaned,
}

/// PDFs produced for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutput {
    pub solutions: PathBuf,
    pub paper: Option<PathBuf>,
    pub stage: Stage,
}

/// A record that could not be completed
#[derive(Debug)]
pub struct RecordFailure {
    pub stage: Stage,
    pub error: JobError,
}

impl std::fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (after stage {:?})", self.error, self.stage)
    }
}

/// Names resolved for one record before anything touches the disk
struct Targets {
    folder: String,
    solutions_file: String,
    paper_file: Option<String>,
}

/// Renders and compiles records one at a time
pub struct Driver<'a, T: Toolchain> {
    template: Template,
    keys: Vec<String>,
    naming: Naming,
    toolchain: T,
    encryption: Option<Encryption<'a>>,
    solutions_root: PathBuf,
    questions_root: PathBuf,
    scratch_parent: PathBuf,
    search_dirs: Vec<PathBuf>,
}

impl<'a, T: Toolchain> Driver<'a, T> {
    /// Driver writing into `solutions` / `questions` below the working
    /// directory, with scratch directories in the working directory
    pub fn new(template: Template, keys: Vec<String>, naming: Naming, toolchain: T) -> Self {
        Self {
            template,
            keys,
            naming,
            toolchain,
            encryption: None,
            solutions_root: PathBuf::from("solutions"),
            questions_root: PathBuf::from("questions"),
            scratch_parent: PathBuf::from("."),
            search_dirs: Vec::new(),
        }
    }

    pub fn with_roots(mut self, solutions: impl Into<PathBuf>, questions: impl Into<PathBuf>) -> Self {
        self.solutions_root = solutions.into();
        self.questions_root = questions.into();
        self
    }

    pub fn with_encryption(mut self, encryption: Encryption<'a>) -> Self {
        self.encryption = Some(encryption);
        self
    }

    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = parent.into();
        self
    }

    /// Add a directory searched by `\input`, `\includegraphics` and Python
    /// imports before the defaults
    ///
    /// Directories are searched in the order they were added; the template's
    /// own directory normally comes first, then the launch directory.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Build every variant of one record
    ///
    /// The scratch directory is removed whatever the outcome.
    pub fn process(&self, record: &Record) -> std::result::Result<RecordOutput, RecordFailure> {
        let mut stage = Stage::Pending;
        self.try_process(record, &mut stage)
            .map_err(|error| RecordFailure { stage, error })
    }

    fn try_process(&self, record: &Record, stage: &mut Stage) -> Result<RecordOutput> {
        let targets = self.targets(record)?;

        let scratch = Scratch::new_in(&self.scratch_parent)?;
        let outcome = self.compile(&scratch, record, &targets, stage);

        if let Err(err) = scratch.close() {
            warn!(record = record.index, %err, "Failed to remove scratch directory");
        }

        let (solutions, paper) = outcome?;
        *stage = Stage::Cleaned;
        Ok(RecordOutput {
            solutions,
            paper,
            stage: *stage,
        })
    }

    fn targets(&self, record: &Record) -> std::result::Result<Targets, JobError> {
        Ok(Targets {
            folder: self.naming.folder(&record.values)?,
            solutions_file: self.naming.solutions_file(&record.values)?,
            paper_file: self.naming.paper_file(&record.values)?,
        })
    }

    fn compile(
        &self,
        scratch: &Scratch,
        record: &Record,
        targets: &Targets,
        stage: &mut Stage,
    ) -> Result<(PathBuf, Option<PathBuf>)> {
        let tex = scratch.tex_path();
        self.template
            .render_to_file(&self.keys, &record.values, &tex)?;
        *stage = Stage::Rendered;
        debug!(record = record.index, path = %tex.display(), "Rendered document");

        let job = Job::for_scratch(scratch, &self.search_dirs);

        set_hidden(&tex, false)?;
        self.toolchain.typeset(&job)?;
        self.toolchain.compute(&job)?;
        self.toolchain.typeset(&job)?;

        let solutions = place(
            &job.pdf_path(),
            &Placement {
                root: self.solutions_root.clone(),
                folder: targets.folder.clone(),
                file: targets.solutions_file.clone(),
            },
            self.encryption.as_ref(),
            scratch.basename(),
        )?;
        *stage = Stage::SolutionsCompiled;
        info!(record = record.index, path = %solutions.display(), "Solutions compiled");

        let Some(paper_file) = &targets.paper_file else {
            return Ok((solutions, None));
        };

        set_hidden(&tex, true)?;
        self.toolchain.typeset(&job)?;
        self.toolchain.typeset(&job)?;

        let paper = place(
            &job.pdf_path(),
            &Placement {
                root: self.questions_root.clone(),
                folder: targets.folder.clone(),
                file: paper_file.clone(),
            },
            self.encryption.as_ref(),
            scratch.basename(),
        )?;
        *stage = Stage::PaperCompiled;
        info!(record = record.index, path = %paper.display(), "Question paper compiled");

        Ok((solutions, Some(paper)))
    }
}
