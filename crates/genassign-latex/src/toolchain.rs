//! External LaTeX/PythonTeX toolchain
//!
//! The driver never spawns processes itself; it asks a [`Toolchain`] for a
//! typesetting pass or a computation pass over a [`Job`].

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{Pass, ToolchainError};
use crate::scratch::{pythonpath_with, texinputs_with, Scratch};

/// Number of trailing log lines reported when a pass fails
const FAILURE_TAIL_LINES: usize = 20;

/// A document ready to be compiled
#[derive(Debug, Clone)]
pub struct Job {
    /// Directory the passes run in
    pub workdir: PathBuf,
    /// Document basename without extension
    pub basename: String,
    /// Directories searched first for `\input`, graphics and Python
    /// modules, in order
    pub search_dirs: Vec<PathBuf>,
}

impl Job {
    pub fn for_scratch(scratch: &Scratch, search_dirs: &[PathBuf]) -> Self {
        Self {
            workdir: scratch.path().to_path_buf(),
            basename: scratch.basename().to_string(),
            search_dirs: search_dirs.to_vec(),
        }
    }

    /// The `.tex` file name as passed to the tools
    pub fn tex_file(&self) -> String {
        format!("{}.tex", self.basename)
    }

    /// The PDF the typesetting pass writes
    pub fn pdf_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.pdf", self.basename))
    }
}

/// Typesetting and computation passes over a job
pub trait Toolchain {
    /// One `pdflatex` run
    fn typeset(&self, job: &Job) -> Result<(), ToolchainError>;

    /// One `pythontex` run, which executes the embedded Python code
    fn compute(&self, job: &Job) -> Result<(), ToolchainError>;
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn typeset(&self, job: &Job) -> Result<(), ToolchainError> {
        (**self).typeset(job)
    }

    fn compute(&self, job: &Job) -> Result<(), ToolchainError> {
        (**self).compute(job)
    }
}

/// Programs and flags of the real toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    pub latex: String,
    pub latex_args: Vec<String>,
    pub pythontex: String,
    /// Treat a non-zero exit status as success (pdflatex in nonstopmode
    /// often exits 1 after recoverable errors while still writing a PDF)
    pub ignore_exit_status: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            latex: "pdflatex".to_string(),
            latex_args: vec![
                "-shell-escape".to_string(),
                "-synctex=1".to_string(),
                "-interaction=nonstopmode".to_string(),
            ],
            pythontex: "pythontex".to_string(),
            ignore_exit_status: false,
        }
    }
}

/// First line `program --version` prints, or the launch error
pub(crate) fn version_of(program: &str) -> Result<String, ToolchainError> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ToolchainError::Spawn {
            program: program.to_string(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

/// `pdflatex` + `pythontex` run as subprocesses
#[derive(Debug, Clone, Default)]
pub struct LatexToolchain {
    config: ToolchainConfig,
}

impl LatexToolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    /// Check that both programs can be launched (`--version`)
    pub fn check_installed(&self) -> Result<(), ToolchainError> {
        for program in [&self.config.latex, &self.config.pythontex] {
            let version = version_of(program)?;
            debug!(program = %program, %version, "Found toolchain program");
        }
        Ok(())
    }

    fn command(&self, program: &str, pass: Pass, job: &Job) -> Command {
        let mut command = Command::new(program);
        if pass == Pass::Typeset {
            command.args(&self.config.latex_args);
        }
        command
            .arg(job.tex_file())
            .current_dir(&job.workdir)
            .stdin(Stdio::null());

        if job.search_dirs.is_empty() {
            return command;
        }
        let existing: Option<OsString> = env::var_os("TEXINPUTS");
        command.env("TEXINPUTS", texinputs_with(&job.search_dirs, existing));

        // pythontex runs the extracted code from the scratch directory, so
        // modules next to the template are only importable through PYTHONPATH
        if pass == Pass::Computation {
            let existing = env::var_os("PYTHONPATH");
            command.env("PYTHONPATH", pythonpath_with(&job.search_dirs, existing));
        }
        command
    }

    fn run(&self, program: &str, pass: Pass, job: &Job) -> Result<(), ToolchainError> {
        debug!(program, %pass, workdir = %job.workdir.display(), "Running toolchain pass");

        let output = self
            .command(program, pass, job)
            .output()
            .map_err(|source| ToolchainError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();
        let tail = lines[lines.len().saturating_sub(FAILURE_TAIL_LINES)..].join("\n");

        if self.config.ignore_exit_status {
            warn!(program, %pass, status = %output.status, "Ignoring failed pass");
            debug!("{}", tail);
            return Ok(());
        }

        warn!(program, %pass, status = %output.status, "Toolchain pass failed:\n{}", tail);
        Err(ToolchainError::failed(pass, output.status.code()))
    }
}

impl Toolchain for LatexToolchain {
    fn typeset(&self, job: &Job) -> Result<(), ToolchainError> {
        self.run(&self.config.latex, Pass::Typeset, job)
    }

    fn compute(&self, job: &Job) -> Result<(), ToolchainError> {
        self.run(&self.config.pythontex, Pass::Computation, job)
    }
}
