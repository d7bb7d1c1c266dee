//! CLI application logic
//!
//! Argument parsing, settings resolution and the run itself.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use genassign_core::{Naming, RecordSet, Template};
use genassign_data::WorksheetMode;
use genassign_latex::{
    purge_root, run_batch, Driver, Encryption, LatexToolchain, Permissions, QpdfEncryptor,
    RunSummary,
};
use tracing::warn;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "genassign")]
#[command(
    author,
    version,
    about = "Generate individualized assignments from a LaTeX template and a worksheet",
    long_about = None
)]
pub struct Cli {
    /// LaTeX template with \VAR{...} placeholders
    pub template: String,

    /// Moodle grading worksheet, or any CSV/XLSX with --generic
    pub worksheet: String,

    /// Prefix of output file names (full mask with --generic)
    #[arg(short = 't', long = "file-mask", default_value = "")]
    pub file_mask: String,

    /// Moodle submission type (full folder mask with --generic)
    #[arg(short = 'f', long = "folder-mask", default_value = "file")]
    pub folder_mask: String,

    /// Do not generate the question paper
    #[arg(short = 'b', long = "no-paper")]
    pub no_paper: bool,

    /// Lock produced PDFs with an owner password
    #[arg(short = 'e', long)]
    pub encrypt: bool,

    /// Mail-merge mode: worksheet headers are the keys, masks are verbatim
    #[arg(short = 'g', long)]
    pub generic: bool,

    /// Stem appended to solutions file names [default: _sols]
    #[arg(short = 's', long = "sol-stem")]
    pub sol_stem: Option<String>,

    /// Stem appended to question paper file names [default: _paper]
    #[arg(short = 'p', long = "paper-stem")]
    pub paper_stem: Option<String>,

    /// Output root for solutions [default: solutions]
    #[arg(short = 'r', long)]
    pub root: Option<String>,

    /// Output root for question papers [default: questions]
    #[arg(short = 'q', long)]
    pub questdir: Option<String>,

    /// Owner password for --encrypt [default: g3n@ss1gn-21]
    #[arg(short = 'w', long)]
    pub password: Option<String>,

    /// Configuration file (default: genassign.toml in the working directory)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Everything a run needs, after command line and config file are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub template: PathBuf,
    pub worksheet: PathBuf,
    pub mode: WorksheetMode,
    pub naming: Naming,
    pub root: PathBuf,
    pub questdir: PathBuf,
    /// Owner password, present only when encryption was requested
    pub password: Option<String>,
    pub strict: bool,
}

impl RunOptions {
    /// Merge flags over settings; a flag always wins
    pub fn resolve(cli: &Cli, settings: &Settings) -> Self {
        let output = &settings.output;
        let sol_stem = cli.sol_stem.as_deref().unwrap_or(&output.sol_stem);
        let paper_stem = cli.paper_stem.as_deref().unwrap_or(&output.paper_stem);

        let (mode, naming) = if cli.generic {
            (
                WorksheetMode::Generic,
                Naming::generic(&cli.file_mask, &cli.folder_mask),
            )
        } else {
            (
                WorksheetMode::Roster,
                Naming::roster(
                    &cli.file_mask,
                    &cli.folder_mask,
                    sol_stem,
                    (!cli.no_paper).then_some(paper_stem),
                ),
            )
        };

        Self {
            template: normalize_input(&cli.template),
            worksheet: normalize_input(&cli.worksheet),
            mode,
            naming,
            root: PathBuf::from(cli.root.as_deref().unwrap_or(&output.root)),
            questdir: PathBuf::from(cli.questdir.as_deref().unwrap_or(&output.questdir)),
            password: cli
                .encrypt
                .then(|| cli.password.clone().unwrap_or_else(|| output.password.clone())),
            strict: settings.template.strict,
        }
    }
}

/// Drop leading `.\` left by Windows shell completion
pub fn normalize_input(arg: &str) -> PathBuf {
    PathBuf::from(arg.trim_start_matches(".\\"))
}

/// Run the CLI application
///
/// Exits with status 1 when any record failed.
pub fn run_cli() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let options = RunOptions::resolve(&cli, &settings);

    let summary = generate_command(&options, &settings)?;
    print_summary(&summary, &options, cli.generic, cli.no_paper);

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Load inputs, prepare the output roots and process every record
pub fn generate_command(options: &RunOptions, settings: &Settings) -> Result<RunSummary> {
    println!("genassign v{}", genassign_core::VERSION);

    if !options.template.exists() {
        anyhow::bail!("Template not found: {}", options.template.display());
    }
    if !options.worksheet.exists() {
        anyhow::bail!("Worksheet not found: {}", options.worksheet.display());
    }

    println!("  Template: {}", options.template.display());
    let template = Template::from_file(&options.template)
        .with_context(|| format!("Failed to load template: {}", options.template.display()))?
        .with_strict(options.strict);

    println!("  Worksheet: {}", options.worksheet.display());
    let records = genassign_data::load(&options.worksheet, options.mode)
        .with_context(|| format!("Failed to load worksheet: {}", options.worksheet.display()))?;
    println!("    {} records", records.len());

    check_placeholders(&template, &records)?;
    options
        .naming
        .check_arity(records.width())
        .context("Invalid file or folder mask")?;

    let encryptor = QpdfEncryptor::new(&settings.toolchain.qpdf);
    if options.password.is_some() {
        encryptor
            .check_installed()
            .context("qpdf not available (required by --encrypt)")?;
    }

    let toolchain = LatexToolchain::new(settings.toolchain.to_config());
    toolchain
        .check_installed()
        .context("LaTeX toolchain not available (is pdflatex/pythontex on PATH?)")?;

    let template_dir = template_dir(&options.template)?;
    let launch_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    prepare_roots(options)?;

    let mut driver = Driver::new(
        template,
        records.keys().to_vec(),
        options.naming.clone(),
        toolchain,
    )
    .with_roots(&options.root, &options.questdir)
    .with_search_dir(template_dir)
    .with_search_dir(launch_dir);

    if let Some(password) = &options.password {
        driver = driver.with_encryption(Encryption {
            encryptor: &encryptor,
            owner_password: password.clone(),
            permissions: Permissions::restricted(),
        });
    }

    println!();
    let total = records.len();
    let summary = run_batch(&driver, records.records(), |record, outcome| {
        let position = record.index + 1;
        match outcome {
            Ok(output) => println!(
                "  [{}/{}] {}: {}",
                position,
                total,
                record.label(),
                output.solutions.display()
            ),
            Err(failure) => println!(
                "  [{}/{}] {}: FAILED ({})",
                position,
                total,
                record.label(),
                failure
            ),
        }
    })
    .context("Run aborted")?;

    Ok(summary)
}

/// Report placeholders the worksheet cannot fill; fatal in strict mode
fn check_placeholders(template: &Template, records: &RecordSet) -> Result<()> {
    let unknown = template.unknown_keys(records.keys())?;
    if unknown.is_empty() {
        return Ok(());
    }

    if template.is_strict() {
        anyhow::bail!(
            "Template placeholders with no worksheet column: {}",
            unknown.join(", ")
        );
    }
    warn!(keys = %unknown.join(", "), "Placeholders will render empty");
    Ok(())
}

/// Purge the output roots once, before the first record
fn prepare_roots(options: &RunOptions) -> Result<()> {
    purge_root(&options.root)
        .with_context(|| format!("Failed to purge output root: {}", options.root.display()))?;
    if options.naming.produces_paper() {
        purge_root(&options.questdir).with_context(|| {
            format!("Failed to purge output root: {}", options.questdir.display())
        })?;
    }
    Ok(())
}

/// Absolute directory of the template, searched by the toolchain
fn template_dir(template: &Path) -> Result<PathBuf> {
    let parent = match template.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve template directory: {}", parent.display()))
}

fn print_summary(summary: &RunSummary, options: &RunOptions, generic: bool, no_paper: bool) {
    println!();
    println!(
        "Processed {} individuals in {:.1} seconds",
        summary.processed(),
        summary.elapsed.as_secs_f64()
    );
    println!("  Output: {}", options.root.display());
    if options.naming.produces_paper() {
        println!("  Papers: {}", options.questdir.display());
    }

    if generic {
        println!("Operating in generic mode");
    } else if no_paper {
        println!("Warning: Paper generation was not requested");
    }

    if !summary.failed.is_empty() {
        println!();
        println!("Failed records:");
        for (record, failure) in &summary.failed {
            println!("  {}: {}", record.label(), failure);
        }
    }
}
