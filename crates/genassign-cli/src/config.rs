//! Configuration file
//!
//! Settings are read from `--config <path>`, or else from `genassign.toml`
//! or `.genassign.toml` in the working directory:
//!
//! ```toml
//! [toolchain]
//! latex = "lualatex"
//! latex_args = ["-shell-escape", "-interaction=nonstopmode"]
//! ignore_exit_status = true
//!
//! [output]
//! root = "feedback"
//! password = "change-me"
//!
//! [template]
//! strict = true
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use genassign_latex::ToolchainConfig;
use serde::{Deserialize, Serialize};

/// File names searched when no `--config` is given
pub const CONFIG_CANDIDATES: [&str; 2] = ["genassign.toml", ".genassign.toml"];

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub toolchain: ToolchainSettings,
    pub output: OutputSettings,
    pub template: TemplateSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// External programs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    pub latex: String,
    pub latex_args: Vec<String>,
    pub pythontex: String,
    pub qpdf: String,
    /// Accept a non-zero exit status from either pass
    pub ignore_exit_status: bool,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        let toolchain = ToolchainConfig::default();
        Self {
            latex: toolchain.latex,
            latex_args: toolchain.latex_args,
            pythontex: toolchain.pythontex,
            qpdf: "qpdf".to_string(),
            ignore_exit_status: toolchain.ignore_exit_status,
        }
    }
}

impl ToolchainSettings {
    pub fn to_config(&self) -> ToolchainConfig {
        ToolchainConfig {
            latex: self.latex.clone(),
            latex_args: self.latex_args.clone(),
            pythontex: self.pythontex.clone(),
            ignore_exit_status: self.ignore_exit_status,
        }
    }
}

/// Output naming and locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub sol_stem: String,
    pub paper_stem: String,
    pub root: String,
    pub questdir: String,
    pub password: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sol_stem: "_sols".to_string(),
            paper_stem: "_paper".to_string(),
            root: "solutions".to_string(),
            questdir: "questions".to_string(),
            password: "g3n@ss1gn-21".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplateSettings {
    /// Fail on placeholders the worksheet has no column for
    pub strict: bool,
}

/// Load settings from an explicit path or the default locations
///
/// An explicit path must exist and parse. A default-location file that
/// fails to parse is an error too; silently ignoring it would run with
/// settings the user did not ask for.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            read_settings(path)
        }
        None => {
            for candidate in CONFIG_CANDIDATES {
                let path = Path::new(candidate);
                if path.is_file() {
                    tracing::debug!(path = candidate, "Using config file");
                    return read_settings(path);
                }
            }
            Ok(Settings::default())
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    Settings::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.toolchain.latex, "pdflatex");
        assert_eq!(
            settings.toolchain.latex_args,
            vec!["-shell-escape", "-synctex=1", "-interaction=nonstopmode"]
        );
        assert_eq!(settings.toolchain.pythontex, "pythontex");
        assert_eq!(settings.toolchain.qpdf, "qpdf");
        assert!(!settings.toolchain.ignore_exit_status);
        assert_eq!(settings.output.sol_stem, "_sols");
        assert_eq!(settings.output.paper_stem, "_paper");
        assert_eq!(settings.output.root, "solutions");
        assert_eq!(settings.output.questdir, "questions");
        assert_eq!(settings.output.password, "g3n@ss1gn-21");
        assert!(!settings.template.strict);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::from_toml_str(
            r#"
            [toolchain]
            latex = "lualatex"
            ignore_exit_status = true

            [output]
            root = "feedback"

            [template]
            strict = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.toolchain.latex, "lualatex");
        assert_eq!(settings.toolchain.pythontex, "pythontex");
        assert!(settings.toolchain.ignore_exit_status);
        assert_eq!(settings.output.root, "feedback");
        assert_eq!(settings.output.questdir, "questions");
        assert!(settings.template.strict);

        let config = settings.toolchain.to_config();
        assert_eq!(config.latex, "lualatex");
        assert!(config.ignore_exit_status);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml_str("[output\nroot = 1").is_err());
        assert!(Settings::from_toml_str("[output]\nroot = 1").is_err());
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = load_settings(Some(Path::new("/nonexistent/genassign.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[output]\npassword = \"s3cret\"\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.output.password, "s3cret");
    }
}
