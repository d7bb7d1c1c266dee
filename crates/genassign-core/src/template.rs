//! LaTeX-friendly template rendering.
//!
//! Templates are Jinja templates (rendered with `minijinja`) whose delimiters
//! are reshaped so they do not collide with TeX grouping:
//!
//! | Construct        | Syntax                     |
//! |------------------|----------------------------|
//! | Variable         | `\VAR{name}`               |
//! | Block            | `\BLOCK{if x} ... \BLOCK{endif}` |
//! | Line statement   | `%- for q in range(3)`     |
//! | Comment          | `\#{anything}`             |
//! | Line comment     | `%# to end of line`        |
//!
//! Blocks swallow the newline that follows them. Values are inserted
//! verbatim, with no escaping.
//!
//! The template itself typically defines `\newcommand*{\VAR}[1]{}` so it
//! still compiles stand-alone during authoring.
//!
//! # Example
//!
//! ```
//! use genassign_core::Template;
//!
//! let template = Template::new(r"\VAR{FullName} (\VAR{ StudentID })");
//! let doc = template
//!     .render(&["FullName", "StudentID"], &["Ann Lee", "S100"])
//!     .unwrap();
//! assert_eq!(doc, "Ann Lee (S100)");
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::error::TemplateError;

/// Names the engine resolves itself; never reported as placeholders
const ENGINE_GLOBALS: [&str; 6] = ["range", "dict", "namespace", "debug", "loop", "self"];

/// A loaded document template
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    strict: bool,
}

impl Template {
    /// Create a template from source text
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            strict: false,
        }
    }

    /// Load a template file, rejecting it if it does not parse
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let template = Self::new(source);
        template.placeholders()?;
        Ok(template)
    }

    /// Fail on placeholders without a matching key instead of rendering them empty
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn environment<'source>(&self) -> Result<Environment<'source>, TemplateError> {
        let syntax = SyntaxConfig::builder()
            .block_delimiters(r"\BLOCK{", "}")
            .variable_delimiters(r"\VAR{", "}")
            .comment_delimiters(r"\#{", "}")
            .line_statement_prefix("%-")
            .line_comment_prefix("%#")
            .build()
            .map_err(TemplateError::Syntax)?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(if self.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        Ok(env)
    }

    /// Distinct variables the template looks up, sorted
    ///
    /// Loop variables and names assigned inside the template are not
    /// included. Fails if the template does not parse.
    pub fn placeholders(&self) -> Result<Vec<String>, TemplateError> {
        let env = self.environment()?;
        let template = env
            .template_from_str(&self.source)
            .map_err(TemplateError::Syntax)?;

        let names: BTreeSet<String> = template
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !ENGINE_GLOBALS.contains(&name.as_str()))
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Placeholders that none of `keys` will satisfy
    pub fn unknown_keys<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<String>, TemplateError> {
        Ok(self
            .placeholders()?
            .into_iter()
            .filter(|name| !keys.iter().any(|k| k.as_ref() == name))
            .collect())
    }

    /// Render the template for one record
    ///
    /// Keys and values are paired positionally; a repeated key takes its
    /// last value.
    pub fn render<K, V>(&self, keys: &[K], values: &[V]) -> Result<String, TemplateError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let context: HashMap<&str, &str> = keys
            .iter()
            .map(|k| k.as_ref())
            .zip(values.iter().map(|v| v.as_ref()))
            .collect();

        if self.strict {
            if let Some(name) = self
                .placeholders()?
                .into_iter()
                .find(|name| !context.contains_key(name.as_str()))
            {
                return Err(TemplateError::UnknownKey(name));
            }
        }

        let env = self.environment()?;
        let template = env
            .template_from_str(&self.source)
            .map_err(TemplateError::Syntax)?;
        template.render(&context).map_err(TemplateError::Render)
    }

    /// Render the template and write the document to `path`
    pub fn render_to_file<K, V>(
        &self,
        keys: &[K],
        values: &[V],
        path: impl AsRef<Path>,
    ) -> Result<(), TemplateError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = path.as_ref();
        let document = self.render(keys, values)?;
        fs::write(path, document).map_err(|source| TemplateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
