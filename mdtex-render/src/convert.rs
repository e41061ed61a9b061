//! Conversion pipeline
//!
//! High level entry points that tie the pieces together: tokenize, resolve
//! the construct config and document template, render, and optionally write
//! the result to disk.
//!
//! ```ignore
//! let options = ConvertOptions::new()
//!     .with_config("academic")
//!     .with_template("academic")
//!     .with_override("strong", "\\textsf{\\bfseries <text>}");
//! let latex = convert_str("# Title\n\nBody.", &options)?;
//! ```
//!
//! For more control, build a [`LatexRenderer`] directly.

use crate::error::ConvertError;
use crate::renderer::{LatexRenderer, RenderOptions};
use crate::resolve::{resolve_config, resolve_template, ConfigMap, ConfigSource, TemplateSource};
use crate::token::Token;
use crate::tokenizer::{ComrakTokenizer, Tokenizer, TokenizerRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a conversion needs besides its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Construct templates
    pub config: ConfigSource,
    /// Document wrapper
    pub template: TemplateSource,
    /// Per-construct overrides applied over `config`
    pub overrides: ConfigMap,
    pub render: RenderOptions,
    /// Tokenizer name for file inputs; detected from the extension when unset
    pub tokenizer: Option<String>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: impl Into<ConfigSource>) -> Self {
        self.config = config.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<TemplateSource>) -> Self {
        self.template = template.into();
        self
    }

    /// Override the template of one construct, winning over any config.
    pub fn with_override(mut self, construct: impl Into<String>, template: impl Into<String>) -> Self {
        self.overrides.insert(construct.into(), template.into());
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_escape(mut self, escape: bool) -> Self {
        self.render.escape = escape;
        self
    }

    pub fn with_tokenizer(mut self, name: impl Into<String>) -> Self {
        self.tokenizer = Some(name.into());
        self
    }

    fn override_map(&self) -> Option<&ConfigMap> {
        (!self.overrides.is_empty()).then_some(&self.overrides)
    }
}

/// Render a token tree into a complete LaTeX document.
///
/// Never fails: unresolvable configs and templates fall back to built-ins.
pub fn convert_tokens(tokens: &[Token], options: &ConvertOptions) -> String {
    let templates = resolve_config(&options.config, options.override_map());
    let document = resolve_template(&options.template);
    let mut renderer = LatexRenderer::with_options(&templates, options.render.clone());
    let latex = renderer.render_document(tokens, &document);
    debug!(
        tokens = tokens.len(),
        tables = renderer.table_counter(),
        "rendered document"
    );
    latex
}

/// Tokenize `source` with `tokenizer` and render it.
pub fn convert_with(
    tokenizer: &dyn Tokenizer,
    source: &str,
    options: &ConvertOptions,
) -> Result<String, ConvertError> {
    let tokens = tokenizer.tokenize(source)?;
    Ok(convert_tokens(&tokens, options))
}

/// Convert markdown text to a LaTeX document.
pub fn convert_str(markdown: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
    convert_with(&ComrakTokenizer, markdown, options)
}

/// Convert a file and write the result.
///
/// The output defaults to the input path with a `.tex` extension; missing
/// parent directories are created. Returns the path written.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let registry = TokenizerRegistry::with_defaults();
    let tokenizer = match &options.tokenizer {
        Some(name) => registry.get(name)?,
        None => registry.for_path(input)?,
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("tex"));
    if output == input {
        return Err(ConvertError::io(&output, "output would overwrite the input"));
    }

    let source = fs::read_to_string(input).map_err(|err| ConvertError::io(input, err))?;
    debug!(input = %input.display(), tokenizer = tokenizer.name(), "converting file");
    let latex = convert_with(tokenizer, &source, options)?;
    write_to_path(output, latex)
}

pub(crate) fn write_to_path(path: PathBuf, text: String) -> Result<PathBuf, ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
    }
    fs::write(&path, text)
        .map(|_| path.clone())
        .map_err(|err| ConvertError::io(&path, err))
}
