//! Shared configuration loader for the mdtex toolchain.
//!
//! `defaults/mdtex.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MdtexConfig`].
//!
//! These are application settings (which construct config, which document
//! template, engine choice). The construct configs themselves, the flat
//! construct-to-template maps, are resolved by `mdtex-render`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mdtex_render::heading::HeadingLevelTable;
use mdtex_render::{
    ConvertOptions, ImageConverter, ImagePathPolicy, LatexCompiler, LatexEngine, RenderOptions,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

const DEFAULT_TOML: &str = include_str!("../defaults/mdtex.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "mdtex.toml";

/// Top-level configuration consumed by mdtex applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MdtexConfig {
    pub render: RenderConfig,
    pub batch: BatchConfig,
    pub compile: CompileConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Construct config name or path
    pub config: String,
    /// Document template name or path
    pub template: String,
    pub escape: bool,
    pub heading_levels: Vec<String>,
    #[serde(default)]
    pub image_rewrites: Vec<ImageRewriteConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRewriteConfig {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub jobs: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompileConfig {
    pub engine: LatexEngine,
    pub runs: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub timeout_secs: u64,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        let heading_levels = HeadingLevelTable::from_slice(config.heading_levels.as_slice())
            .unwrap_or_else(|| {
                warn!(
                    "render.heading_levels needs exactly 5 commands, got {}; using the defaults",
                    config.heading_levels.len()
                );
                HeadingLevelTable::default()
            });
        let image_paths = config
            .image_rewrites
            .iter()
            .fold(ImagePathPolicy::new(), |policy, rewrite| {
                policy.with_rewrite(rewrite.from.as_str(), rewrite.to.as_str())
            });
        RenderOptions {
            escape: config.escape,
            heading_levels,
            image_paths,
        }
    }
}

impl From<&RenderConfig> for ConvertOptions {
    fn from(config: &RenderConfig) -> Self {
        ConvertOptions::new()
            .with_config(config.config.as_str())
            .with_template(config.template.as_str())
            .with_render_options(config.into())
    }
}

impl From<&CompileConfig> for LatexCompiler {
    fn from(config: &CompileConfig) -> Self {
        LatexCompiler::new(config.engine)
            .with_runs(config.runs)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }
}

impl MdtexConfig {
    pub fn convert_options(&self) -> ConvertOptions {
        (&self.render).into()
    }

    pub fn compiler(&self) -> LatexCompiler {
        (&self.compile).into()
    }

    /// Image converter using the tools found on `PATH`.
    pub fn image_converter(&self) -> ImageConverter {
        ImageConverter::detect().with_timeout(Duration::from_secs(self.images.timeout_secs))
    }

    /// Worker count for batch runs, at least one.
    pub fn jobs(&self) -> usize {
        self.batch.jobs.max(1)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MdtexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MdtexConfig, ConfigError> {
    Loader::new().build()
}
