//! Construct config and document template resolution
//!
//! Construct configs are flat `construct → template` maps. Three ship with
//! the crate (`default`, `chinese`, `academic`); any other name is read as a
//! path with the `config` crate, so TOML, YAML and JSON files all work.
//! Document templates resolve the same way against `basic`, `academic` and
//! `chinese_book`.
//!
//! Resolution never fails. Anything missing or unreadable is logged and
//! replaced by the nearest built-in.

use crate::template::{DocumentTemplate, TemplateSet};
use config::{Config, ConfigError, File, FileFormat};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Flat construct name to template text map.
pub type ConfigMap = HashMap<String, String>;

pub const DEFAULT_CONFIG: &str = "default";
pub const DEFAULT_TEMPLATE: &str = "basic";

const BUILTIN_CONFIGS: [(&str, &str); 3] = [
    (DEFAULT_CONFIG, include_str!("../configs/default.toml")),
    ("chinese", include_str!("../configs/chinese.toml")),
    ("academic", include_str!("../configs/academic.toml")),
];

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
    (DEFAULT_TEMPLATE, include_str!("../templates/basic.tex")),
    ("academic", include_str!("../templates/academic.tex")),
    ("chinese_book", include_str!("../templates/chinese_book.tex")),
];

/// Where construct templates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in config name or path to a config file
    Named(String),
    /// In-memory map, used as given
    Literal(ConfigMap),
}

impl Default for ConfigSource {
    fn default() -> Self {
        ConfigSource::Named(DEFAULT_CONFIG.to_string())
    }
}

impl From<&str> for ConfigSource {
    fn from(name: &str) -> Self {
        ConfigSource::Named(name.to_string())
    }
}

impl From<ConfigMap> for ConfigSource {
    fn from(map: ConfigMap) -> Self {
        ConfigSource::Literal(map)
    }
}

/// Where the document wrapper comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Built-in template name or path to a `.tex` file
    Named(String),
    /// Template text, must contain the content marker
    Literal(String),
}

impl Default for TemplateSource {
    fn default() -> Self {
        TemplateSource::Named(DEFAULT_TEMPLATE.to_string())
    }
}

impl From<&str> for TemplateSource {
    fn from(name: &str) -> Self {
        TemplateSource::Named(name.to_string())
    }
}

/// Names of the configs embedded in the crate.
pub fn builtin_configs() -> Vec<&'static str> {
    BUILTIN_CONFIGS.iter().map(|(name, _)| *name).collect()
}

/// Names of the document templates embedded in the crate.
pub fn builtin_templates() -> Vec<&'static str> {
    BUILTIN_TEMPLATES.iter().map(|(name, _)| *name).collect()
}

fn builtin_config(name: &str) -> Option<&'static str> {
    BUILTIN_CONFIGS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, text)| *text)
}

fn builtin_template(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, text)| *text)
}

fn parse_embedded(text: &str) -> Result<ConfigMap, ConfigError> {
    Config::builder()
        .add_source(File::from_str(text, FileFormat::Toml))
        .build()?
        .try_deserialize()
}

fn read_config_file(path: &Path) -> Result<ConfigMap, ConfigError> {
    Config::builder()
        .add_source(File::from(path).required(true))
        .build()?
        .try_deserialize()
}

fn default_map() -> ConfigMap {
    match builtin_config(DEFAULT_CONFIG).map(parse_embedded) {
        Some(Ok(map)) => map,
        Some(Err(err)) => {
            warn!("built-in default config is unreadable ({err}); using built-in templates");
            ConfigMap::new()
        }
        None => ConfigMap::new(),
    }
}

/// Load a named or path config.
///
/// Every config other than `default` is merged over `default`, with its own
/// entries winning.
pub fn load_config_map(name: &str) -> ConfigMap {
    if name == DEFAULT_CONFIG {
        return default_map();
    }

    let loaded = match builtin_config(name) {
        Some(text) => {
            debug!(config = name, "using built-in config");
            parse_embedded(text)
        }
        None => {
            let path = Path::new(name);
            if !path.exists() {
                warn!(
                    "config file {} does not exist, using the default config",
                    path.display()
                );
                return default_map();
            }
            debug!(path = %path.display(), "reading config file");
            read_config_file(path)
        }
    };

    match loaded {
        Ok(overlay) => {
            let mut merged = default_map();
            merged.extend(overlay);
            merged
        }
        Err(err) => {
            warn!("failed to load config {name}: {err}; using the default config");
            default_map()
        }
    }
}

/// Resolve `source` to a flat map, applying `overrides` last.
pub fn resolve_config_map(source: &ConfigSource, overrides: Option<&ConfigMap>) -> ConfigMap {
    let mut map = match source {
        ConfigSource::Named(name) => load_config_map(name),
        ConfigSource::Literal(map) => map.clone(),
    };
    if let Some(overrides) = overrides {
        map.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    map
}

/// Resolve `source` and `overrides` to a typed template set.
pub fn resolve_config(source: &ConfigSource, overrides: Option<&ConfigMap>) -> TemplateSet {
    TemplateSet::from_map(&resolve_config_map(source, overrides))
}

fn parse_or_skeleton(origin: &str, text: &str) -> DocumentTemplate {
    DocumentTemplate::parse(text).unwrap_or_else(|err| {
        warn!("{origin}: {err}, using the built-in skeleton");
        DocumentTemplate::skeleton()
    })
}

/// Resolve a document template.
///
/// A missing path falls back to `basic`; an unreadable file or one without
/// the content marker falls back to the minimal skeleton.
pub fn resolve_template(source: &TemplateSource) -> DocumentTemplate {
    match source {
        TemplateSource::Literal(text) => parse_or_skeleton("inline template", text),
        TemplateSource::Named(name) => {
            if let Some(text) = builtin_template(name) {
                debug!(template = %name, "using built-in document template");
                return parse_or_skeleton(name, text);
            }
            let path = Path::new(name);
            if !path.exists() {
                warn!(
                    "template file {} does not exist, using the {DEFAULT_TEMPLATE} template",
                    path.display()
                );
                return resolve_template(&TemplateSource::default());
            }
            match fs::read_to_string(path) {
                Ok(text) => parse_or_skeleton(name, &text),
                Err(err) => {
                    warn!(
                        "failed to read template {}: {err}, using the built-in skeleton",
                        path.display()
                    );
                    DocumentTemplate::skeleton()
                }
            }
        }
    }
}
