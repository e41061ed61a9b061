//! Error types for conversion and template operations

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that can abort a conversion.
///
/// Rendering itself never fails: these only surface at the conversion
/// boundary (reading inputs, writing outputs, tokenizing, compiling,
/// converting images).
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// An explicitly requested file could not be read or written
    Io { path: PathBuf, message: String },
    /// No tokenizer is registered under this name
    TokenizerNotFound(String),
    /// The tokenizer rejected its input
    Tokenize(String),
    /// The LaTeX engine could not be found or failed
    Compile(String),
    /// An image could not be converted to a format LaTeX includes
    Image(String),
    /// An external tool did not finish within the allotted time
    Timeout { engine: String, timeout: Duration },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        ConvertError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io { path, message } => {
                write!(f, "I/O error on '{}': {message}", path.display())
            }
            ConvertError::TokenizerNotFound(name) => write!(f, "Tokenizer '{name}' not found"),
            ConvertError::Tokenize(msg) => write!(f, "Tokenize error: {msg}"),
            ConvertError::Compile(msg) => write!(f, "Compile error: {msg}"),
            ConvertError::Image(msg) => write!(f, "Image conversion error: {msg}"),
            ConvertError::Timeout { engine, timeout } => {
                write!(f, "{engine} did not finish within {timeout:?} and was killed")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Errors raised while loading templates.
///
/// The resolver turns these into warnings and falls back to built-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A template names a placeholder its construct does not provide
    UnknownPlaceholder {
        construct: String,
        placeholder: String,
    },
    /// A document template lacks the content marker
    MissingMarker(&'static str),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnknownPlaceholder {
                construct,
                placeholder,
            } => write!(
                f,
                "Template for '{construct}' uses unknown placeholder '<{placeholder}>'"
            ),
            TemplateError::MissingMarker(marker) => {
                write!(f, "Document template has no '{marker}' marker")
            }
        }
    }
}

impl std::error::Error for TemplateError {}
