//! Tokenizers: source text to token tree
//!
//! The renderer only consumes [`Token`] trees, so anything that can produce
//! one plugs in through the [`Tokenizer`] trait. Two ship with the crate:
//! markdown through comrak ([`ComrakTokenizer`]) and token trees serialized
//! as JSON by an external tokenizer ([`JsonTokenizer`]).

mod markdown;

pub use markdown::ComrakTokenizer;

use crate::error::ConvertError;
use crate::token::Token;
use std::collections::HashMap;
use std::path::Path;

/// Produces a token tree from source text.
pub trait Tokenizer: Send + Sync {
    /// Name used to select the tokenizer (e.g. "markdown", "tokens")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// File extensions without the leading dot.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn tokenize(&self, source: &str) -> Result<Vec<Token>, ConvertError>;
}

/// Reads a JSON array of mistune-shaped tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTokenizer;

impl Tokenizer for JsonTokenizer {
    fn name(&self) -> &str {
        "tokens"
    }

    fn description(&self) -> &str {
        "JSON token tree"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn tokenize(&self, source: &str) -> Result<Vec<Token>, ConvertError> {
        serde_json::from_str(source)
            .map_err(|e| ConvertError::Tokenize(format!("invalid token JSON: {e}")))
    }
}

/// Tokenizers by name, with extension based detection.
pub struct TokenizerRegistry {
    tokenizers: HashMap<String, Box<dyn Tokenizer>>,
}

impl TokenizerRegistry {
    pub fn new() -> Self {
        Self {
            tokenizers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ComrakTokenizer);
        registry.register(JsonTokenizer);
        registry
    }

    pub fn register<T: Tokenizer + 'static>(&mut self, tokenizer: T) {
        self.tokenizers
            .insert(tokenizer.name().to_string(), Box::new(tokenizer));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Tokenizer, ConvertError> {
        self.tokenizers
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| ConvertError::TokenizerNotFound(name.to_string()))
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tokenizers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Tokenizer claiming the extension of `path`, if any.
    pub fn detect(&self, path: &Path) -> Option<&dyn Tokenizer> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.tokenizers
            .values()
            .find(|t| t.file_extensions().contains(&extension.as_str()))
            .map(|t| t.as_ref())
    }

    /// Tokenizer for an input path: detected by extension, markdown otherwise.
    pub fn for_path(&self, path: &Path) -> Result<&dyn Tokenizer, ConvertError> {
        match self.detect(path) {
            Some(tokenizer) => Ok(tokenizer),
            None => self.get(ComrakTokenizer::NAME),
        }
    }
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
