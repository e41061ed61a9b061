//! Token tree consumed by the renderer
//!
//! Tokens follow the shape emitted by mistune-style markdown tokenizers:
//! a `type` tag, optional literal `raw` text, optional ordered `children`,
//! and a free-form `attrs` map. They deserialize directly from that JSON
//! shape, so token trees produced by external tokenizers can be rendered
//! without an intermediate step.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Deepest token nesting that is tokenized or rendered structurally.
/// Anything below it collapses into its plain text.
pub const MAX_DEPTH: usize = 256;

/// Construct tag of a token.
///
/// Unrecognized tags are kept as [`TokenKind::Unknown`] and render as
/// nothing, so new upstream token types never break rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum TokenKind {
    Text,
    Emphasis,
    Strong,
    Link,
    Image,
    Codespan,
    Linebreak,
    Softbreak,
    InlineMath,
    Paragraph,
    Heading,
    BlockText,
    BlockCode,
    BlockQuote,
    BlockMath,
    ThematicBreak,
    BlankLine,
    List,
    OrderedList,
    UnorderedList,
    ListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    Unknown(String),
}

impl TokenKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" => TokenKind::Text,
            "emphasis" => TokenKind::Emphasis,
            "strong" => TokenKind::Strong,
            "link" => TokenKind::Link,
            "image" => TokenKind::Image,
            "codespan" => TokenKind::Codespan,
            "linebreak" => TokenKind::Linebreak,
            "softbreak" => TokenKind::Softbreak,
            "inline_math" => TokenKind::InlineMath,
            "paragraph" => TokenKind::Paragraph,
            "heading" => TokenKind::Heading,
            "block_text" => TokenKind::BlockText,
            "block_code" => TokenKind::BlockCode,
            "block_quote" => TokenKind::BlockQuote,
            "block_math" => TokenKind::BlockMath,
            "thematic_break" => TokenKind::ThematicBreak,
            "blank_line" => TokenKind::BlankLine,
            "list" => TokenKind::List,
            "ordered_list" => TokenKind::OrderedList,
            "unordered_list" | "disordered_list" => TokenKind::UnorderedList,
            "list_item" => TokenKind::ListItem,
            "table" => TokenKind::Table,
            "table_head" => TokenKind::TableHead,
            "table_body" => TokenKind::TableBody,
            "table_row" => TokenKind::TableRow,
            "table_cell" => TokenKind::TableCell,
            other => TokenKind::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TokenKind::Text => "text",
            TokenKind::Emphasis => "emphasis",
            TokenKind::Strong => "strong",
            TokenKind::Link => "link",
            TokenKind::Image => "image",
            TokenKind::Codespan => "codespan",
            TokenKind::Linebreak => "linebreak",
            TokenKind::Softbreak => "softbreak",
            TokenKind::InlineMath => "inline_math",
            TokenKind::Paragraph => "paragraph",
            TokenKind::Heading => "heading",
            TokenKind::BlockText => "block_text",
            TokenKind::BlockCode => "block_code",
            TokenKind::BlockQuote => "block_quote",
            TokenKind::BlockMath => "block_math",
            TokenKind::ThematicBreak => "thematic_break",
            TokenKind::BlankLine => "blank_line",
            TokenKind::List => "list",
            TokenKind::OrderedList => "ordered_list",
            TokenKind::UnorderedList => "unordered_list",
            TokenKind::ListItem => "list_item",
            TokenKind::Table => "table",
            TokenKind::TableHead => "table_head",
            TokenKind::TableBody => "table_body",
            TokenKind::TableRow => "table_row",
            TokenKind::TableCell => "table_cell",
            TokenKind::Unknown(name) => name,
        }
    }
}

impl From<String> for TokenKind {
    fn from(name: String) -> Self {
        TokenKind::from_name(&name)
    }
}

/// Token attributes (`level`, `url`, `info`, `head`, `align`, ...).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Attrs(BTreeMap<String, Value>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String attribute; `null` and non-string values read as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Non-negative integer attribute; numeric strings are accepted too.
    /// Floats truncate and out-of-range values saturate at `usize::MAX`.
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        match self.0.get(key)? {
            Value::Number(n) => match n.as_u64() {
                Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
                None => n.as_f64().filter(|f| *f >= 0.0).map(|f| f as usize),
            },
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean attribute; absent means `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A node of the parsed document.
///
/// Exactly one of `raw` / `children` is populated, except for zero-content
/// constructs such as thematic breaks and blank lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<Token>>,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Token {
    /// A token carrying literal text.
    pub fn raw(kind: TokenKind, raw: impl Into<String>) -> Self {
        Token {
            kind,
            raw: Some(raw.into()),
            children: None,
            attrs: Attrs::new(),
        }
    }

    /// A token wrapping child tokens.
    pub fn parent(kind: TokenKind, children: Vec<Token>) -> Self {
        Token {
            kind,
            raw: None,
            children: Some(children),
            attrs: Attrs::new(),
        }
    }

    /// A zero-content token (thematic break, blank line, line breaks).
    pub fn empty(kind: TokenKind) -> Self {
        Token {
            kind,
            raw: None,
            children: None,
            attrs: Attrs::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Token::raw(TokenKind::Text, text)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key, value);
        self
    }

    /// Children as a slice, empty when the token has none.
    pub fn children(&self) -> &[Token] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn is(&self, kind: &TokenKind) -> bool {
        &self.kind == kind
    }

    /// Concatenated `raw` text of the whole subtree, in document order.
    ///
    /// Walks with an explicit stack, so arbitrarily deep trees are fine.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(token) = stack.pop() {
            if let Some(raw) = &token.raw {
                out.push_str(raw);
            }
            stack.extend(token.children().iter().rev());
        }
        out
    }
}
