//! Per-construct templates
//!
//! Every construct the renderer emits is wrapped by a template: LaTeX text
//! with named placeholders such as `<text>` or `<heading_type>`. Templates
//! arrive as a flat `construct → text` map (the on-disk config format) and
//! are parsed into a typed [`TemplateSet`] up front, so a misspelled
//! placeholder is reported when the config loads instead of silently
//! leaking into the output.
//!
//! # Placeholders
//!
//! | construct                | placeholders                                  |
//! |--------------------------|-----------------------------------------------|
//! | `heading`                | `<heading_type>`, `<text>`                    |
//! | `link`                   | `<url>`, `<text>`, `<title>`                  |
//! | `image`                  | `<url>`, `<alt>`, `<label>`, `<title>`        |
//! | `block_code`             | `<code>`                                      |
//! | `block_code_with_lang`   | `<lang>`, `<code>`                            |
//! | `table`                  | `<counter>`, `<alignment>`, `<header>`, `<body>` |
//! | `linebreak`, `softbreak`, `thematic_break`, `blank_line` | none        |
//! | everything else          | `<text>`                                      |

mod document;

pub use document::{DocumentTemplate, CONTENT_MARKER};

use crate::error::TemplateError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Named value slot inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Text,
    Url,
    Alt,
    Label,
    Title,
    HeadingType,
    Code,
    Lang,
    Counter,
    Alignment,
    Header,
    Body,
}

impl Placeholder {
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Text => "text",
            Placeholder::Url => "url",
            Placeholder::Alt => "alt",
            Placeholder::Label => "label",
            Placeholder::Title => "title",
            Placeholder::HeadingType => "heading_type",
            Placeholder::Code => "code",
            Placeholder::Lang => "lang",
            Placeholder::Counter => "counter",
            Placeholder::Alignment => "alignment",
            Placeholder::Header => "header",
            Placeholder::Body => "body",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let placeholder = match name {
            "text" => Placeholder::Text,
            "url" => Placeholder::Url,
            "alt" => Placeholder::Alt,
            "label" => Placeholder::Label,
            "title" => Placeholder::Title,
            "heading_type" => Placeholder::HeadingType,
            "code" => Placeholder::Code,
            "lang" => Placeholder::Lang,
            "counter" => Placeholder::Counter,
            "alignment" => Placeholder::Alignment,
            "header" => Placeholder::Header,
            "body" => Placeholder::Body,
            _ => return None,
        };
        Some(placeholder)
    }
}

/// A configurable output construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
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
    BlockCodeWithLang,
    BlockQuote,
    BlockMath,
    ThematicBreak,
    BlankLine,
    ListItem,
    OrderedList,
    UnorderedList,
    Table,
}

impl Construct {
    pub const ALL: [Construct; 22] = [
        Construct::Text,
        Construct::Emphasis,
        Construct::Strong,
        Construct::Link,
        Construct::Image,
        Construct::Codespan,
        Construct::Linebreak,
        Construct::Softbreak,
        Construct::InlineMath,
        Construct::Paragraph,
        Construct::Heading,
        Construct::BlockText,
        Construct::BlockCode,
        Construct::BlockCodeWithLang,
        Construct::BlockQuote,
        Construct::BlockMath,
        Construct::ThematicBreak,
        Construct::BlankLine,
        Construct::ListItem,
        Construct::OrderedList,
        Construct::UnorderedList,
        Construct::Table,
    ];

    /// Key used in config maps.
    pub fn key(self) -> &'static str {
        match self {
            Construct::Text => "text",
            Construct::Emphasis => "emphasis",
            Construct::Strong => "strong",
            Construct::Link => "link",
            Construct::Image => "image",
            Construct::Codespan => "codespan",
            Construct::Linebreak => "linebreak",
            Construct::Softbreak => "softbreak",
            Construct::InlineMath => "inline_math",
            Construct::Paragraph => "paragraph",
            Construct::Heading => "heading",
            Construct::BlockText => "block_text",
            Construct::BlockCode => "block_code",
            Construct::BlockCodeWithLang => "block_code_with_lang",
            Construct::BlockQuote => "block_quote",
            Construct::BlockMath => "block_math",
            Construct::ThematicBreak => "thematic_break",
            Construct::BlankLine => "blank_line",
            Construct::ListItem => "list_item",
            Construct::OrderedList => "ordered_list",
            Construct::UnorderedList => "unordered_list",
            Construct::Table => "table",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Construct::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn placeholders(self) -> &'static [Placeholder] {
        use Placeholder as P;
        match self {
            Construct::Heading => &[P::HeadingType, P::Text],
            Construct::Link => &[P::Url, P::Text, P::Title],
            Construct::Image => &[P::Url, P::Alt, P::Label, P::Title],
            Construct::BlockCode => &[P::Code],
            Construct::BlockCodeWithLang => &[P::Lang, P::Code],
            Construct::Table => &[P::Counter, P::Alignment, P::Header, P::Body],
            Construct::Linebreak
            | Construct::Softbreak
            | Construct::ThematicBreak
            | Construct::BlankLine => &[],
            _ => &[P::Text],
        }
    }

    pub fn accepts(self, placeholder: Placeholder) -> bool {
        self.placeholders().contains(&placeholder)
    }

    /// Built-in template used when a config does not provide one.
    pub fn default_template(self) -> &'static str {
        match self {
            Construct::Text => "<text>",
            Construct::Emphasis => "\\emph{<text>}",
            Construct::Strong => "\\textbf{<text>}",
            Construct::Link => "\\href{<url>}{<text>}",
            Construct::Image => {
                "\n\\begin{figure}[H]\n    \\centering\n    \\includegraphics[width=0.8\\textwidth]{<url>}\n    \\caption{<alt>}\n    \\label{fig:<label>}\n\\end{figure}"
            }
            Construct::Codespan => "\\texttt{<text>}",
            Construct::Linebreak => "\\\\",
            Construct::Softbreak => " ",
            Construct::InlineMath => "$<text>$",
            Construct::Paragraph => "\n<text>\n",
            Construct::Heading => "\\<heading_type>{<text>}",
            Construct::BlockText => "<text>",
            Construct::BlockCode => "\n\\begin{verbatim}\n<code>\n\\end{verbatim}",
            Construct::BlockCodeWithLang => {
                "\n\\begin{lstlisting}[language=<lang>]\n<code>\n\\end{lstlisting}"
            }
            Construct::BlockQuote => "\n\\begin{quote}\n<text>\n\\end{quote}",
            Construct::BlockMath => "\n\\begin{equation}\n<text>\n\\end{equation}",
            Construct::ThematicBreak => "\\noindent\\rule{\\textwidth}{1pt}",
            Construct::BlankLine => "\n",
            Construct::ListItem => "\\item <text>",
            Construct::OrderedList => "\n\\begin{enumerate}\n<text>\n\\end{enumerate}",
            Construct::UnorderedList => "\n\\begin{itemize}\n<text>\n\\end{itemize}",
            Construct::Table => {
                "\n\\begin{table}[H]\n    \\centering\n    \\caption{Table <counter>}\n    \\label{tab:table<counter>}\n    \\begin{tabular}{<alignment>}\n        \\hline\n        <header>\n        \\hline\n        <body>\n        \\hline\n    \\end{tabular}\n\\end{table}"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// A parsed template: literal text interleaved with placeholder slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source` for `construct`.
    ///
    /// `<name>` with `name` made of lowercase letters and underscores is a
    /// placeholder and must be one the construct provides. Anything else in
    /// angle brackets (`<!-- -->`, beamer overlays like `<2>`) is literal.
    pub fn parse(construct: Construct, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('<') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let name = after
                .find('>')
                .map(|close| &after[..close])
                .filter(|name| is_placeholder_name(name));

            match name {
                Some(name) => {
                    let placeholder = Placeholder::from_name(name)
                        .filter(|p| construct.accepts(*p))
                        .ok_or_else(|| TemplateError::UnknownPlaceholder {
                            construct: construct.key().to_string(),
                            placeholder: name.to_string(),
                        })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(placeholder));
                    rest = &after[name.len() + 1..];
                }
                None => {
                    literal.push('<');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// The built-in template for `construct`.
    pub fn builtin(construct: Construct) -> Self {
        let source = construct.default_template();
        Self::parse(construct, source).unwrap_or_else(|_| Self {
            segments: vec![Segment::Literal(source.to_string())],
        })
    }

    /// Substitute `values` in a single pass.
    ///
    /// Slots without a value render empty; values whose placeholder does not
    /// appear are dropped. Substituted text is never scanned again.
    pub fn render(&self, values: &[(Placeholder, &str)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(placeholder) => {
                    if let Some((_, value)) = values.iter().find(|(p, _)| p == placeholder) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Slot(placeholder))
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

/// Templates for every construct.
///
/// Lookup never fails: constructs the config left out keep their built-in
/// template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    templates: HashMap<Construct, Template>,
}

impl TemplateSet {
    /// Build from a flat `construct → template` map.
    ///
    /// Unknown keys are ignored; entries that fail to parse keep the
    /// built-in template and are reported as warnings.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let mut set = Self::default();
        let mut keys: Vec<_> = map.keys().collect();
        keys.sort();
        for key in keys {
            let Some(construct) = Construct::from_key(key) else {
                debug!(key = %key, "ignoring config entry for unknown construct");
                continue;
            };
            match Template::parse(construct, &map[key]) {
                Ok(template) => set.set(construct, template),
                Err(err) => warn!("{err}; keeping the built-in template"),
            }
        }
        set
    }

    pub fn get(&self, construct: Construct) -> &Template {
        // Every construct is inserted by `Default`.
        &self.templates[&construct]
    }

    pub fn set(&mut self, construct: Construct, template: Template) {
        self.templates.insert(construct, template);
    }

    /// Render `construct` with `values`.
    pub fn fill(&self, construct: Construct, values: &[(Placeholder, &str)]) -> String {
        self.get(construct).render(values)
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        let templates = Construct::ALL
            .into_iter()
            .map(|construct| (construct, Template::builtin(construct)))
            .collect();
        Self { templates }
    }
}
