//! Token tree to LaTeX renderer
//!
//! [`LatexRenderer`] walks a token tree once. Each token's content is its
//! `raw` text when present, otherwise the concatenation of its rendered
//! children, and is handed to the construct renderer for its kind together
//! with its attributes. Tables are the exception: they need the structure of
//! their subtree, so the table family receives the token itself.
//!
//! A renderer owns its table counter, so build a fresh one per document.
//! Subtrees nested deeper than [`MAX_DEPTH`] render as their escaped plain
//! text.

use crate::code::listings_language;
use crate::escape::escape_latex;
use crate::heading::HeadingLevelTable;
use crate::image::{figure_label, ImageFormat, ImagePathPolicy};
use crate::table::TableAssembly;
use crate::template::{Construct, DocumentTemplate, Placeholder, TemplateSet};
use crate::token::{Token, TokenKind, MAX_DEPTH};
use std::borrow::Cow;
use std::slice;
use tracing::{debug, trace};

/// Per-conversion rendering knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape LaTeX metacharacters in text and inline code
    pub escape: bool,
    pub heading_levels: HeadingLevelTable,
    pub image_paths: ImagePathPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape: true,
            heading_levels: HeadingLevelTable::default(),
            image_paths: ImagePathPolicy::default(),
        }
    }
}

pub struct LatexRenderer<'a> {
    templates: &'a TemplateSet,
    options: RenderOptions,
    table_counter: usize,
    depth: usize,
}

impl<'a> LatexRenderer<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self::with_options(templates, RenderOptions::default())
    }

    pub fn with_options(templates: &'a TemplateSet, options: RenderOptions) -> Self {
        Self {
            templates,
            options,
            table_counter: 0,
            depth: 0,
        }
    }

    /// Number of tables rendered so far.
    pub fn table_counter(&self) -> usize {
        self.table_counter
    }

    /// Render `tokens` and insert the result into `document`.
    pub fn render_document(&mut self, tokens: &[Token], document: &DocumentTemplate) -> String {
        let body = self.render_tokens(tokens);
        document.wrap(&body)
    }

    pub fn render_tokens(&mut self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            out.push_str(&self.render_token(token));
        }
        out
    }

    pub fn render_token(&mut self, token: &Token) -> String {
        if self.depth >= MAX_DEPTH {
            trace!(kind = %token.kind.name(), "flattening token below the depth cap");
            return self.text(&token.plain_text());
        }
        self.depth += 1;
        let out = self.render_nested(token);
        self.depth -= 1;
        out
    }

    fn render_nested(&mut self, token: &Token) -> String {
        match token.kind {
            TokenKind::Table => return self.table(token),
            TokenKind::TableHead | TokenKind::TableBody | TokenKind::TableRow => {
                return self.table_section(token)
            }
            TokenKind::TableCell => return self.table_cell(token),
            _ => {}
        }

        let content = match (&token.raw, &token.children) {
            (Some(raw), _) => Some(Cow::Borrowed(raw.as_str())),
            (None, Some(children)) => Some(Cow::Owned(self.render_tokens(children))),
            (None, None) => None,
        };
        self.render_construct(token, content.as_deref().unwrap_or_default())
    }

    fn render_construct(&self, token: &Token, text: &str) -> String {
        let attrs = &token.attrs;
        match &token.kind {
            TokenKind::Text => self.text(text),
            TokenKind::Emphasis => self.emphasis(text),
            TokenKind::Strong => self.strong(text),
            TokenKind::Link => self.link(
                text,
                attrs.get_str("url").unwrap_or_default(),
                attrs.get_str("title"),
            ),
            TokenKind::Image => self.image(
                text,
                attrs.get_str("url").unwrap_or_default(),
                attrs.get_str("title"),
            ),
            TokenKind::Codespan => self.codespan(text),
            TokenKind::Linebreak => self.linebreak(),
            TokenKind::Softbreak => self.softbreak(),
            TokenKind::InlineMath => self.inline_math(text),
            TokenKind::Paragraph => self.paragraph(text),
            TokenKind::Heading => self.heading(text, attrs.get_usize("level").unwrap_or(1)),
            TokenKind::BlockText => self.block_text(text),
            TokenKind::BlockCode => self.block_code(text, attrs.get_str("info")),
            TokenKind::BlockQuote => self.block_quote(text),
            TokenKind::BlockMath => self.block_math(text),
            TokenKind::ThematicBreak => self.thematic_break(),
            TokenKind::BlankLine => self.blank_line(),
            TokenKind::List => self.list(text, attrs.get_bool("ordered")),
            TokenKind::OrderedList => self.ordered_list(text),
            TokenKind::UnorderedList => self.unordered_list(text),
            TokenKind::ListItem => self.list_item(text),
            // Routed to the table renderers before content is computed.
            TokenKind::Table
            | TokenKind::TableHead
            | TokenKind::TableBody
            | TokenKind::TableRow
            | TokenKind::TableCell => String::new(),
            TokenKind::Unknown(name) => {
                trace!(kind = %name, "skipping token without a renderer");
                String::new()
            }
        }
    }

    fn fill_text(&self, construct: Construct, text: &str) -> String {
        self.templates.fill(construct, &[(Placeholder::Text, text)])
    }

    // Inline constructs

    pub fn text(&self, text: &str) -> String {
        let text = if self.options.escape {
            Cow::Owned(escape_latex(text))
        } else {
            Cow::Borrowed(text)
        };
        self.fill_text(Construct::Text, &text)
    }

    pub fn emphasis(&self, text: &str) -> String {
        self.fill_text(Construct::Emphasis, text)
    }

    pub fn strong(&self, text: &str) -> String {
        self.fill_text(Construct::Strong, text)
    }

    pub fn link(&self, text: &str, url: &str, title: Option<&str>) -> String {
        self.templates.fill(
            Construct::Link,
            &[
                (Placeholder::Url, url),
                (Placeholder::Text, text),
                (Placeholder::Title, title.unwrap_or_default()),
            ],
        )
    }

    /// Render an image, prefixed with a LaTeX comment when the file format
    /// is not one `graphicx` includes directly.
    pub fn image(&self, alt: &str, url: &str, title: Option<&str>) -> String {
        let url = self.options.image_paths.resolve(url);
        let label = figure_label(alt);
        let figure = self.templates.fill(
            Construct::Image,
            &[
                (Placeholder::Url, &*url),
                (Placeholder::Alt, alt),
                (Placeholder::Label, label.as_str()),
                (Placeholder::Title, title.unwrap_or_default()),
            ],
        );

        match ImageFormat::classify(&url).warning() {
            Some(note) => {
                debug!(url = %url, "{note}");
                format!("% Image format note: {note}\n{figure}")
            }
            None => figure,
        }
    }

    pub fn codespan(&self, code: &str) -> String {
        let code = if self.options.escape {
            Cow::Owned(escape_latex(code))
        } else {
            Cow::Borrowed(code)
        };
        self.fill_text(Construct::Codespan, &code)
    }

    pub fn linebreak(&self) -> String {
        self.templates.fill(Construct::Linebreak, &[])
    }

    pub fn softbreak(&self) -> String {
        self.templates.fill(Construct::Softbreak, &[])
    }

    pub fn inline_math(&self, math: &str) -> String {
        self.fill_text(Construct::InlineMath, math)
    }

    // Block constructs

    pub fn paragraph(&self, text: &str) -> String {
        self.fill_text(Construct::Paragraph, text)
    }

    pub fn heading(&self, text: &str, level: usize) -> String {
        let command = self.options.heading_levels.command_for(level);
        self.templates.fill(
            Construct::Heading,
            &[(Placeholder::HeadingType, command), (Placeholder::Text, text)],
        )
    }

    pub fn block_text(&self, text: &str) -> String {
        self.fill_text(Construct::BlockText, text)
    }

    /// Verbatim block without a language, `listings` block with one.
    pub fn block_code(&self, code: &str, info: Option<&str>) -> String {
        let code = code.strip_suffix('\n').unwrap_or(code);
        match listings_language(info) {
            Some(lang) => self.templates.fill(
                Construct::BlockCodeWithLang,
                &[(Placeholder::Lang, lang), (Placeholder::Code, code)],
            ),
            None => self
                .templates
                .fill(Construct::BlockCode, &[(Placeholder::Code, code)]),
        }
    }

    pub fn block_quote(&self, text: &str) -> String {
        self.fill_text(Construct::BlockQuote, text)
    }

    pub fn block_math(&self, math: &str) -> String {
        self.fill_text(Construct::BlockMath, math)
    }

    pub fn thematic_break(&self) -> String {
        self.templates.fill(Construct::ThematicBreak, &[])
    }

    pub fn blank_line(&self) -> String {
        self.templates.fill(Construct::BlankLine, &[])
    }

    // Lists

    pub fn list(&self, items: &str, ordered: bool) -> String {
        if ordered {
            self.ordered_list(items)
        } else {
            self.unordered_list(items)
        }
    }

    pub fn ordered_list(&self, items: &str) -> String {
        self.fill_text(Construct::OrderedList, items)
    }

    pub fn unordered_list(&self, items: &str) -> String {
        self.fill_text(Construct::UnorderedList, items)
    }

    pub fn list_item(&self, text: &str) -> String {
        self.fill_text(Construct::ListItem, text)
    }

    // Tables

    /// Render a whole table. Bumps the table counter before filling the
    /// template, so the first table of a document is numbered 1.
    pub fn table(&mut self, token: &Token) -> String {
        self.table_counter += 1;
        let counter = self.table_counter.to_string();
        let assembly = self.assemble_table(token);
        let alignment = assembly.alignment_spec();
        let header = assembly.header_line();
        let body = assembly.body_lines();

        self.templates.fill(
            Construct::Table,
            &[
                (Placeholder::Counter, counter.as_str()),
                (Placeholder::Alignment, alignment.as_str()),
                (Placeholder::Header, header.as_str()),
                (Placeholder::Body, body.as_str()),
            ],
        )
    }

    /// Collect header cells and body rows of a table token.
    pub fn assemble_table(&mut self, token: &Token) -> TableAssembly {
        let mut assembly = TableAssembly::default();

        for section in token.children() {
            match section.kind {
                TokenKind::TableHead => {
                    for cell in head_cells(section) {
                        assembly.source_alignments.push(alignment_hint(cell));
                        let text = self.render_tokens(cell.children());
                        assembly.header.push(self.strong(&text));
                    }
                }
                TokenKind::TableBody => {
                    for row in section.children().iter().filter(|t| t.is(&TokenKind::TableRow)) {
                        let cells: Vec<&Token> = row
                            .children()
                            .iter()
                            .filter(|t| t.is(&TokenKind::TableCell))
                            .collect();
                        if cells.is_empty() {
                            continue;
                        }
                        if assembly.header.is_empty() && assembly.rows.is_empty() {
                            assembly.source_alignments =
                                cells.iter().map(|cell| alignment_hint(cell)).collect();
                        }
                        let rendered = cells.into_iter().map(|cell| self.table_cell(cell)).collect();
                        assembly.rows.push(rendered);
                    }
                }
                _ => {}
            }
        }

        assembly
    }

    /// Standalone head/body/row rendering: children concatenated.
    pub fn table_section(&mut self, token: &Token) -> String {
        self.render_tokens(token.children())
    }

    /// Cell content, bold when the cell is flagged as a header cell.
    pub fn table_cell(&mut self, token: &Token) -> String {
        let text = self.render_tokens(token.children());
        if token.attrs.get_bool("head") {
            self.strong(&text)
        } else {
            text
        }
    }
}

/// Header cells sit directly under `table_head`; a row wrapper is tolerated.
fn head_cells(head: &Token) -> impl Iterator<Item = &Token> {
    head.children()
        .iter()
        .flat_map(|child| {
            if child.is(&TokenKind::TableRow) {
                child.children()
            } else {
                slice::from_ref(child)
            }
        })
        .filter(|t| t.is(&TokenKind::TableCell))
}

fn alignment_hint(cell: &Token) -> Option<String> {
    cell.attrs.get_str("align").map(str::to_string)
}
