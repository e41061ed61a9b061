//! Markdown tokenizer (comrak)
//!
//! Parses CommonMark plus GFM tables and `$` math with comrak and reshapes
//! the AST into the mistune token layout the renderer expects:
//!
//! - top-level blocks are separated by `blank_line` tokens,
//! - paragraphs directly inside tight list items become `block_text`,
//! - a paragraph holding nothing but `$$...$$` becomes `block_math`,
//! - table header cells sit directly under `table_head`, body cells under
//!   `table_row`, each carrying `head` and `align` attributes.
//!
//! Nodes without a counterpart become [`TokenKind::Unknown`] so the renderer
//! skips them. Nodes nested deeper than [`MAX_DEPTH`] collapse into a
//! paragraph (or text) holding their literal text.

use super::Tokenizer;
use crate::error::ConvertError;
use crate::token::{Token, TokenKind, MAX_DEPTH};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakTokenizer;

impl ComrakTokenizer {
    pub const NAME: &'static str = "markdown";
}

impl Tokenizer for ComrakTokenizer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "CommonMark with tables and math"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn tokenize(&self, source: &str) -> Result<Vec<Token>, ConvertError> {
        let arena = Arena::new();
        let options = default_comrak_options();
        let root = parse_document(&arena, source, &options);

        let blocks: Vec<Token> = root
            .children()
            .filter_map(|node| block_token(node, &BlockContext::default()))
            .collect();

        let mut tokens = Vec::with_capacity(blocks.len() * 2);
        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 {
                tokens.push(Token::empty(TokenKind::BlankLine));
            }
            tokens.push(block);
        }
        Ok(tokens)
    }
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.math_dollars = true;
    options
}

#[derive(Debug, Clone, Copy, Default)]
struct BlockContext {
    /// Inside an item of a tight list
    tight: bool,
    /// Nesting depth of the enclosing list
    depth: usize,
    /// Token depth of this node
    nesting: usize,
}

impl BlockContext {
    fn nested(&self) -> Self {
        BlockContext {
            nesting: self.nesting + 1,
            ..*self
        }
    }
}

fn block_token<'a>(node: &'a AstNode<'a>, ctx: &BlockContext) -> Option<Token> {
    if ctx.nesting >= MAX_DEPTH {
        let text = flat_text(node);
        return Some(Token::parent(TokenKind::Paragraph, vec![Token::text(text)]));
    }

    let data = node.data.borrow();
    let inline_depth = ctx.nesting + 1;
    let token = match &data.value {
        NodeValue::Heading(heading) => {
            Token::parent(TokenKind::Heading, inline_children(node, inline_depth))
                .with_attr("level", heading.level)
        }

        NodeValue::Paragraph => {
            if let Some(math) = lone_display_math(node) {
                Token::raw(TokenKind::BlockMath, math)
            } else if ctx.tight {
                Token::parent(TokenKind::BlockText, inline_children(node, inline_depth))
            } else {
                Token::parent(TokenKind::Paragraph, inline_children(node, inline_depth))
            }
        }

        NodeValue::List(list) => {
            let item_ctx = BlockContext {
                tight: list.tight,
                depth: ctx.depth + 1,
                nesting: ctx.nesting + 1,
            };
            let items = node
                .children()
                .filter_map(|item| block_token(item, &item_ctx))
                .collect();
            Token::parent(TokenKind::List, items)
                .with_attr("ordered", matches!(list.list_type, ListType::Ordered))
                .with_attr("depth", ctx.depth)
        }

        NodeValue::Item(_) => {
            let child_ctx = ctx.nested();
            let blocks = node
                .children()
                .filter_map(|child| block_token(child, &child_ctx))
                .collect();
            Token::parent(TokenKind::ListItem, blocks)
        }

        NodeValue::CodeBlock(code) => {
            let token = Token::raw(TokenKind::BlockCode, code.literal.clone());
            match code.info.trim() {
                "" => token,
                info => token.with_attr("info", info),
            }
        }

        NodeValue::BlockQuote => {
            let quote_ctx = BlockContext {
                tight: false,
                ..ctx.nested()
            };
            let blocks = node
                .children()
                .filter_map(|child| block_token(child, &quote_ctx))
                .collect();
            Token::parent(TokenKind::BlockQuote, blocks)
        }

        NodeValue::ThematicBreak => Token::empty(TokenKind::ThematicBreak),

        NodeValue::Table(table) => table_token(node, &table.alignments, ctx.nesting),

        NodeValue::HtmlBlock(html) => {
            Token::raw(TokenKind::Unknown("block_html".to_string()), html.literal.clone())
        }

        NodeValue::FrontMatter(_) => return None,

        _ => Token::empty(TokenKind::Unknown(node_name(&data.value).to_string())),
    };
    Some(token)
}

/// `$$...$$` alone in a paragraph renders as display math.
fn lone_display_math<'a>(paragraph: &'a AstNode<'a>) -> Option<String> {
    let mut children = paragraph.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match &only.data.borrow().value {
        NodeValue::Math(math) if math.display_math => Some(math.literal.clone()),
        _ => None,
    }
}

fn table_token<'a>(node: &'a AstNode<'a>, alignments: &[TableAlignment], nesting: usize) -> Token {
    // table > section > row > cell > inline
    let cell_depth = nesting + 4;
    let mut head = Vec::new();
    let mut rows = Vec::new();

    for row in node.children() {
        let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
        let cells: Vec<Token> = row
            .children()
            .enumerate()
            .map(|(column, cell)| {
                let mut token = Token::parent(TokenKind::TableCell, inline_children(cell, cell_depth))
                    .with_attr("head", is_header);
                if let Some(align) = alignments.get(column).and_then(|a| alignment_name(*a)) {
                    token = token.with_attr("align", align);
                }
                token
            })
            .collect();

        if is_header {
            head.extend(cells);
        } else {
            rows.push(Token::parent(TokenKind::TableRow, cells));
        }
    }

    Token::parent(
        TokenKind::Table,
        vec![
            Token::parent(TokenKind::TableHead, head),
            Token::parent(TokenKind::TableBody, rows),
        ],
    )
}

fn alignment_name(alignment: TableAlignment) -> Option<&'static str> {
    match alignment {
        TableAlignment::Left => Some("left"),
        TableAlignment::Center => Some("center"),
        TableAlignment::Right => Some("right"),
        TableAlignment::None => None,
    }
}

fn inline_children<'a>(node: &'a AstNode<'a>, depth: usize) -> Vec<Token> {
    node.children().map(|child| inline_token(child, depth)).collect()
}

fn inline_token<'a>(node: &'a AstNode<'a>, depth: usize) -> Token {
    if depth >= MAX_DEPTH {
        return Token::text(flat_text(node));
    }

    let data = node.data.borrow();
    let nested = depth + 1;
    match &data.value {
        NodeValue::Text(text) => Token::text(text.clone()),
        NodeValue::Emph => Token::parent(TokenKind::Emphasis, inline_children(node, nested)),
        NodeValue::Strong => Token::parent(TokenKind::Strong, inline_children(node, nested)),
        NodeValue::Code(code) => Token::raw(TokenKind::Codespan, code.literal.clone()),
        NodeValue::Link(link) => {
            let token = Token::parent(TokenKind::Link, inline_children(node, nested))
                .with_attr("url", link.url.clone());
            with_title(token, &link.title)
        }
        NodeValue::Image(link) => {
            let token = Token::parent(TokenKind::Image, inline_children(node, nested))
                .with_attr("url", link.url.clone());
            with_title(token, &link.title)
        }
        NodeValue::SoftBreak => Token::empty(TokenKind::Softbreak),
        NodeValue::LineBreak => Token::empty(TokenKind::Linebreak),
        NodeValue::Math(math) if math.display_math => {
            Token::raw(TokenKind::BlockMath, math.literal.clone())
        }
        NodeValue::Math(math) => Token::raw(TokenKind::InlineMath, math.literal.clone()),
        NodeValue::HtmlInline(html) => {
            Token::raw(TokenKind::Unknown("inline_html".to_string()), html.clone())
        }
        other => Token::parent(
            TokenKind::Unknown(node_name(other).to_string()),
            inline_children(node, nested),
        ),
    }
}

/// Literal text of a subtree. `descendants` walks iteratively.
fn flat_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::CodeBlock(code) => out.push_str(&code.literal),
            NodeValue::Math(math) => out.push_str(&math.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => {}
        }
    }
    out
}

fn with_title(token: Token, title: &str) -> Token {
    if title.is_empty() {
        token
    } else {
        token.with_attr("title", title)
    }
}

/// Token type name for comrak nodes that have no renderer.
fn node_name(value: &NodeValue) -> &'static str {
    match value {
        NodeValue::Strikethrough => "strikethrough",
        NodeValue::FootnoteDefinition(_) => "footnote_definition",
        NodeValue::FootnoteReference(_) => "footnote_ref",
        NodeValue::TaskItem(_) => "task_list_item",
        NodeValue::DescriptionList => "def_list",
        _ => "unsupported",
    }
}
