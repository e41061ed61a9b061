use crate::common::{body_only, render_body};
use insta::assert_snapshot;
use mdtex_render::template::CONTENT_MARKER;
use mdtex_render::token::MAX_DEPTH;
use mdtex_render::{
    convert_str, convert_tokens, ConvertError, ConvertOptions, JsonTokenizer, Token, TokenKind,
    TemplateSource, Tokenizer,
};

#[test]
fn heading_and_paragraph_end_to_end() {
    let body = render_body("# Title\n\nHello **world**.");
    assert_eq!(body, "\n\\section{Title}\n\nHello \\textbf{world}.\n");
}

#[test]
fn full_document_uses_basic_template() {
    let latex = convert_str("# Title\n\nHello **world**.", &ConvertOptions::default()).unwrap();
    assert!(latex.starts_with("\\documentclass[UTF8, a4paper, 12pt]{ctexart}"));
    assert!(latex.contains("\\begin{document}\n\n\n\\section{Title}"));
    assert!(latex.trim_end().ends_with("\\end{document}"));
    assert!(!latex.contains(CONTENT_MARKER));
}

#[test]
fn two_by_two_table() {
    let body = render_body("| A | B |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n");
    assert_snapshot!(body.trim(), @r"
\begin{table}[H]
    \centering
    \caption{Table 1}
    \label{tab:table1}
    \begin{tabular}{|l|l|}
        \hline
        \textbf{A} & \textbf{B} \\
        \hline
        1 & 2 \\
        3 & 4 \\
        \hline
    \end{tabular}
\end{table}
");
}

#[test]
fn tables_in_one_document_are_numbered_in_order() {
    let table = "| A |\n|---|\n| 1 |\n";
    let body = render_body(&format!("{table}\ntext\n\n{table}"));
    assert!(body.contains("\\caption{Table 1}"));
    assert!(body.contains("\\caption{Table 2}"));
    assert!(body.find("table1").unwrap() < body.find("table2").unwrap());
}

#[test]
fn column_alignment_is_not_applied() {
    let body = render_body("| L | C | R |\n|:--|:-:|--:|\n| 1 | 2 | 3 |\n");
    assert!(body.contains("\\begin{tabular}{|l|l|l|}"));
}

#[test]
fn escaped_ampersands_in_cells_do_not_add_columns() {
    let tokens: Vec<Token> = JsonTokenizer
        .tokenize(
            r#"[{"type": "table", "children": [
                {"type": "table_head", "children": []},
                {"type": "table_body", "children": [
                    {"type": "table_row", "children": [
                        {"type": "table_cell", "attrs": {"align": null, "head": false},
                         "children": [{"type": "text", "raw": "R&D"}]},
                        {"type": "table_cell", "attrs": {"align": null, "head": false},
                         "children": [{"type": "text", "raw": "Q&A"}]}
                    ]}
                ]}
            ]}]"#,
        )
        .unwrap();
    let body = convert_tokens(&tokens, &body_only());
    assert!(body.contains("\\begin{tabular}{|l|l|}"));
    assert!(body.contains("R\\&D & Q\\&A \\\\"));
}

#[test]
fn code_languages_are_mapped() {
    let js = render_body("```javascript\nx=1\n```\n");
    assert_eq!(js, "\n\\begin{lstlisting}[language=Java]\nx=1\n\\end{lstlisting}");

    let py = render_body("```python\nprint(1)\n```\n");
    assert!(py.contains("[language=python]\nprint(1)\n"));

    let plain = render_body("```\nplain\n```\n");
    assert_eq!(plain, "\n\\begin{verbatim}\nplain\n\\end{verbatim}");
    assert!(!plain.contains("lstlisting"));
}

#[test]
fn code_is_not_escaped() {
    let body = render_body("```\n$x_1 & 100%\n```\n");
    assert!(body.contains("$x_1 & 100%"));
}

#[test]
fn text_and_inline_code_are_escaped() {
    let body = render_body("Costs 50% & more_than $5 #1 `a_b`");
    assert_eq!(
        body,
        "\nCosts 50\\% \\& more\\_than \\$5 \\#1 \\texttt{a\\_b}\n"
    );
}

#[test]
fn escaping_can_be_turned_off() {
    let body = convert_str("a_b", &body_only().with_escape(false)).unwrap();
    assert_eq!(body, "\na_b\n");
}

#[test]
fn deep_headings_clamp() {
    assert_eq!(render_body("###### Six"), "\n\\subparagraph{Six}");
}

#[test]
fn bmp_images_get_a_format_note() {
    let body = render_body("![Diagram](figs/arch.bmp)");
    assert!(body.contains(
        "% Image format note: BMP images may need to be converted to PNG\n\n\\begin{figure}[H]"
    ));
    assert!(body.contains("\\includegraphics[width=0.8\\textwidth]{figs/arch.bmp}"));
    assert!(body.contains("\\label{fig:diagram}"));
}

#[test]
fn png_images_have_no_note() {
    let body = render_body("![Diagram](figs/arch.png)");
    assert!(!body.contains("Image format note"));
    assert!(body.contains("\\caption{Diagram}"));
}

#[test]
fn lists_render_through_list_templates() {
    let bullets = render_body("- a\n- b\n");
    assert_eq!(bullets, "\n\\begin{itemize}\n\\item a\\item b\n\\end{itemize}");
    let numbers = render_body("1. a\n2. b\n");
    assert!(numbers.starts_with("\n\\begin{enumerate}\n"));
}

#[test]
fn math_passes_through_unescaped() {
    let body = render_body("Area $r^2$\n\n$$E = mc^2$$\n");
    assert!(body.contains("Area $r^2$"));
    assert!(body.contains("\\begin{equation}\nE = mc^2\n\\end{equation}"));
}

#[test]
fn links_use_url_and_text() {
    let body = render_body("[docs](https://example.com/a_b)");
    assert_eq!(body, "\n\\href{https://example.com/a_b}{docs}\n");
}

#[test]
fn document_marker_is_replaced_exactly_once() {
    let tokens = vec![Token::parent(
        TokenKind::Paragraph,
        vec![Token::text(format!("see {CONTENT_MARKER} here"))],
    )];
    let options = ConvertOptions::new()
        .with_escape(false)
        .with_template(TemplateSource::Literal(format!("BEGIN\n{CONTENT_MARKER}\nEND")));
    let latex = convert_tokens(&tokens, &options);
    assert_eq!(latex, format!("BEGIN\n\nsee {CONTENT_MARKER} here\n\nEND"));
}

#[test]
fn mistune_json_renders_and_skips_unknown_tokens() {
    let tokens = JsonTokenizer
        .tokenize(
            r#"[
                {"type": "heading", "attrs": {"level": 2}, "style": "atx",
                 "children": [{"type": "text", "raw": "Setup"}]},
                {"type": "blank_line"},
                {"type": "footnote_ref", "raw": "1"},
                {"type": "block_code", "raw": "ls\n", "style": "fenced",
                 "attrs": {"info": "bash"}}
            ]"#,
        )
        .unwrap();
    let body = convert_tokens(&tokens, &body_only());
    assert_eq!(
        body,
        "\n\\subsection{Setup}\n\n\\begin{lstlisting}[language=bash]\nls\n\\end{lstlisting}"
    );
}

#[test]
fn chinese_config_localizes_table_captions() {
    let options = body_only().with_config("chinese");
    let body = convert_str("| A |\n|---|\n| 1 |\n", &options).unwrap();
    assert!(body.contains("\\caption{表格 1}"));
}

#[test]
fn deeply_nested_quotes_render_without_overflow() {
    let source = format!("{}innermost\n", "> ".repeat(10_000));
    let body = render_body(&source);
    assert_eq!(body.matches("\\begin{quote}").count(), MAX_DEPTH);
    assert!(body.contains("innermost"));
}

#[test]
fn deeply_nested_json_is_a_tokenize_error() {
    let depth = 10_000;
    let json = format!(
        "[{}{{\"type\": \"text\", \"raw\": \"x\"}}{}]",
        r#"{"type": "block_quote", "children": ["#.repeat(depth),
        "]}".repeat(depth)
    );
    let err = JsonTokenizer.tokenize(&json).unwrap_err();
    assert!(matches!(err, ConvertError::Tokenize(_)));
}
