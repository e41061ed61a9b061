//! LaTeX metacharacter escaping

/// Replacement for a reserved LaTeX character, if it is one.
fn replacement(ch: char) -> Option<&'static str> {
    match ch {
        '\\' => Some("\\textbackslash{}"),
        '{' => Some("\\{"),
        '}' => Some("\\}"),
        '$' => Some("\\$"),
        '&' => Some("\\&"),
        '%' => Some("\\%"),
        '#' => Some("\\#"),
        '^' => Some("\\textasciicircum{}"),
        '_' => Some("\\_"),
        '~' => Some("\\textasciitilde{}"),
        _ => None,
    }
}

/// Escape every reserved LaTeX character in `text`.
///
/// Each input character is visited once, so the braces and backslashes
/// introduced by a replacement are never escaped again.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match replacement(ch) {
            Some(escaped) => out.push_str(escaped),
            None => out.push(ch),
        }
    }
    out
}
