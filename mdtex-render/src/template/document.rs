use crate::error::TemplateError;

/// Marks where the rendered body goes in a document template.
pub const CONTENT_MARKER: &str = "<!-- INSERT_CONTENT -->";

const SKELETON_HEAD: &str = "\\documentclass[UTF8, a4paper, 12pt]{ctexart}

\\usepackage{amsmath}
\\usepackage{amssymb}
\\usepackage{graphicx}
\\usepackage{hyperref}

\\begin{document}

";

const SKELETON_TAIL: &str = "

\\end{document}
";

/// Top-level LaTeX wrapper split at its content marker.
///
/// Only the first marker counts. Keeping the halves apart means a body that
/// itself contains the marker text is inserted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    head: String,
    tail: String,
}

impl DocumentTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let (head, tail) = source
            .split_once(CONTENT_MARKER)
            .ok_or(TemplateError::MissingMarker(CONTENT_MARKER))?;
        Ok(Self {
            head: head.to_string(),
            tail: tail.to_string(),
        })
    }

    /// Minimal `ctexart` document used when no usable template is found.
    pub fn skeleton() -> Self {
        Self {
            head: SKELETON_HEAD.to_string(),
            tail: SKELETON_TAIL.to_string(),
        }
    }

    pub fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.head.len() + body.len() + self.tail.len());
        out.push_str(&self.head);
        out.push_str(body);
        out.push_str(&self.tail);
        out
    }
}
