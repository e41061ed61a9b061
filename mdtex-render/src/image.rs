//! Image path, format and label handling
//!
//! Relative image paths are written by the author relative to the markdown
//! source, while LaTeX resolves them relative to where the `.tex` file is
//! compiled. Projects where those directories differ configure prefix
//! rewrites through [`ImagePathPolicy`]; nothing is rewritten by default.

use std::borrow::Cow;
use std::path::Path;

/// Replace a leading `from` with `to` in relative image paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

/// Ordered prefix rewrites applied to relative image paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePathPolicy {
    rewrites: Vec<PathRewrite>,
}

impl ImagePathPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rewrite(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rewrites.push(PathRewrite {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn rewrites(&self) -> &[PathRewrite] {
        &self.rewrites
    }

    /// Apply the first matching rewrite. Absolute paths are never touched.
    pub fn resolve<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if Path::new(url).is_absolute() {
            return Cow::Borrowed(url);
        }
        self.rewrites
            .iter()
            .find_map(|rule| {
                url.strip_prefix(rule.from.as_str())
                    .map(|rest| Cow::Owned(format!("{}{rest}", rule.to)))
            })
            .unwrap_or(Cow::Borrowed(url))
    }
}

/// How well a LaTeX engine handles an image file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    /// Included by `graphicx` as is
    Native,
    /// Known format that usually needs converting first
    NeedsConversion { reason: &'static str },
    /// Unrecognized or missing extension
    Unknown { extension: String },
}

impl ImageFormat {
    pub fn classify(url: &str) -> Self {
        let extension = Path::new(url)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" | "png" | "jpg" | "jpeg" => ImageFormat::Native,
            "bmp" => ImageFormat::NeedsConversion {
                reason: "BMP images may need to be converted to PNG",
            },
            "tiff" | "tif" => ImageFormat::NeedsConversion {
                reason: "TIFF images may need to be converted to PNG",
            },
            "gif" => ImageFormat::NeedsConversion {
                reason: "GIF images may need to be converted to PNG",
            },
            "webp" => ImageFormat::NeedsConversion {
                reason: "WebP images may need to be converted to PNG",
            },
            _ => ImageFormat::Unknown { extension },
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, ImageFormat::Native)
    }

    /// Human readable note for formats that are not natively supported.
    pub fn warning(&self) -> Option<String> {
        match self {
            ImageFormat::Native => None,
            ImageFormat::NeedsConversion { reason } => Some((*reason).to_string()),
            ImageFormat::Unknown { extension } if extension.is_empty() => {
                Some("image has no file extension, use PNG or JPEG".to_string())
            }
            ImageFormat::Unknown { extension } => Some(format!(
                "unknown image format .{extension}, use PNG or JPEG"
            )),
        }
    }
}

/// Derive a `\label` key from alt text: lowercase, non-alphanumerics to `_`.
pub fn figure_label(alt: &str) -> String {
    alt.to_lowercase()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}
