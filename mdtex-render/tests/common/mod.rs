use mdtex_render::template::CONTENT_MARKER;
use mdtex_render::{convert_str, ConvertOptions, TemplateSource};

/// Options whose document template is the bare marker, so output is the body.
pub fn body_only() -> ConvertOptions {
    ConvertOptions::new().with_template(TemplateSource::Literal(CONTENT_MARKER.to_string()))
}

pub fn render_body(markdown: &str) -> String {
    convert_str(markdown, &body_only()).unwrap()
}
