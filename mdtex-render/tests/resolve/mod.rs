use crate::common::body_only;
use mdtex_render::resolve::{load_config_map, resolve_config_map};
use mdtex_render::template::CONTENT_MARKER;
use mdtex_render::{convert_str, resolve_template, ConfigMap, ConfigSource, DocumentTemplate, TemplateSource};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn named(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn academic_merges_over_default() {
    let map = resolve_config_map(&ConfigSource::from("academic"), None);
    assert_eq!(map["heading"], "\n\\<heading_type>{<text>}\n");
    assert_eq!(map["emphasis"], "\\textit{<text>}");
    // Not in academic, inherited from default.
    assert_eq!(map["text"], "<text>");
}

#[test]
fn overrides_beat_named_configs() {
    let mut overrides = ConfigMap::new();
    overrides.insert("heading".to_string(), "H<text>".to_string());
    let map = resolve_config_map(&ConfigSource::from("academic"), Some(&overrides));
    assert_eq!(map["heading"], "H<text>");
}

#[test]
fn misspelled_placeholder_keeps_builtin_template() {
    let options = body_only().with_override("heading", "\\<heading_types>{<text>}");
    let body = convert_str("# X", &options).unwrap();
    assert_eq!(body, "\\section{X}");
}

#[test]
fn missing_config_file_uses_default() {
    let dir = tempdir().unwrap();
    let missing = named(&dir.path().join("absent.toml"));
    assert_eq!(load_config_map(&missing), load_config_map("default"));
}

#[test]
fn yaml_config_file_merges_over_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    fs::write(&path, "strong: '\\textsf{<text>}'\n").unwrap();

    let map = load_config_map(&named(&path));
    let default = load_config_map("default");
    assert_eq!(map["strong"], "\\textsf{<text>}");
    assert_eq!(map["heading"], default["heading"]);
    assert_eq!(map.len(), default.len());
}

#[test]
fn corrupt_config_file_uses_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "strong = = \"\n[[[").unwrap();
    assert_eq!(load_config_map(&named(&path)), load_config_map("default"));
}

#[test]
fn missing_template_file_uses_basic() {
    let dir = tempdir().unwrap();
    let missing = TemplateSource::Named(named(&dir.path().join("absent.tex")));
    assert_eq!(resolve_template(&missing), resolve_template(&TemplateSource::default()));
}

#[test]
fn template_without_marker_uses_skeleton() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.tex");
    fs::write(&path, "\\documentclass{article}\n").unwrap();
    let doc = resolve_template(&TemplateSource::Named(named(&path)));
    assert_eq!(doc, DocumentTemplate::skeleton());
}

#[test]
fn template_file_with_marker_is_used() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.tex");
    fs::write(&path, format!("HEAD\n{CONTENT_MARKER}\nTAIL")).unwrap();
    let doc = resolve_template(&TemplateSource::Named(named(&path)));
    assert_eq!(doc.wrap("body"), "HEAD\nbody\nTAIL");
}
