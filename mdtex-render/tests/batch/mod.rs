use mdtex_render::{convert_batch, ConvertOptions};
use std::fs;
use tempfile::tempdir;

const TWO_TABLES: &str = "| A |\n|---|\n| 1 |\n\nbetween\n\n| B |\n|---|\n| 2 |\n";

#[test]
fn table_numbering_restarts_per_document() {
    let dir = tempdir().unwrap();
    let inputs: Vec<_> = ["first.md", "second.md"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, TWO_TABLES).unwrap();
            path
        })
        .collect();
    let out_dir = dir.path().join("out");

    let outcomes = convert_batch(&inputs, Some(&out_dir), &ConvertOptions::default(), 2);
    assert!(outcomes.iter().all(|o| o.is_ok()));

    for stem in ["first", "second"] {
        let latex = fs::read_to_string(out_dir.join(format!("{stem}.tex"))).unwrap();
        assert!(latex.contains("\\caption{Table 1}"));
        assert!(latex.contains("\\caption{Table 2}"));
        assert!(!latex.contains("Table 3"));
    }
}

#[test]
fn outputs_default_to_input_directory() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("note.md");
    fs::write(&input, "# Note\n").unwrap();

    let outcomes = convert_batch(&[input], None, &ConvertOptions::default(), 1);
    assert_eq!(outcomes[0].result.as_ref().unwrap(), &dir.path().join("note.tex"));
}

#[test]
fn json_inputs_are_detected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tokens.json");
    fs::write(&input, r#"[{"type": "paragraph", "children": [{"type": "text", "raw": "hi"}]}]"#)
        .unwrap();

    let outcomes = convert_batch(&[input], None, &ConvertOptions::default(), 1);
    let written = outcomes[0].result.as_ref().unwrap();
    assert!(fs::read_to_string(written).unwrap().contains("\nhi\n"));
}

#[test]
fn dotted_names_do_not_collide_in_output_dir() {
    let dir = tempdir().unwrap();
    let inputs: Vec<_> = ["report.v1.md", "report.v2.md"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let path = dir.path().join(name);
            fs::write(&path, format!("# Version {}\n", i + 1)).unwrap();
            path
        })
        .collect();
    let out_dir = dir.path().join("out");

    let outcomes = convert_batch(&inputs, Some(&out_dir), &ConvertOptions::default(), 2);
    let written: Vec<_> = outcomes.iter().map(|o| o.result.clone().unwrap()).collect();
    assert_eq!(written, vec![out_dir.join("report.v1.tex"), out_dir.join("report.v2.tex")]);
    assert!(fs::read_to_string(&written[0]).unwrap().contains("Version 1"));
    assert!(fs::read_to_string(&written[1]).unwrap().contains("Version 2"));
}
