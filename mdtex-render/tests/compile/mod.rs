#[cfg(all(unix, feature = "native-export"))]
mod unix {
    use mdtex_render::{CompileReport, ConvertError, LatexCompiler, LatexEngine};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    const SOURCE: &str = "\\documentclass{article}\\begin{document}x\\end{document}";
    const CITING_SOURCE: &str =
        "\\documentclass{article}\\begin{document}\\cite{knuth}\\bibliography{refs}\\end{document}";

    const STUB: &str = r#"#!/bin/sh
OUT=""
for arg in "$@"; do
  case $arg in
    -output-directory=*)
      OUT="${arg#*=}"
      ;;
  esac
done
echo run >> "__COUNTER__"
printf '%s\n' __LOG__ > "$OUT/document.log"
printf '%%PDF-1.5\n%%%%EOF\n' > "$OUT/document.pdf"
exit __STATUS__
"#;

    struct Stub {
        dir: TempDir,
        script: PathBuf,
    }

    impl Stub {
        fn runs(&self) -> usize {
            fs::read_to_string(self.dir.path().join("runs"))
                .map(|text| text.lines().count())
                .unwrap_or(0)
        }
    }

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let script = dir.join("fake-latex.sh");
        fs::write(&script, body).unwrap();
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
        script
    }

    fn stub_engine(log: &[&str], status: i32) -> Stub {
        let dir = tempdir().unwrap();
        let log_args: Vec<String> = log.iter().map(|line| format!("'{line}'")).collect();
        let body = STUB
            .replace("__COUNTER__", &dir.path().join("runs").to_string_lossy())
            .replace("__LOG__", &log_args.join(" "))
            .replace("__STATUS__", &status.to_string());
        let script = write_script(dir.path(), &body);
        Stub { dir, script }
    }

    /// A bibtex stand-in that records its arguments and working directory.
    fn stub_bibtex(stub: &Stub, status: i32) -> PathBuf {
        let calls = stub.dir.path().join("bibtex-calls");
        let body = format!(
            "#!/bin/sh\necho \"$* in $(basename \"$PWD\") with $BIBINPUTS\" >> \"{}\"\nexit {status}\n",
            calls.display()
        );
        let script = stub.dir.path().join("fake-bibtex.sh");
        fs::write(&script, body).unwrap();
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
        script
    }

    fn bibtex_calls(stub: &Stub) -> Vec<String> {
        fs::read_to_string(stub.dir.path().join("bibtex-calls"))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn compiles_with_stub_engine() {
        let stub = stub_engine(&["Output written on document.pdf (1 page)."], 0);
        let pdf = LatexCompiler::default()
            .with_binary(&stub.script)
            .compile(SOURCE)
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(stub.runs(), 1);
    }

    #[test]
    fn reruns_while_log_asks_for_it() {
        let stub = stub_engine(
            &["LaTeX Warning: Label(s) may have changed. Rerun to get cross-references right."],
            0,
        );
        LatexCompiler::new(LatexEngine::Pdflatex)
            .with_runs(3)
            .with_binary(&stub.script)
            .compile(SOURCE)
            .unwrap();
        assert_eq!(stub.runs(), 3);
    }

    #[test]
    fn engine_failure_reports_log_errors() {
        let stub = stub_engine(&["This is XeTeX", "! Undefined control sequence.", "l.3 foo"], 1);
        let err = LatexCompiler::default()
            .with_binary(&stub.script)
            .compile(SOURCE)
            .unwrap_err();
        match err {
            ConvertError::Compile(message) => {
                assert_eq!(message, "xelatex failed:\n! Undefined control sequence.\nl.3 foo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stub.runs(), 1);
    }

    #[test]
    fn hanging_engine_is_killed() {
        let dir = tempdir().unwrap();
        let script = write_script(dir.path(), "#!/bin/sh\nexec sleep 5\n");
        let err = LatexCompiler::default()
            .with_binary(&script)
            .with_timeout(Duration::from_millis(200))
            .compile(SOURCE)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Timeout { .. }));
    }

    #[test]
    fn missing_engine_is_a_compile_error() {
        let dir = tempdir().unwrap();
        let err = LatexCompiler::default()
            .with_binary(dir.path().join("no-such-latex"))
            .compile(SOURCE)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to launch xelatex"));
    }

    #[test]
    fn compile_to_path_writes_pdf() {
        let stub = stub_engine(&[], 0);
        let out = tempdir().unwrap();
        let target = out.path().join("pdf/doc.pdf");
        let written = LatexCompiler::default()
            .with_binary(&stub.script)
            .compile_to_path(SOURCE, &target)
            .unwrap();
        assert_eq!(written.runs, 1);
        assert!(fs::read(&target).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn failure_with_invalid_utf8_log_keeps_error_lines() {
        let dir = tempdir().unwrap();
        // Two bytes of a three byte character, as left by line wrapping.
        let body = r#"#!/bin/sh
for arg in "$@"; do
  case $arg in
    -output-directory=*) OUT="${arg#*=}" ;;
  esac
done
printf 'Chapter \344\270\n! Undefined control sequence.\nl.3 foo\n' > "$OUT/document.log"
exit 1
"#;
        let script = write_script(dir.path(), body);
        let err = LatexCompiler::default()
            .with_binary(&script)
            .compile(SOURCE)
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::Compile("xelatex failed:\n! Undefined control sequence.\nl.3 foo".into())
        );
    }

    #[test]
    fn rerun_marker_after_invalid_utf8_is_honored() {
        let dir = tempdir().unwrap();
        let body = format!(
            r#"#!/bin/sh
for arg in "$@"; do
  case $arg in
    -output-directory=*) OUT="${{arg#*=}}" ;;
  esac
done
echo run >> "{}"
printf '\377 Rerun to get cross-references right.\n' > "$OUT/document.log"
printf '%%PDF' > "$OUT/document.pdf"
"#,
            dir.path().join("runs").display()
        );
        let script = write_script(dir.path(), &body);
        let report = LatexCompiler::default()
            .with_runs(3)
            .with_binary(&script)
            .compile_report(SOURCE)
            .unwrap();
        assert_eq!(report.runs, 3);
    }

    #[test]
    fn bibliography_gets_a_bibtex_pass_and_extra_runs() {
        let stub = stub_engine(&["Output written on document.pdf (1 page)."], 0);
        let bibtex = stub_bibtex(&stub, 0);
        let sources = tempdir().unwrap();
        let report = LatexCompiler::default()
            .with_binary(&stub.script)
            .with_bibtex(&bibtex)
            .with_working_dir(sources.path())
            .compile_report(CITING_SOURCE)
            .unwrap();

        assert_eq!(report.runs, 3);
        assert_eq!(stub.runs(), 3);
        let calls = bibtex_calls(&stub);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("document in "));
        assert!(calls[0].ends_with(&format!("with {}:", sources.path().display())));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn sources_without_bibliography_skip_bibtex() {
        let stub = stub_engine(&[], 0);
        let bibtex = stub_bibtex(&stub, 0);
        LatexCompiler::default()
            .with_binary(&stub.script)
            .with_bibtex(&bibtex)
            .compile(SOURCE)
            .unwrap();
        assert!(bibtex_calls(&stub).is_empty());
        assert_eq!(stub.runs(), 1);
    }

    #[test]
    fn failed_bibtex_is_a_warning() {
        let stub = stub_engine(&[], 0);
        let bibtex = stub_bibtex(&stub, 2);
        let report = LatexCompiler::default()
            .with_binary(&stub.script)
            .with_bibtex(&bibtex)
            .compile_report(CITING_SOURCE)
            .unwrap();
        assert!(report.pdf.starts_with(b"%PDF"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("bibtex: "));
        assert_eq!(stub.runs(), 3);
    }

    #[test]
    fn log_warnings_are_reported() {
        let stub = stub_engine(
            &[
                "LaTeX Warning: Citation knuth on page 1 undefined on input line 3.",
                "Package hyperref Warning: Token not allowed in a PDF string.",
                "Output written on document.pdf (1 page).",
            ],
            0,
        );
        let report: CompileReport = LatexCompiler::default()
            .with_binary(&stub.script)
            .compile_report(SOURCE)
            .unwrap();
        assert_eq!(
            report.warnings,
            vec![
                "LaTeX Warning: Citation knuth on page 1 undefined on input line 3.",
                "Package hyperref Warning: Token not allowed in a PDF string.",
            ]
        );
    }
}

#[cfg(not(all(unix, feature = "native-export")))]
#[test]
fn compile_tests_skipped() {
    eprintln!("Skipping LaTeX compile tests without unix and native-export");
}
