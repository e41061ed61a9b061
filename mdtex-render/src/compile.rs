//! PDF compilation through a LaTeX engine.
//!
//! The generated source is written to a temporary directory and compiled by
//! an external `xelatex`/`pdflatex`/`lualatex` process. Each run is bounded
//! by a timeout; an engine that overruns it is killed. Runs repeat (up to
//! the configured count) while the log asks for another pass to settle
//! cross-references.
//!
//! Sources that call `\bibliography{...}` get a `bibtex` pass after the
//! first engine run and at least two more engine runs. A failing or missing
//! `bibtex` is reported as a warning, not an error.

use crate::error::ConvertError;
use crate::process::{find_on_path, run_with_timeout};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::Duration;
use tempfile::tempdir;
use tracing::{debug, info, warn};

/// Overrides engine lookup on `PATH`.
pub const LATEX_BIN_ENV: &str = "MDTEX_LATEX_BIN";

/// Overrides `bibtex` lookup on `PATH`.
pub const BIBTEX_BIN_ENV: &str = "MDTEX_BIBTEX_BIN";

const JOB_NAME: &str = "document";
const MAX_ERROR_LINES: usize = 10;
/// Engine passes when a bibliography is present: before and after bibtex,
/// then one more for cross-references.
const BIBLIOGRAPHY_RUNS: usize = 3;

const RERUN_MARKERS: [&str; 4] = [
    "Rerun to get cross-references right",
    "There were undefined references",
    "Label(s) may have changed",
    "Rerun LaTeX",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatexEngine {
    /// Best choice for CJK documents (`ctex` classes)
    #[default]
    Xelatex,
    Pdflatex,
    Lualatex,
}

impl LatexEngine {
    pub fn name(self) -> &'static str {
        match self {
            LatexEngine::Xelatex => "xelatex",
            LatexEngine::Pdflatex => "pdflatex",
            LatexEngine::Lualatex => "lualatex",
        }
    }
}

impl fmt::Display for LatexEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LatexEngine {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xelatex" => Ok(LatexEngine::Xelatex),
            "pdflatex" => Ok(LatexEngine::Pdflatex),
            "lualatex" => Ok(LatexEngine::Lualatex),
            other => Err(ConvertError::Compile(format!(
                "unsupported LaTeX engine '{other}' (expected xelatex, pdflatex or lualatex)"
            ))),
        }
    }
}

/// What a successful compilation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub pdf: Vec<u8>,
    /// Engine passes made
    pub runs: usize,
    /// `Warning:` lines of the final log, plus a failed bibtex pass
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexCompiler {
    engine: LatexEngine,
    runs: usize,
    timeout: Duration,
    binary: Option<PathBuf>,
    bibtex: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl Default for LatexCompiler {
    fn default() -> Self {
        Self {
            engine: LatexEngine::default(),
            runs: 2,
            timeout: Duration::from_secs(120),
            binary: None,
            bibtex: None,
            working_dir: None,
        }
    }
}

impl LatexCompiler {
    pub fn new(engine: LatexEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Upper bound on engine passes, at least one.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs.max(1);
        self
    }

    /// Time allowed for each pass.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use this executable instead of looking the engine up.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Use this executable for the bibliography pass.
    pub fn with_bibtex(mut self, binary: impl Into<PathBuf>) -> Self {
        self.bibtex = Some(binary.into());
        self
    }

    /// Directory the engine runs in, so relative image paths resolve from
    /// there. `bibtex` also searches it for `.bib` files. Defaults to the
    /// current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn engine(&self) -> LatexEngine {
        self.engine
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Compile LaTeX source and return the PDF bytes.
    pub fn compile(&self, tex: &str) -> Result<Vec<u8>, ConvertError> {
        Ok(self.compile_report(tex)?.pdf)
    }

    /// Compile LaTeX source, keeping the pass count and log warnings.
    pub fn compile_report(&self, tex: &str) -> Result<CompileReport, ConvertError> {
        let binary = self.resolve_binary()?;
        let temp_dir = tempdir().map_err(|e| ConvertError::Compile(format!("Temp dir error: {e}")))?;
        let tex_path = temp_dir.path().join(format!("{JOB_NAME}.tex"));
        fs::write(&tex_path, tex).map_err(|e| ConvertError::io(&tex_path, e))?;

        let bibliography = uses_bibliography(tex);
        let min_runs = if bibliography { BIBLIOGRAPHY_RUNS } else { 1 };
        let max_runs = self.runs.max(min_runs);
        let log_path = temp_dir.path().join(format!("{JOB_NAME}.log"));
        let mut warnings = Vec::new();
        let mut log = String::new();
        let mut runs = 0;

        for run in 1..=max_runs {
            runs = run;
            debug!(engine = %self.engine, run, "running LaTeX engine");
            let succeeded = self.run_engine(&binary, temp_dir.path(), &tex_path)?;
            log = read_log(&log_path);
            if !succeeded {
                return Err(ConvertError::Compile(failure_summary(self.engine, &log)));
            }
            if run == 1 && bibliography {
                if let Err(err) = self.run_bibtex(temp_dir.path()) {
                    warn!("bibliography pass failed: {err}");
                    warnings.push(format!("bibtex: {err}"));
                }
            }
            if run >= min_runs && !needs_rerun(&log) {
                break;
            }
        }
        warnings.extend(log_warnings(&log));

        let pdf_path = temp_dir.path().join(format!("{JOB_NAME}.pdf"));
        let pdf = fs::read(&pdf_path).map_err(|_| {
            ConvertError::Compile(format!("{} finished without producing a PDF", self.engine))
        })?;
        info!(
            engine = %self.engine,
            runs,
            warnings = warnings.len(),
            bytes = pdf.len(),
            "compiled PDF"
        );
        Ok(CompileReport {
            pdf,
            runs,
            warnings,
        })
    }

    /// Compile and write the PDF to `path`, creating parent directories.
    pub fn compile_to_path(&self, tex: &str, path: &Path) -> Result<CompileReport, ConvertError> {
        let report = self.compile_report(tex)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
        fs::write(path, &report.pdf).map_err(|e| ConvertError::io(path, e))?;
        Ok(report)
    }

    fn run_engine(&self, binary: &Path, out_dir: &Path, tex_path: &Path) -> Result<bool, ConvertError> {
        let mut command = Command::new(binary);
        command
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(format!("-output-directory={}", out_dir.display()))
            .arg(tex_path);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        let status = run_with_timeout(&mut command, self.engine.name(), self.timeout)?;
        Ok(status.success())
    }

    /// `bibtex document` inside the output directory, where the `.aux` is.
    fn run_bibtex(&self, out_dir: &Path) -> Result<(), ConvertError> {
        let binary = self.resolve_bibtex()?;
        let mut command = Command::new(binary);
        command.arg(JOB_NAME).current_dir(out_dir);

        // bibtex runs elsewhere, so the source directory must be absolute.
        let source_dir = env::current_dir().ok().map(|cwd| match &self.working_dir {
            Some(dir) => cwd.join(dir),
            None => cwd,
        });
        // The trailing empty entry keeps bibtex's default search path.
        if let Some(search) =
            source_dir.and_then(|dir| env::join_paths([dir, PathBuf::new()]).ok())
        {
            command.env("BIBINPUTS", search);
        }

        debug!("running bibtex");
        let status = run_with_timeout(&mut command, "bibtex", self.timeout)?;
        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::Compile(format!("bibtex failed ({status})")))
        }
    }

    fn resolve_binary(&self) -> Result<PathBuf, ConvertError> {
        if let Some(binary) = &self.binary {
            return Ok(binary.clone());
        }
        if let Some(path) = env_path(LATEX_BIN_ENV) {
            return Ok(path);
        }
        find_on_path(&[self.engine.name()]).ok_or_else(|| {
            ConvertError::Compile(format!(
                "{} not found on PATH; install a TeX distribution or set {LATEX_BIN_ENV}",
                self.engine
            ))
        })
    }

    fn resolve_bibtex(&self) -> Result<PathBuf, ConvertError> {
        if let Some(binary) = &self.bibtex {
            return Ok(binary.clone());
        }
        if let Some(path) = env_path(BIBTEX_BIN_ENV) {
            return Ok(path);
        }
        find_on_path(&["bibtex"]).ok_or_else(|| {
            ConvertError::Compile(format!("bibtex not found on PATH; set {BIBTEX_BIN_ENV}"))
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

/// Log text with invalid UTF-8 replaced. Engines wrap lines at a byte
/// width and may split multi-byte characters.
fn read_log(path: &Path) -> String {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn uses_bibliography(tex: &str) -> bool {
    tex.contains("\\bibliography{")
}

/// Trimmed `Warning:` lines of a log, first occurrence of each.
fn log_warnings(log: &str) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();
    for line in log.lines() {
        if !(line.contains("Warning:") || line.contains("warning:")) {
            continue;
        }
        let line = line.trim();
        if !warnings.iter().any(|seen| seen == line) {
            warnings.push(line.to_string());
        }
    }
    warnings
}

fn needs_rerun(log: &str) -> bool {
    RERUN_MARKERS.iter().any(|marker| log.contains(marker))
}

/// Error lines (`! ...`) of a LaTeX log, each with its following context line.
fn failure_summary(engine: LatexEngine, log: &str) -> String {
    let lines: Vec<&str> = log.lines().collect();
    let mut picked = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with('!') {
            picked.push(*line);
            if let Some(next) = lines.get(i + 1) {
                picked.push(*next);
            }
        }
    }
    picked.truncate(MAX_ERROR_LINES);

    if picked.is_empty() {
        format!("{engine} failed without reporting an error")
    } else {
        format!("{engine} failed:\n{}", picked.join("\n"))
    }
}
