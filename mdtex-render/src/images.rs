//! Conversion of images LaTeX cannot include into PNG
//!
//! `graphicx` includes PDF, PNG and JPEG as they are. BMP, TIFF, GIF, WebP,
//! SVG and a few others are converted with an external tool first:
//! `rsvg-convert` for SVG, otherwise ImageMagick, otherwise macOS `sips`.
//! Converted files are written as `<stem>.png`, next to the input or into a
//! chosen directory.

use crate::error::ConvertError;
use crate::process::{find_on_path, run_with_timeout};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extensions converted to PNG.
const CONVERTIBLE: [&str; 9] = ["bmp", "tiff", "tif", "gif", "webp", "svg", "ico", "psd", "raw"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTool {
    /// `rsvg-convert`, SVG only
    Rsvg,
    /// `magick` or `convert`
    ImageMagick,
    /// macOS `sips`
    Sips,
}

impl ImageTool {
    /// In order of preference.
    pub const ALL: [ImageTool; 3] = [ImageTool::Rsvg, ImageTool::ImageMagick, ImageTool::Sips];

    pub fn name(self) -> &'static str {
        match self {
            ImageTool::Rsvg => "rsvg-convert",
            ImageTool::ImageMagick => "imagemagick",
            ImageTool::Sips => "sips",
        }
    }

    fn executables(self) -> &'static [&'static str] {
        match self {
            ImageTool::Rsvg => &["rsvg-convert"],
            ImageTool::ImageMagick => &["magick", "convert"],
            ImageTool::Sips => &["sips"],
        }
    }

    fn handles(self, extension: &str) -> bool {
        match self {
            ImageTool::Rsvg => extension == "svg",
            ImageTool::ImageMagick | ImageTool::Sips => true,
        }
    }

    /// Output is capped at 2048px on the long side (1024px for SVG).
    fn command(self, binary: &Path, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(binary);
        match self {
            ImageTool::Rsvg => {
                command
                    .args(["-f", "png", "-w", "1024", "-h", "1024"])
                    .arg(input)
                    .arg("-o")
                    .arg(output);
            }
            ImageTool::ImageMagick => {
                command
                    .arg(input)
                    .args(["-quality", "90", "-resize", "2048x2048>"])
                    .arg(output);
            }
            ImageTool::Sips => {
                command
                    .args(["-s", "format", "png", "-Z", "2048"])
                    .arg(input)
                    .arg("--out")
                    .arg(output);
            }
        }
        command
    }
}

/// Whether `path` has an extension that should be converted to PNG.
pub fn needs_conversion(path: &Path) -> bool {
    CONVERTIBLE.contains(&extension_of(path).as_str())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// `<stem>.png` in `output_dir`, or next to `input`.
pub fn png_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => {
            let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
            name.push(".png");
            dir.join(name)
        }
        None => input.with_extension("png"),
    }
}

/// Result of converting one image of a directory.
#[derive(Debug)]
pub struct ImageOutcome {
    pub input: PathBuf,
    pub result: Result<PathBuf, ConvertError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConverter {
    tools: Vec<(ImageTool, PathBuf)>,
    timeout: Duration,
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ImageConverter {
    /// A converter without tools; add them with [`ImageConverter::with_tool`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter using every tool found on `PATH`.
    pub fn detect() -> Self {
        let mut converter = Self::new();
        for tool in ImageTool::ALL {
            if let Some(binary) = find_on_path(tool.executables()) {
                debug!(tool = tool.name(), binary = %binary.display(), "found image tool");
                converter.tools.push((tool, binary));
            }
        }
        converter
    }

    /// Use `binary` as `tool`. Tools added earlier are preferred.
    pub fn with_tool(mut self, tool: ImageTool, binary: impl Into<PathBuf>) -> Self {
        self.tools.push((tool, binary.into()));
        self
    }

    /// Time allowed for each conversion.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn tools(&self) -> impl Iterator<Item = ImageTool> + '_ {
        self.tools.iter().map(|(tool, _)| *tool)
    }

    pub fn is_ready(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Convert one image to PNG and return the written path.
    pub fn convert(&self, input: &Path, output_dir: Option<&Path>) -> Result<PathBuf, ConvertError> {
        if !input.is_file() {
            return Err(ConvertError::io(input, "no such image file"));
        }
        let extension = extension_of(input);
        let (tool, binary) = self
            .tools
            .iter()
            .find(|(tool, _)| tool.handles(&extension))
            .ok_or_else(|| {
                ConvertError::Image(format!(
                    "no tool can convert .{extension} images; install ImageMagick"
                ))
            })?;

        let output = png_path(input, output_dir);
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }

        let mut command = tool.command(binary, input, &output);
        let status = run_with_timeout(&mut command, tool.name(), self.timeout)?;
        if !status.success() {
            return Err(ConvertError::Image(format!(
                "{} could not convert '{}' ({status})",
                tool.name(),
                input.display()
            )));
        }
        info!(tool = tool.name(), input = %input.display(), output = %output.display(), "converted image");
        Ok(output)
    }

    /// Convert every image in `dir` (not recursive) that needs it.
    ///
    /// Outcomes are sorted by input path; a failing image does not stop
    /// the others.
    pub fn convert_dir(
        &self,
        dir: &Path,
        output_dir: Option<&Path>,
    ) -> Result<Vec<ImageOutcome>, ConvertError> {
        let entries = fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))?;
        let mut inputs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && needs_conversion(path))
            .collect();
        inputs.sort();

        Ok(inputs
            .into_iter()
            .map(|input| {
                let result = self.convert(&input, output_dir);
                if let Err(err) = &result {
                    warn!(input = %input.display(), "{err}");
                }
                ImageOutcome { input, result }
            })
            .collect())
    }
}
