//! Heading depth to sectioning command mapping

/// Number of sectioning levels LaTeX article classes provide.
pub const HEADING_LEVELS: usize = 5;

/// Default sectioning commands, indexed by `level - 1`.
pub const DEFAULT_SECTIONING: [&str; HEADING_LEVELS] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Maps 1-based heading depth to a sectioning command.
///
/// Depths past the end of the table clamp to the deepest command, so any
/// markdown heading level renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingLevelTable {
    commands: [String; HEADING_LEVELS],
}

impl HeadingLevelTable {
    pub fn new(commands: [String; HEADING_LEVELS]) -> Self {
        Self { commands }
    }

    /// Build a table from exactly five command names.
    pub fn from_slice<S: AsRef<str>>(commands: &[S]) -> Option<Self> {
        if commands.len() != HEADING_LEVELS {
            return None;
        }
        let commands = std::array::from_fn(|i| commands[i].as_ref().trim().to_string());
        Some(Self { commands })
    }

    /// Command for `level`. Level 0 reads as 1; levels above 5 clamp.
    pub fn command_for(&self, level: usize) -> &str {
        let index = level.clamp(1, HEADING_LEVELS) - 1;
        &self.commands[index]
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Default for HeadingLevelTable {
    fn default() -> Self {
        Self {
            commands: DEFAULT_SECTIONING.map(str::to_string),
        }
    }
}
