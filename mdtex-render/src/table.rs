//! Table reassembly
//!
//! The renderer walks a table token once and collects rendered cells into a
//! [`TableAssembly`]; this module turns that into the pieces the `table`
//! template expects.

/// Column count used when a table has neither header nor rows.
pub const FALLBACK_COLUMNS: usize = 3;

pub const COLUMN_SEPARATOR: &str = " & ";
pub const ROW_TERMINATOR: &str = " \\\\";
/// Joins body lines so they line up inside the default `tabular` block.
pub const BODY_LINE_JOIN: &str = "\n        ";

/// Structure of one table, discarded once the template is filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAssembly {
    /// Rendered (already bold-wrapped) header cells
    pub header: Vec<String>,
    /// Rendered body rows, one entry per cell
    pub rows: Vec<Vec<String>>,
    /// Per-column alignment hints from the source (`left`, `center`, ...).
    ///
    /// Collected but not applied: every column renders as `l`.
    pub source_alignments: Vec<Option<String>>,
}

impl TableAssembly {
    /// Header cell count, else the first row's cell count, else 3.
    pub fn column_count(&self) -> usize {
        if !self.header.is_empty() {
            self.header.len()
        } else if let Some(first) = self.rows.first() {
            first.len()
        } else {
            FALLBACK_COLUMNS
        }
    }

    /// Bordered, left aligned `tabular` column spec, e.g. `|l|l|`.
    pub fn alignment_spec(&self) -> String {
        let mut spec = String::from("|");
        for _ in 0..self.column_count() {
            spec.push_str("l|");
        }
        spec
    }

    /// Header row with terminator, empty when there is no header.
    pub fn header_line(&self) -> String {
        if self.header.is_empty() {
            String::new()
        } else {
            terminated_row(&self.header)
        }
    }

    /// Body rows, each terminated.
    pub fn body_lines(&self) -> String {
        self.rows
            .iter()
            .map(|row| terminated_row(row))
            .collect::<Vec<_>>()
            .join(BODY_LINE_JOIN)
    }
}

fn terminated_row(cells: &[String]) -> String {
    format!("{}{ROW_TERMINATOR}", cells.join(COLUMN_SEPARATOR))
}
