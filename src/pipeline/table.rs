//! Ruled tables, found by pdfplumber's lattice table finder.
//!
//! The order form is drawn as a grid, so pdfplumber's default
//! [`TableSettings`] (line-based strategy on both axes) recovers it from the
//! ruling alone. This module only adapts pdfplumber's tables to the plain
//! row model the order parser consumes:
//!
//! ```text
//! pdfplumber::Table ──▶ rows of Option<String> ──▶ Table
//! ```
//!
//! `None` marks a slot without text (for instance one covered by a merged
//! neighbour), while `Some("")` cannot occur: blank cells are folded to
//! `None` as well. The row parser treats both the same.

use pdfplumber::{Table as LatticeTable, TableSettings};

/// One table row.
pub type Row = Vec<Option<String>>;

/// A table recovered from one page, rows top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    /// Build a table from raw cell texts, normalising each cell with
    /// [`normalize_cell_text`].
    pub fn from_cells<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| normalize_cell_text(cell.as_ref().map(AsRef::as_ref)))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Settings used for every order page: pdfplumber's lattice defaults.
pub fn lattice_settings() -> TableSettings {
    TableSettings::default()
}

/// Convert one pdfplumber table.
pub fn from_lattice(table: &LatticeTable) -> Table {
    Table::from_cells(
        table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.text.as_deref())),
    )
}

/// Cell text as the row parser expects it: lines trimmed, CR folded into
/// LF, blank lines dropped, lines joined with `\n`. A cell with no text
/// left is `None`.
pub fn normalize_cell_text(text: Option<&str>) -> Option<String> {
    let text = text?;
    let lines: Vec<&str> = text
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
