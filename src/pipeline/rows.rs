//! Row classification and field recovery for the order table.
//!
//! Each order line spans two table rows:
//!
//! ```text
//! primary:      [seq, "CODE spec\nname\ndrawing", …, "price\nqty\nunit", "amount\ndate\ntax", reply]
//! continuation: [  , "remark",                    …                                            ]
//! ```
//!
//! Some form revisions insert an extra empty column before the numeric
//! block, so the numeric columns are found by what they contain
//! ([`locate_signature_columns`]) rather than by index.

use super::table::Table;
use crate::config::ToolConfig;
use crate::output::{ExtractionStats, LineItem};
use serde::Serialize;
use tracing::{debug, trace};

/// Rows with fewer cells than this are layout debris.
pub const MIN_ROW_CELLS: usize = 4;

/// What a table row is, decided by [`classify_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Fewer than [`MIN_ROW_CELLS`] cells.
    TooShort,
    /// The column header row, repeated on every page.
    Header,
    /// The totals row.
    Total,
    /// Opens a new line item.
    Primary,
    /// Adds remark text to the open line item.
    Continuation,
    /// Anything else.
    Other,
}

/// Column positions of the two numeric blocks within one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSignature {
    /// `price\nquantity\nunit`.
    pub price_col: Option<usize>,
    /// `amount\nship date\ntax rate`.
    pub amount_col: Option<usize>,
}

impl ColumnSignature {
    /// The rightmost signature column, if any was found.
    pub fn last_col(&self) -> Option<usize> {
        self.price_col.max(self.amount_col)
    }
}

/// Trimmed cell texts; merged or empty slots become `""`.
pub fn clean_cells(row: &[Option<String>]) -> Vec<String> {
    row.iter()
        .map(|c| c.as_deref().map(str::trim).unwrap_or_default().to_string())
        .collect()
}

/// Classify one cleaned row. `item_open` tells whether a primary row has
/// been seen in this table.
pub fn classify_row(cells: &[String], item_open: bool) -> RowKind {
    if cells.len() < MIN_ROW_CELLS {
        return RowKind::TooShort;
    }

    let joined = cells.join(" ");
    if joined.contains("项次")
        && ["料件编号", "品名", "规格"].iter().any(|k| joined.contains(k))
    {
        return RowKind::Header;
    }

    if cells.iter().any(|c| c.contains("合计")) {
        return RowKind::Total;
    }

    let first = &cells[0];
    if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        return RowKind::Primary;
    }

    if item_open && !cells[1].is_empty() {
        return RowKind::Continuation;
    }

    RowKind::Other
}

/// Find the numeric columns by content, scanning from the third column.
///
/// A multi-line cell containing any unit token (case-insensitive) is the
/// price block; otherwise a multi-line cell containing `%` is the amount
/// block. When several cells qualify the rightmost wins.
pub fn locate_signature_columns(cells: &[String], unit_tokens: &[String]) -> ColumnSignature {
    let tokens: Vec<String> = unit_tokens
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut sig = ColumnSignature::default();
    for (idx, cell) in cells.iter().enumerate().skip(2) {
        if cell.is_empty() || !cell.contains('\n') {
            continue;
        }
        let upper = cell.to_uppercase();
        if tokens.iter().any(|t| upper.contains(t.as_str())) {
            sig.price_col = Some(idx);
        } else if cell.contains('%') {
            sig.amount_col = Some(idx);
        }
    }
    sig
}

/// Build a line item from a primary row.
///
/// The reply (回复, the revision the supplier confirmed) is every non-empty
/// cell right of the rightmost signature column, joined with spaces. This
/// assumes the form prints nothing else there: a variant with a 交期
/// (delivery date) column after the amount would have that date taken as
/// the reply and, for drawing-bearing parts, as the expected revision.
pub fn parse_primary_row(cells: &[String], config: &ToolConfig) -> LineItem {
    let mut item = LineItem::new(cells.first().cloned().unwrap_or_default());

    let ident = cells.get(1).map(String::as_str).unwrap_or_default();
    if !ident.is_empty() {
        let mut lines = ident.split('\n').map(str::trim);

        if let Some(first) = lines.next() {
            if let Some(caps) = config.code_pattern.captures(first) {
                item.customer_code = caps.get(1).map_or("", |m| m.as_str()).to_string();
                item.specification = clean_specification(caps.get(2).map_or("", |m| m.as_str()));
            }
        }
        item.description = lines.next().unwrap_or_default().to_string();
        item.drawing_no = lines.next().unwrap_or_default().to_string();
    }

    let sig = locate_signature_columns(cells, &config.unit_tokens);

    if let Some(col) = sig.price_col {
        let mut parts = cells[col].split('\n').map(str::trim);
        item.unit_price = strip_separators(parts.next().unwrap_or_default());
        item.quantity = strip_separators(parts.next().unwrap_or_default());
        item.unit = parts.next().unwrap_or_default().to_string();
    }

    if let Some(col) = sig.amount_col {
        let mut parts = cells[col].split('\n').map(str::trim);
        item.amount = strip_separators(parts.next().unwrap_or_default());
        item.ship_date = parts.next().unwrap_or_default().to_string();
        item.tax_rate = parts.next().unwrap_or_default().to_string();
    }

    if let Some(last) = sig.last_col() {
        item.reply = cells[last + 1..]
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(" ");
    }

    trace!(
        "Row {}: code='{}' price_col={:?} amount_col={:?}",
        item.seq,
        item.customer_code,
        sig.price_col,
        sig.amount_col
    );
    item
}

/// Parse one table into line items, in row order.
pub fn parse_table(table: &Table, config: &ToolConfig, stats: &mut ExtractionStats) -> Vec<LineItem> {
    let mut items = Vec::new();
    let mut current: Option<LineItem> = None;

    for row in &table.rows {
        let cells = clean_cells(row);
        match classify_row(&cells, current.is_some()) {
            RowKind::Header => stats.header_rows_skipped += 1,
            RowKind::Total => stats.total_rows_skipped += 1,
            RowKind::Primary => {
                if let Some(done) = current.take() {
                    items.push(done);
                }
                current = Some(parse_primary_row(&cells, config));
            }
            RowKind::Continuation => {
                if let Some(item) = current.as_mut() {
                    item.append_remark(&cells[1]);
                    stats.continuation_rows += 1;
                }
            }
            RowKind::TooShort | RowKind::Other => {}
        }
    }

    if let Some(done) = current {
        items.push(done);
    }

    debug!("Table with {} rows yielded {} items", table.rows.len(), items.len());
    items
}

fn clean_specification(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(';')
        .trim_end_matches('\\')
        .to_string()
}

fn strip_separators(s: &str) -> String {
    s.replace(',', "")
}
