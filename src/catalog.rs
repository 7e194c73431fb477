//! Product catalog: customer part code → factory part attributes.
//!
//! The catalog is an ordinary workbook maintained by the factory office. Two
//! layouts are in circulation:
//!
//! * **single-sheet** – header in row 1 of the first sheet, columns found by
//!   their header text (`产品规格` is the customer code, `产品编号` the factory
//!   code, `产品名称` the name, optionally `工艺路线` and `单位`);
//! * **multi-sheet** – every sheet carries a header row somewhere near the
//!   top, recognised by a marker substring, with data at fixed offsets below.
//!
//! A missing file is not an error: the tool still converts orders, it just
//! reports every code as unmapped. That case comes back as
//! [`CatalogLoad::Absent`]. A workbook that exists but cannot be parsed is a
//! hard [`FactoryOrderError::CatalogUnreadable`].

use crate::config::{CatalogSchema, SheetLayout, ToolConfig};
use crate::error::FactoryOrderError;
use calamine::{open_workbook_auto, Data, Range, Reader};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Header texts of the single-sheet layout.
pub const COL_CUSTOMER_CODE: &str = "产品规格";
pub const COL_FACTORY_CODE: &str = "产品编号";
pub const COL_NAME: &str = "产品名称";
pub const COL_ROUTE: &str = "工艺路线";
pub const COL_UNIT: &str = "单位";

/// Factory-side attributes of one customer part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub factory_code: String,
    pub name: String,
    pub route: Option<String>,
    pub unit: Option<String>,
}

/// Lookup table keyed by trimmed customer code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it displaced.
    pub fn insert(&mut self, customer_code: &str, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(customer_code.trim().to_string(), entry)
    }

    pub fn get(&self, customer_code: &str) -> Option<&CatalogEntry> {
        self.entries.get(customer_code.trim())
    }

    pub fn contains(&self, customer_code: &str) -> bool {
        self.entries.contains_key(customer_code.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by customer code.
    pub fn sorted_entries(&self) -> Vec<(&str, &CatalogEntry)> {
        let mut all: Vec<_> = self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    /// Re-read the catalog from disk.
    ///
    /// On success (including an absent catalog) the held entries are
    /// replaced wholesale. On a hard fault they are left untouched and the
    /// error is returned.
    pub fn reload_from(
        &mut self,
        path: &Path,
        schema: CatalogSchema,
        layout: &SheetLayout,
    ) -> Result<Option<AbsentReason>, FactoryOrderError> {
        match load_catalog(path, schema, layout)? {
            CatalogLoad::Loaded(fresh) => {
                *self = fresh;
                Ok(None)
            }
            CatalogLoad::Absent(reason) => {
                *self = Catalog::default();
                Ok(Some(reason))
            }
        }
    }
}

/// Why no catalog could be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbsentReason {
    /// No file at the configured path.
    FileMissing { path: PathBuf },
    /// The single-sheet header row lacks required columns.
    ColumnsNotFound { missing: Vec<String> },
    /// No sheet contains the multi-sheet marker.
    MarkerNotFound { marker: String },
}

impl std::fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbsentReason::FileMissing { path } => {
                write!(f, "catalog file '{}' not found", path.display())
            }
            AbsentReason::ColumnsNotFound { missing } => {
                write!(f, "catalog header lacks column(s): {}", missing.join(", "))
            }
            AbsentReason::MarkerNotFound { marker } => {
                write!(f, "no catalog sheet contains a '{}' header row", marker)
            }
        }
    }
}

/// Result of [`load_catalog`].
#[derive(Debug, Clone)]
pub enum CatalogLoad {
    Loaded(Catalog),
    Absent(AbsentReason),
}

impl CatalogLoad {
    /// The loaded catalog, or an empty one when absent.
    pub fn into_catalog(self) -> Catalog {
        match self {
            CatalogLoad::Loaded(c) => c,
            CatalogLoad::Absent(_) => Catalog::default(),
        }
    }

    pub fn absent_reason(&self) -> Option<&AbsentReason> {
        match self {
            CatalogLoad::Loaded(_) => None,
            CatalogLoad::Absent(r) => Some(r),
        }
    }
}

/// Load the catalog configured in `config`.
pub fn load_configured(config: &ToolConfig) -> Result<CatalogLoad, FactoryOrderError> {
    load_catalog(&config.catalog_path, config.catalog_schema, &config.sheet_layout)
}

/// Read the catalog workbook at `path`.
pub fn load_catalog(
    path: &Path,
    schema: CatalogSchema,
    layout: &SheetLayout,
) -> Result<CatalogLoad, FactoryOrderError> {
    if !path.is_file() {
        info!("No catalog at '{}'; every code will be unmapped", path.display());
        return Ok(CatalogLoad::Absent(AbsentReason::FileMissing {
            path: path.to_path_buf(),
        }));
    }

    let unreadable = |detail: String| FactoryOrderError::CatalogUnreadable {
        path: path.to_path_buf(),
        detail,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| unreadable(format!("sheet '{}': {}", name, e)))?;
        sheets.push((name, absolute_rows(&range)));
    }

    let schema = match schema {
        CatalogSchema::Auto => detect_schema(&sheets),
        other => other,
    };
    debug!("Catalog '{}' read as {:?}", path.display(), schema);

    let load = match schema {
        CatalogSchema::MultiSheet => parse_multi_sheet(&sheets, layout),
        _ => parse_single_sheet(sheets.first().map(|(_, rows)| rows.as_slice()).unwrap_or(&[])),
    };

    match &load {
        CatalogLoad::Loaded(c) => info!("Catalog loaded: {} entries", c.len()),
        CatalogLoad::Absent(reason) => warn!("Catalog unusable: {}", reason),
    }
    Ok(load)
}

/// Canonical text of a cell: integral floats lose their `.0`, everything
/// else prints as calamine displays it.
pub fn normalize_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

// ── Sheet parsing ────────────────────────────────────────────────────────

type SheetRows = Vec<Vec<String>>;

/// Normalised cell text addressed by absolute (row, column), so that a
/// sheet whose used range starts below A1 keeps its real offsets.
fn absolute_rows(range: &Range<Data>) -> SheetRows {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut rows: SheetRows = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(normalize_cell));
        rows.push(cells);
    }
    rows
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or_default()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Single sheet when the first sheet's first row names a column only that
/// layout uses (`产品规格` or `产品名称`). Such a header with another named
/// column missing is still single sheet, so the load reports the missing
/// column instead of reading the sheet by position.
fn detect_schema(sheets: &[(String, SheetRows)]) -> CatalogSchema {
    let has_named_header = sheets
        .first()
        .and_then(|(_, rows)| rows.first())
        .is_some_and(|header| {
            header
                .iter()
                .any(|h| h == COL_CUSTOMER_CODE || h == COL_NAME)
        });
    if has_named_header {
        CatalogSchema::SingleSheet
    } else {
        CatalogSchema::MultiSheet
    }
}

fn parse_single_sheet(rows: &[Vec<String>]) -> CatalogLoad {
    let header: &[String] = rows.first().map(Vec::as_slice).unwrap_or(&[]);
    let find = |label: &str| header.iter().position(|h| h == label);

    let (spec_idx, code_idx, name_idx) =
        match (find(COL_CUSTOMER_CODE), find(COL_FACTORY_CODE), find(COL_NAME)) {
            (Some(s), Some(c), Some(n)) => (s, c, n),
            (s, c, n) => {
                let missing = [(s, COL_CUSTOMER_CODE), (c, COL_FACTORY_CODE), (n, COL_NAME)]
                    .into_iter()
                    .filter(|(idx, _)| idx.is_none())
                    .map(|(_, label)| label.to_string())
                    .collect();
                return CatalogLoad::Absent(AbsentReason::ColumnsNotFound { missing });
            }
        };
    let route_idx = find(COL_ROUTE);
    let unit_idx = find(COL_UNIT);

    let mut catalog = Catalog::new();
    for row in rows.iter().skip(1) {
        add_row(
            &mut catalog,
            cell(row, spec_idx),
            cell(row, code_idx),
            cell(row, name_idx),
            route_idx.map(|i| cell(row, i)),
            unit_idx.map(|i| cell(row, i)),
        );
    }
    CatalogLoad::Loaded(catalog)
}

fn parse_multi_sheet(sheets: &[(String, SheetRows)], layout: &SheetLayout) -> CatalogLoad {
    let mut catalog = Catalog::new();
    let mut marker_seen = false;

    for (name, rows) in sheets {
        let Some(header_idx) = rows
            .iter()
            .position(|row| row.iter().any(|c| c.contains(layout.marker.as_str())))
        else {
            debug!("Sheet '{}' has no '{}' row; skipped", name, layout.marker);
            continue;
        };
        marker_seen = true;

        let before = catalog.len();
        for row in &rows[header_idx + 1..] {
            add_row(
                &mut catalog,
                cell(row, layout.customer_col),
                cell(row, layout.factory_col),
                cell(row, layout.name_col),
                layout.route_col.map(|i| cell(row, i)),
                layout.unit_col.map(|i| cell(row, i)),
            );
        }
        debug!("Sheet '{}': {} new codes", name, catalog.len() - before);
    }

    if marker_seen {
        CatalogLoad::Loaded(catalog)
    } else {
        CatalogLoad::Absent(AbsentReason::MarkerNotFound {
            marker: layout.marker.clone(),
        })
    }
}

fn add_row(
    catalog: &mut Catalog,
    customer_code: &str,
    factory_code: &str,
    name: &str,
    route: Option<&str>,
    unit: Option<&str>,
) {
    let customer_code = customer_code.trim();
    let factory_code = factory_code.trim();
    if customer_code.is_empty() || factory_code.is_empty() {
        return;
    }
    let entry = CatalogEntry {
        factory_code: factory_code.to_string(),
        name: name.trim().to_string(),
        route: route.and_then(non_empty),
        unit: unit.and_then(non_empty),
    };
    if let Some(old) = catalog.insert(customer_code, entry) {
        debug!(
            "Duplicate catalog code '{}': '{}' replaced by a later row",
            customer_code, old.factory_code
        );
    }
}
