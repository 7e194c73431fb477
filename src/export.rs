//! Export writer: reconciled rows → factory import workbook.
//!
//! The factory system imports a fixed 19-column sheet, so the header text
//! and order here must not drift. `数量` and `采购单价` are written as
//! numbers when they parse, text otherwise; everything else is text.
//!
//! The workbook is rendered in memory, written to a temporary file in the
//! target directory and then renamed over the destination, so a failed run
//! never leaves a half-written export behind.

use crate::error::FactoryOrderError;
use crate::output::HeaderInfo;
use crate::reconcile::ReconciledRow;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Export columns with their widths, in sheet order.
pub const EXPORT_COLUMNS: [(&str, f64); 19] = [
    ("产品编号", 14.0),
    ("产品名称", 35.0),
    ("产品规格", 14.0),
    ("数量", 10.0),
    ("计划开始时间", 14.0),
    ("计划结束时间", 14.0),
    ("工艺路线名称", 18.0),
    ("工序列表", 10.0),
    ("备注", 30.0),
    ("更新", 6.0),
    ("工单分类", 10.0),
    ("供应商", 10.0),
    ("供应商名称", 15.0),
    ("供应商联系人", 12.0),
    ("供应商联系电话", 14.0),
    ("收货地址", 15.0),
    ("采购单价", 10.0),
    ("客户选择", 10.0),
    ("关联产品", 10.0),
];

const SHEET_NAME: &str = "Sheet1";

/// Columns written as numbers when the text parses.
const NUMERIC_COLUMNS: [&str; 2] = ["数量", "采购单价"];

/// Header labels only.
pub fn export_headers() -> impl Iterator<Item = &'static str> {
    EXPORT_COLUMNS.iter().map(|(name, _)| *name)
}

/// Default export file name for an order: `工厂订单_<采购单号>.xlsx`, with
/// `订单` standing in for an unknown order number.
pub fn default_export_name(header: &HeaderInfo) -> String {
    let order_no = header
        .order_number()
        .map(sanitize_file_component)
        .filter(|no| !no.is_empty())
        .unwrap_or_else(|| "订单".to_string());
    format!("工厂订单_{}.xlsx", order_no)
}

/// Write `rows` to `path`, replacing any existing file atomically.
pub fn write_export(rows: &[ReconciledRow], path: &Path) -> Result<(), FactoryOrderError> {
    let bytes = render_workbook(rows).map_err(|e| FactoryOrderError::ExportFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let write_err = |source: std::io::Error| FactoryOrderError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Export written: {} ({} rows)", path.display(), rows.len());
    Ok(())
}

/// Render the workbook to xlsx bytes.
pub fn render_workbook(rows: &[ReconciledRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    for (col, (name, width)) in EXPORT_COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *name, &header_format)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, value) in row.export_values().iter().enumerate() {
            let numeric = NUMERIC_COLUMNS.contains(&EXPORT_COLUMNS[col].0);
            write_cell(worksheet, excel_row, col as u16, value, numeric, &cell_format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    debug!("Rendered export workbook with {} data rows", rows.len());
    workbook.save_to_buffer()
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    numeric: bool,
    format: &Format,
) -> Result<(), XlsxError> {
    if numeric && !value.trim().is_empty() {
        if let Ok(n) = value.replace(',', "").trim().parse::<f64>() {
            worksheet.write_number_with_format(row, col, n, format)?;
            return Ok(());
        }
    }
    worksheet.write_string_with_format(row, col, value, format)?;
    Ok(())
}

fn sanitize_file_component(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
