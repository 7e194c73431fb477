//! End-to-end entry points: order PDF in, reconciled rows or export file out.
//!
//! ## Why keep the catalog outside?
//!
//! The catalog is loaded once and reused for every order a user converts in
//! a session, and it may be reloaded between orders. Taking it as a
//! parameter keeps these functions free of hidden state: the same inputs
//! always produce the same rows.

use crate::catalog::Catalog;
use crate::config::ToolConfig;
use crate::drawing::{check_drawings_with, DrawingReport, DrawingTextReader};
use crate::error::FactoryOrderError;
use crate::export::{default_export_name, write_export};
use crate::output::PurchaseOrder;
use crate::pipeline::{extract_order, input, layout};
use pdfium_render::prelude::Pdfium;
use crate::reconcile::{reconcile, MappingStats, Reconciliation};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Extraction plus reconciliation of one order.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedOrder {
    pub order: PurchaseOrder,
    pub reconciliation: Reconciliation,
}

/// What [`convert_to_file`] wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub output_path: PathBuf,
    pub item_count: usize,
    pub mapping: MappingStats,
    /// Sorted distinct unmapped codes, for the user to add to the catalog.
    pub unmapped: Vec<String>,
    pub duration_ms: u64,
}

/// Read an order PDF into header fields and line items.
///
/// Binds pdfium for this call only. A process that also reads drawings
/// should bind once and use [`parse_order_with`].
///
/// # Errors
/// Only when the PDF cannot be opened at all. A document with no
/// recognisable table comes back as an empty [`PurchaseOrder`].
pub fn parse_order(
    pdf_path: impl AsRef<Path>,
    config: &ToolConfig,
) -> Result<PurchaseOrder, FactoryOrderError> {
    let pdf_path = input::resolve_local(pdf_path.as_ref())?;
    let pdfium = layout::bind_pdfium()?;
    parse_order_with(&pdfium, &pdf_path, config)
}

/// [`parse_order`] on an existing pdfium binding.
pub fn parse_order_with(
    pdfium: &Pdfium,
    pdf_path: impl AsRef<Path>,
    config: &ToolConfig,
) -> Result<PurchaseOrder, FactoryOrderError> {
    let pdf_path = pdf_path.as_ref();
    info!("Parsing order: {}", pdf_path.display());
    let doc = layout::load_document(pdfium, pdf_path, config.password.as_deref())?;
    Ok(extract_order(&doc, config))
}

/// Parse an order and reconcile it against `catalog`.
pub fn convert(
    pdf_path: impl AsRef<Path>,
    catalog: &Catalog,
    config: &ToolConfig,
) -> Result<ConvertedOrder, FactoryOrderError> {
    let order = parse_order(pdf_path, config)?;
    Ok(reconciled(order, catalog, config))
}

/// [`convert`] on an existing pdfium binding.
pub fn convert_with(
    pdfium: &Pdfium,
    pdf_path: impl AsRef<Path>,
    catalog: &Catalog,
    config: &ToolConfig,
) -> Result<ConvertedOrder, FactoryOrderError> {
    let order = parse_order_with(pdfium, pdf_path, config)?;
    Ok(reconciled(order, catalog, config))
}

fn reconciled(order: PurchaseOrder, catalog: &Catalog, config: &ToolConfig) -> ConvertedOrder {
    let reconciliation = reconcile(&order.items, catalog, config.quantity_policy);
    ConvertedOrder {
        order,
        reconciliation,
    }
}

/// Convert an order and write the export workbook.
///
/// With no `output_path` the workbook is named after the order number and
/// placed next to the PDF.
pub fn convert_to_file(
    pdf_path: impl AsRef<Path>,
    output_path: Option<&Path>,
    catalog: &Catalog,
    config: &ToolConfig,
) -> Result<ConversionSummary, FactoryOrderError> {
    let start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    let converted = convert(pdf_path, catalog, config)?;

    let output_path = match output_path {
        Some(p) => p.to_path_buf(),
        None => default_output_path(pdf_path, &converted.order),
    };
    write_export(&converted.reconciliation.rows, &output_path)?;

    Ok(ConversionSummary {
        output_path,
        item_count: converted.order.items.len(),
        mapping: converted.reconciliation.stats(),
        unmapped: converted.reconciliation.unique_unmapped(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Where [`convert_to_file`] writes when no path is given.
pub fn default_output_path(pdf_path: &Path, order: &PurchaseOrder) -> PathBuf {
    let dir = pdf_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    dir.join(default_export_name(&order.header))
}

/// Convert an order, then run the drawing check over its rows.
///
/// The order is read through `pdfium`, the same binding `reader` is
/// expected to borrow.
pub fn check_order_drawings(
    pdfium: &Pdfium,
    pdf_path: impl AsRef<Path>,
    drawing_dir: &Path,
    catalog: &Catalog,
    reader: &dyn DrawingTextReader,
    config: &ToolConfig,
) -> Result<(ConvertedOrder, DrawingReport), FactoryOrderError> {
    let converted = convert_with(pdfium, pdf_path, catalog, config)?;
    let report = check_drawings_with(&converted.reconciliation.rows, drawing_dir, reader, config)?;
    Ok((converted, report))
}
