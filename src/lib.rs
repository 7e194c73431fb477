//! # factory-order
//!
//! Turn a customer's purchase-order PDF into the factory system's import
//! spreadsheet, and check the local drawing library against the drawing
//! revisions the order asks for.
//!
//! ## Why this crate?
//!
//! The order arrives as a ruled PDF table where every line item spans two
//! rows and several cells stack three values on top of each other. Copying
//! it into the factory system by hand is slow and error-prone, and the
//! customer's part codes have to be translated into factory codes on the
//! way. This crate finds the ruled table with pdfplumber, recovers each
//! line item, maps it through the product catalog and writes the 19-column
//! import sheet.
//!
//! ## Pipeline Overview
//!
//! ```text
//! order PDF
//!  │
//!  ├─ 1. Layout     page-1 header text (pdfium)
//!  ├─ 2. Tables     lattice tables per page (pdfplumber)
//!  ├─ 3. Rows       primary / continuation rows → line items
//!  ├─ 4. Reconcile  customer code → catalog entry
//!  ├─ 5. Export     fixed 19-column workbook (atomic write)
//!  └─ 6. Drawings   expected vs. local revision, staging for print
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use factory_order::{catalog, convert_to_file, ToolConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ToolConfig::default();
//!     let catalog = catalog::load_configured(&config)?.into_catalog();
//!     let summary = convert_to_file("order.pdf", None, &catalog, &config)?;
//!     println!("{} items → {}", summary.item_count, summary.output_path.display());
//!     for code in &summary.unmapped {
//!         eprintln!("not in catalog: {code}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `factory-order` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! factory-order = { version = "1.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
pub mod config;
pub mod convert;
pub mod drawing;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod reconcile;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use catalog::{AbsentReason, Catalog, CatalogEntry, CatalogLoad};
pub use config::{CatalogSchema, QuantityPolicy, SheetLayout, ToolConfig, ToolConfigBuilder};
pub use convert::{
    check_order_drawings, convert, convert_to_file, convert_with, parse_order, parse_order_with,
    ConversionSummary, ConvertedOrder,
};
pub use drawing::{CheckStats, CheckStatus, DrawingCheck, DrawingReport, DrawingTextReader};
pub use error::{FactoryOrderError, SideEffect};
pub use export::{write_export, EXPORT_COLUMNS};
pub use pipeline::layout::bind_pdfium;
pub use pdfium_render::prelude::Pdfium;
pub use output::{ExtractionStats, HeaderInfo, LineItem, PurchaseOrder};
pub use reconcile::{reconcile, MappingStats, MappingStatus, ReconciledRow, Reconciliation};
