//! Order extraction stages.
//!
//! Each submodule implements exactly one step. Only [`layout`] opens the
//! PDF; everything after it works on plain data and is tested without one.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ layout ──────────────▶ rows
//! (path)   (pdfium + pdfplumber)  (line items)
//!              │
//!              └──▶ header (page 1 text)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path
//! 2. [`layout`] — page-1 text and the ruled tables of every page
//! 3. [`table`]  — pdfplumber tables as rows of optional cell text
//! 4. [`rows`]   — classify rows and recover line-item fields
//! 5. [`header`] — labelled metadata from the first page's text

pub mod header;
pub mod input;
pub mod layout;
pub mod rows;
pub mod table;

use crate::config::ToolConfig;
use crate::output::{ExtractionStats, PurchaseOrder};
use layout::DocumentLayout;
use tracing::{debug, info};

/// Turn a captured document into a [`PurchaseOrder`].
///
/// Every table on every page is parsed on its own; an item never spans two
/// tables. Unreadable pages are counted and skipped.
pub fn extract_order(doc: &DocumentLayout, config: &ToolConfig) -> PurchaseOrder {
    let header = header::extract_header(&doc.first_page_text);
    let mut stats = ExtractionStats {
        page_count: doc.pages.len(),
        ..ExtractionStats::default()
    };
    let mut items = Vec::new();

    for (idx, page) in doc.pages.iter().enumerate() {
        let Some(tables) = page else {
            stats.unreadable_pages += 1;
            continue;
        };
        debug!("Page {}: {} tables", idx + 1, tables.len());
        stats.tables_found += tables.len();

        for t in tables {
            items.extend(rows::parse_table(t, config, &mut stats));
        }
    }

    info!(
        "Extracted {} line items from {} tables ({} header fields)",
        items.len(),
        stats.tables_found,
        header.fields.len()
    );

    PurchaseOrder { header, items, stats }
}

#[cfg(test)]
mod tests {
    use super::layout::DocumentLayout;
    use super::table::tests::table;
    use super::*;

    /// A two-line order table as the lattice finder returns it.
    fn order_table() -> super::table::Table {
        table(&[
            &["项次", "料件编号", "", "", "", ""],
            &["1", "YY100 SPEC;\nWIRE A02\nDX-1", "", "1.5\n2,000\nPCS", "3,000\n4/1\n13%", "A02"],
            &["", "SA-9", "", "", "", ""],
            &["", "合计", "", "", "", ""],
        ])
    }

    #[test]
    fn extracts_items_from_tables() {
        let doc = DocumentLayout {
            first_page_text: "采购单号: PO-9".into(),
            pages: vec![Some(vec![order_table()]), None],
        };
        let order = extract_order(&doc, &ToolConfig::default());

        assert_eq!(order.header.order_number(), Some("PO-9"));
        assert_eq!(order.items.len(), 1);
        let item = &order.items[0];
        assert_eq!(item.customer_code, "YY100");
        assert_eq!(item.specification, "SPEC");
        assert_eq!(item.description, "WIRE A02");
        assert_eq!(item.quantity, "2000");
        assert_eq!(item.amount, "3000");
        assert_eq!(item.reply, "A02");
        assert_eq!(item.remark, "SA-9");

        assert_eq!(order.stats.page_count, 2);
        assert_eq!(order.stats.unreadable_pages, 1);
        assert_eq!(order.stats.tables_found, 1);
        assert_eq!(order.stats.header_rows_skipped, 1);
        assert_eq!(order.stats.total_rows_skipped, 1);
    }

    #[test]
    fn page_without_tables_yields_nothing() {
        let doc = DocumentLayout {
            first_page_text: String::new(),
            pages: vec![Some(Vec::new())],
        };
        let order = extract_order(&doc, &ToolConfig::default());
        assert!(order.is_empty());
        assert_eq!(order.stats.page_count, 1);
        assert_eq!(order.stats.tables_found, 0);
        assert_eq!(order.stats.unreadable_pages, 0);
    }

    #[test]
    fn empty_document_is_empty_order() {
        let order = extract_order(&DocumentLayout::default(), &ToolConfig::default());
        assert!(order.is_empty());
        assert!(order.header.is_empty());
    }
}
