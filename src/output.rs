//! Extraction output types: what the order PDF yields before reconciliation.

use serde::{Deserialize, Serialize};

/// Named metadata found on the first page of the order.
///
/// Labels appear in the fixed search order of
/// [`crate::pipeline::header::HEADER_LABELS`]; a label is present only when
/// its pattern matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub fields: Vec<(String, String)>,
}

impl HeaderInfo {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// The purchase-order number (`采购单号`), used to name the export.
    pub fn order_number(&self) -> Option<&str> {
        self.get("采购单号")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One purchased entry, assembled from a primary row and its continuations.
///
/// Numeric fields keep their printed text (thousands separators removed);
/// coercion to numbers happens only at export time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Sequence number as printed in the first column (`项次`).
    pub seq: String,
    pub customer_code: String,
    pub description: String,
    pub drawing_no: String,
    pub specification: String,
    pub unit_price: String,
    pub quantity: String,
    pub unit: String,
    pub amount: String,
    pub ship_date: String,
    pub tax_rate: String,
    /// Continuation-row text, space-joined.
    pub remark: String,
    /// Supplier's delivery-reply column, often carrying the drawing revision.
    pub reply: String,
}

impl LineItem {
    pub fn new(seq: impl Into<String>) -> Self {
        Self {
            seq: seq.into(),
            ..Self::default()
        }
    }

    /// Append continuation text to the remark.
    pub fn append_remark(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.remark.is_empty() {
            self.remark = text.to_string();
        } else {
            self.remark.push(' ');
            self.remark.push_str(text);
        }
    }
}

/// Everything extracted from one order PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub header: HeaderInfo,
    pub items: Vec<LineItem>,
    pub stats: ExtractionStats,
}

impl PurchaseOrder {
    /// No line items were recovered. Distinct from a read failure, which is
    /// returned as an error instead.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Counters describing how much of the document was usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub page_count: usize,
    /// Pages whose text or objects could not be read.
    pub unreadable_pages: usize,
    pub tables_found: usize,
    pub header_rows_skipped: usize,
    pub total_rows_skipped: usize,
    pub continuation_rows: usize,
}
