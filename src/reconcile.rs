//! Join extracted line items against the catalog.
//!
//! Every line item yields exactly one [`ReconciledRow`], in order. The
//! export fields depend only on the item and on the catalog entry for its
//! customer code; nothing else feeds in.

use crate::catalog::Catalog;
use crate::config::QuantityPolicy;
use crate::output::LineItem;
use serde::Serialize;
use tracing::{debug, info};

/// Whether the customer code was found in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    Mapped,
    #[default]
    Unmapped,
}

/// One export row plus the order-side details kept for review and for the
/// drawing check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciledRow {
    // ── Export fields ─────────────────────────────────────────────────────
    /// 产品编号
    pub factory_code: String,
    /// 产品名称
    pub product_name: String,
    /// 产品规格
    pub customer_code: String,
    /// 数量
    pub quantity: String,
    /// 计划开始时间
    pub planned_start: String,
    /// 计划结束时间
    pub planned_end: String,
    /// 工艺路线名称
    pub route: String,
    /// 工序列表
    pub operations: String,
    /// 备注
    pub remark: String,
    /// 更新
    pub update_flag: String,
    /// 工单分类
    pub order_category: String,
    /// 供应商
    pub supplier: String,
    /// 供应商名称
    pub supplier_name: String,
    /// 供应商联系人
    pub supplier_contact: String,
    /// 供应商联系电话
    pub supplier_phone: String,
    /// 收货地址
    pub delivery_address: String,
    /// 采购单价
    pub unit_price: String,
    /// 客户选择
    pub customer_choice: String,
    /// 关联产品
    pub related_product: String,

    // ── Internal fields ───────────────────────────────────────────────────
    pub status: MappingStatus,
    pub description: String,
    pub drawing_no: String,
    pub specification: String,
    pub amount: String,
    pub reply: String,
}

impl ReconciledRow {
    /// The 19 export values, in column order.
    pub fn export_values(&self) -> [&str; 19] {
        [
            &self.factory_code,
            &self.product_name,
            &self.customer_code,
            &self.quantity,
            &self.planned_start,
            &self.planned_end,
            &self.route,
            &self.operations,
            &self.remark,
            &self.update_flag,
            &self.order_category,
            &self.supplier,
            &self.supplier_name,
            &self.supplier_contact,
            &self.supplier_phone,
            &self.delivery_address,
            &self.unit_price,
            &self.customer_choice,
            &self.related_product,
        ]
    }

    pub fn is_mapped(&self) -> bool {
        self.status == MappingStatus::Mapped
    }
}

/// Mapped/unmapped counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub rows: Vec<ReconciledRow>,
    /// Non-empty customer codes without a catalog entry, one per
    /// occurrence, in order.
    pub unmapped: Vec<String>,
}

impl Reconciliation {
    /// Sorted, distinct unmapped codes.
    pub fn unique_unmapped(&self) -> Vec<String> {
        let mut codes = self.unmapped.clone();
        codes.sort();
        codes.dedup();
        codes
    }

    pub fn stats(&self) -> MappingStats {
        let mapped = self.rows.iter().filter(|r| r.is_mapped()).count();
        MappingStats {
            total: self.rows.len(),
            mapped,
            unmapped: self.rows.len() - mapped,
        }
    }
}

/// Map every line item through the catalog.
pub fn reconcile(items: &[LineItem], catalog: &Catalog, policy: QuantityPolicy) -> Reconciliation {
    let mut out = Reconciliation::default();

    for item in items {
        let customer_code = item.customer_code.trim();
        let mut row = ReconciledRow {
            customer_code: customer_code.to_string(),
            quantity: apply_quantity_policy(&item.quantity, policy),
            planned_end: item.ship_date.clone(),
            remark: item.remark.clone(),
            unit_price: item.unit_price.clone(),
            description: item.description.clone(),
            drawing_no: item.drawing_no.clone(),
            specification: item.specification.clone(),
            amount: item.amount.clone(),
            reply: item.reply.clone(),
            ..ReconciledRow::default()
        };

        match catalog.get(customer_code) {
            Some(entry) => {
                row.factory_code = entry.factory_code.clone();
                row.product_name = entry.name.clone();
                row.route = entry.route.clone().unwrap_or_default();
                row.status = MappingStatus::Mapped;
            }
            None => {
                if !customer_code.is_empty() {
                    debug!("Unmapped customer code '{}'", customer_code);
                    out.unmapped.push(customer_code.to_string());
                }
            }
        }
        out.rows.push(row);
    }

    let stats = out.stats();
    info!(
        "Reconciled {} rows: {} mapped, {} unmapped",
        stats.total, stats.mapped, stats.unmapped
    );
    out
}

/// Adjust a printed quantity. Text that does not parse as a number is
/// returned unchanged.
pub fn apply_quantity_policy(quantity: &str, policy: QuantityPolicy) -> String {
    match policy {
        QuantityPolicy::PassThrough => quantity.to_string(),
        QuantityPolicy::SafetyMargin(margin) => match quantity.trim().replace(',', "").parse::<f64>() {
            Ok(q) => format_number(q + margin),
            Err(_) => quantity.to_string(),
        },
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
