use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::transaction_line::Batch;

/// Stable key of an order item, carried from the original order through every
/// edited snapshot. It is the server-assigned order item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderItemKey(pub i64);

impl fmt::Display for OrderItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStockStatus {
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReason {
    pub id: i64,
    #[serde(default)]
    pub label: Option<String>,
}

/// One physical stock lot allocated against an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStockEntry {
    pub stock_id: i64,
    #[serde(default)]
    pub batch: Option<Batch>,
    #[serde(default)]
    pub draft_allocated_qty: Option<Decimal>,
    #[serde(default)]
    pub draft_order_stock_status: Option<OrderStockStatus>,
}

impl AllocationStockEntry {
    pub fn new(stock_id: i64, draft_allocated_qty: Decimal) -> Self {
        Self {
            stock_id,
            batch: None,
            draft_allocated_qty: Some(draft_allocated_qty),
            draft_order_stock_status: None,
        }
    }

    pub fn with_status(mut self, status: OrderStockStatus) -> Self {
        self.draft_order_stock_status = Some(status);
        self
    }

    pub fn allocated_qty(&self) -> Decimal {
        self.draft_allocated_qty.unwrap_or(Decimal::ZERO)
    }
}

/// One entry of the flat order-item list as the ordering backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub material_id: i64,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub confirmed_qty: Option<Decimal>,
    #[serde(default)]
    pub order_item_level_id: Option<i64>,
    #[serde(default)]
    pub recommended_stock: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<OrderReason>,
    #[serde(default)]
    pub stocks: Vec<AllocationStockEntry>,
}

impl OrderItem {
    pub fn new(id: i64, material_id: i64, qty: Decimal) -> Self {
        Self {
            id,
            material_id,
            qty: Some(qty),
            confirmed_qty: None,
            order_item_level_id: None,
            recommended_stock: None,
            reason: None,
            stocks: Vec::new(),
        }
    }

    pub fn key(&self) -> OrderItemKey {
        OrderItemKey(self.id)
    }
}

/// Trademark-level material under an active-ingredient parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrademarkMaterial {
    pub id: i64,
    pub material_id: i64,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub confirmed_qty: Option<Decimal>,
    #[serde(default)]
    pub order_item_level_id: Option<i64>,
    #[serde(default)]
    pub is_batch: bool,
    #[serde(default)]
    pub total_allocated_qty: Option<Decimal>,
    #[serde(default)]
    pub stocks: Vec<AllocationStockEntry>,
}

impl TrademarkMaterial {
    pub fn new(id: i64, material_id: i64, qty: Decimal) -> Self {
        Self {
            id,
            material_id,
            qty: Some(qty),
            confirmed_qty: None,
            order_item_level_id: None,
            is_batch: false,
            total_allocated_qty: None,
            stocks: Vec::new(),
        }
    }

    /// Confirmed quantity when set, the requested one otherwise.
    pub fn effective_qty(&self) -> Decimal {
        self.confirmed_qty.or(self.qty).unwrap_or(Decimal::ZERO)
    }

    /// True only for an `is_batch` child with at least one stock entry; any
    /// other child, stocks or not, is submitted in the flat shape.
    pub fn has_batch_allocations(&self) -> bool {
        self.is_batch && !self.stocks.is_empty()
    }
}

/// Hierarchy draft persisted per active-ingredient material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyDraft {
    pub material_id: i64,
    #[serde(default)]
    pub material_hierarchy: Option<Vec<TrademarkMaterial>>,
}

/// Node of the two-level material tree: an order item joined with its
/// trademark children. A node without children is a leaf carrying its own
/// quantity and stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialHierarchyNode {
    pub key: OrderItemKey,
    pub material_id: i64,
    pub qty: Option<Decimal>,
    pub confirmed_qty: Option<Decimal>,
    pub ordered_qty: Decimal,
    pub order_item_level_id: Option<i64>,
    pub recommended_stock: Option<Decimal>,
    pub reason: Option<OrderReason>,
    pub stocks: Vec<AllocationStockEntry>,
    pub children: Vec<TrademarkMaterial>,
}

impl MaterialHierarchyNode {
    pub fn is_hierarchy(&self) -> bool {
        !self.children.is_empty()
    }

    /// The node's own quantity, used when it has no children.
    pub fn own_qty(&self) -> Decimal {
        self.confirmed_qty.or(self.qty).unwrap_or(Decimal::ZERO)
    }

    pub fn child(&self, child_id: i64) -> Option<&TrademarkMaterial> {
        self.children.iter().find(|c| c.id == child_id)
    }
}
