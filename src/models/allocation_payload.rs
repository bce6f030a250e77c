use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock-level allocation as submitted to the ordering backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAllocation {
    pub stock_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_qty: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_stock_status_id: Option<i64>,
}

/// Batch-managed trademark child: allocations only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchChildAllocation {
    pub id: i64,
    pub allocations: Vec<StockAllocation>,
}

/// Non-batch trademark child: a flat trademark quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatChildAllocation {
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_qty: Decimal,
    pub material_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_item_level_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub recommended_stock: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_reason_id: Option<i64>,
    pub allocations: Vec<StockAllocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildAllocationPayload {
    Batch(BatchChildAllocation),
    Flat(FlatChildAllocation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderItemAllocationPayload {
    Hierarchy {
        id: i64,
        children: Vec<ChildAllocationPayload>,
    },
    Leaf {
        id: i64,
        allocations: Vec<StockAllocation>,
    },
}

impl OrderItemAllocationPayload {
    pub fn id(&self) -> i64 {
        match self {
            Self::Hierarchy { id, .. } | Self::Leaf { id, .. } => *id,
        }
    }
}

/// Submission envelope for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub id: i64,
    pub order_items: Vec<OrderItemAllocationPayload>,
}
