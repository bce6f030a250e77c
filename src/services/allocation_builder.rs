//! Allocation Payload Builder
//!
//! Flattens an edited hierarchy snapshot into the request shape the ordering
//! backend accepts. Parent ids are resolved through the original order items
//! by key, since drafts do not carry server-assigned ids.

use metrics::counter;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use crate::errors::{PayloadError, ServiceError};
use crate::models::{
    AllocationRequest, AllocationStockEntry, BatchChildAllocation, ChildAllocationPayload,
    FlatChildAllocation, MaterialHierarchyNode, OrderItem, OrderItemAllocationPayload,
    OrderItemKey, StockAllocation, TrademarkMaterial,
};

impl From<&AllocationStockEntry> for StockAllocation {
    fn from(stock: &AllocationStockEntry) -> Self {
        StockAllocation {
            stock_id: stock.stock_id,
            allocated_qty: stock.allocated_qty(),
            order_stock_status_id: stock.draft_order_stock_status.as_ref().map(|s| s.value),
        }
    }
}

fn allocations(stocks: &[AllocationStockEntry]) -> Vec<StockAllocation> {
    stocks.iter().map(StockAllocation::from).collect()
}

fn child_payload(parent: &MaterialHierarchyNode, child: &TrademarkMaterial) -> ChildAllocationPayload {
    if child.has_batch_allocations() {
        ChildAllocationPayload::Batch(BatchChildAllocation {
            id: child.id,
            allocations: allocations(&child.stocks),
        })
    } else {
        ChildAllocationPayload::Flat(FlatChildAllocation {
            allocated_qty: child.total_allocated_qty.unwrap_or(Decimal::ZERO),
            material_id: child.material_id,
            order_item_level_id: child.order_item_level_id,
            recommended_stock: parent.recommended_stock.unwrap_or(Decimal::ZERO),
            order_reason_id: parent.reason.as_ref().map(|r| r.id),
            allocations: allocations(&child.stocks),
        })
    }
}

/// Builds one payload per node, in node order.
pub fn build_order_item_payloads(
    original: &[OrderItem],
    nodes: &[MaterialHierarchyNode],
) -> Result<Vec<OrderItemAllocationPayload>, PayloadError> {
    let ids: HashMap<OrderItemKey, i64> = original.iter().map(|item| (item.key(), item.id)).collect();

    nodes
        .iter()
        .map(|node| {
            let id = *ids.get(&node.key).ok_or_else(|| {
                warn!(key = %node.key, "Draft node has no original order item");
                ServiceError::Desynchronized(format!(
                    "Order item {} is missing from the original order",
                    node.key
                ))
            })?;

            let payload = if node.is_hierarchy() {
                OrderItemAllocationPayload::Hierarchy {
                    id,
                    children: node
                        .children
                        .iter()
                        .map(|child| child_payload(node, child))
                        .collect(),
                }
            } else {
                OrderItemAllocationPayload::Leaf {
                    id,
                    allocations: allocations(&node.stocks),
                }
            };
            Ok(payload)
        })
        .collect()
}

/// Builds the submission envelope for an order.
#[instrument(skip(original, nodes), fields(items = nodes.len()))]
pub fn build_request(
    order_id: i64,
    original: &[OrderItem],
    nodes: &[MaterialHierarchyNode],
) -> Result<AllocationRequest, PayloadError> {
    let order_items = build_order_item_payloads(original, nodes)?;

    counter!("supplyline.allocation.payloads_built", 1);
    info!(order_id, order_items = order_items.len(), "Built allocation request");

    Ok(AllocationRequest {
        id: order_id,
        order_items,
    })
}
