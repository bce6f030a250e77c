//! Hierarchical Draft Aggregator
//!
//! Joins the flat order-item list with the hierarchy drafts stored per
//! active-ingredient material and keeps parent totals consistent while the
//! user edits trademark children. Every operation takes a snapshot and
//! returns a new one; callers holding the previous snapshot never observe
//! the edit.

use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::errors::{HierarchyError, ServiceError};
use crate::models::{
    AllocationStockEntry, HierarchyDraft, MaterialHierarchyNode, OrderItem, OrderItemKey,
    OrderStockStatus, TrademarkMaterial,
};

/// An edit that named something the tree does not contain. The edit is
/// dropped and the tree returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyDiagnostic {
    UnknownChild {
        key: OrderItemKey,
        child_id: i64,
    },
    UnknownStock {
        key: OrderItemKey,
        child_id: Option<i64>,
        stock_id: i64,
    },
}

impl HierarchyDiagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            HierarchyDiagnostic::UnknownChild { .. } => "unknown_child",
            HierarchyDiagnostic::UnknownStock { .. } => "unknown_stock",
        }
    }

    fn report(self) -> Self {
        counter!("supplyline.hierarchy.diagnostics", 1, "kind" => self.kind());
        warn!(diagnostic = %self, "Hierarchy edit ignored");
        self
    }
}

impl fmt::Display for HierarchyDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyDiagnostic::UnknownChild { key, child_id } => {
                write!(f, "order item {} has no child {}", key, child_id)
            }
            HierarchyDiagnostic::UnknownStock {
                key,
                child_id: Some(child_id),
                stock_id,
            } => write!(
                f,
                "child {} of order item {} has no stock {}",
                child_id, key, stock_id
            ),
            HierarchyDiagnostic::UnknownStock {
                key,
                child_id: None,
                stock_id,
            } => write!(f, "order item {} has no stock {}", key, stock_id),
        }
    }
}

/// New snapshot produced by an edit, with anything the edit could not apply.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyUpdate {
    pub nodes: Vec<MaterialHierarchyNode>,
    pub diagnostics: Vec<HierarchyDiagnostic>,
}

impl HierarchyUpdate {
    fn applied(nodes: Vec<MaterialHierarchyNode>) -> Self {
        Self {
            nodes,
            diagnostics: Vec::new(),
        }
    }

    fn ignored(nodes: &[MaterialHierarchyNode], diagnostic: HierarchyDiagnostic) -> Self {
        Self {
            nodes: nodes.to_vec(),
            diagnostics: vec![diagnostic.report()],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Parent quantity: the sum of the children's effective quantities, or the
/// node's own quantity once it has no children. The sum saturates at the
/// bounds of `Decimal`.
pub fn ordered_qty(node: &MaterialHierarchyNode) -> Decimal {
    if node.is_hierarchy() {
        saturating_sum(node.children.iter().map(TrademarkMaterial::effective_qty))
    } else {
        node.own_qty()
    }
}

/// Builds the tree from the flat order items and the stored drafts keyed by
/// material id. Items without a draft become leaves.
#[instrument(level = "debug", skip_all, fields(items = items.len(), drafts = drafts.len()))]
pub fn merge_hierarchy(
    items: &[OrderItem],
    drafts: &HashMap<i64, HierarchyDraft>,
) -> Vec<MaterialHierarchyNode> {
    items
        .iter()
        .map(|item| {
            let children = drafts
                .get(&item.material_id)
                .and_then(|draft| draft.material_hierarchy.clone())
                .unwrap_or_default();

            let mut node = MaterialHierarchyNode {
                key: item.key(),
                material_id: item.material_id,
                qty: item.qty,
                confirmed_qty: item.confirmed_qty,
                ordered_qty: Decimal::ZERO,
                order_item_level_id: item.order_item_level_id,
                recommended_stock: item.recommended_stock,
                reason: item.reason.clone(),
                stocks: item.stocks.clone(),
                children,
            };
            node.ordered_qty = ordered_qty(&node);
            node
        })
        .collect()
}

/// Recomputes every parent total, e.g. after a snapshot was deserialized.
pub fn recompute_totals(nodes: &[MaterialHierarchyNode]) -> Vec<MaterialHierarchyNode> {
    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            node.ordered_qty = ordered_qty(&node);
            node
        })
        .collect()
}

fn locate(nodes: &[MaterialHierarchyNode], key: OrderItemKey) -> Result<usize, HierarchyError> {
    nodes.iter().position(|node| node.key == key).ok_or_else(|| {
        warn!(%key, "Order item not present in hierarchy snapshot");
        ServiceError::Desynchronized(format!("Order item {} is not part of the draft", key))
    })
}

/// Sets a trademark child's confirmed quantity, mirrored into `qty`, and
/// recomputes the parent total.
#[instrument(level = "debug", skip(nodes))]
pub fn update_child_quantity(
    nodes: &[MaterialHierarchyNode],
    key: OrderItemKey,
    child_id: i64,
    qty: Decimal,
) -> Result<HierarchyUpdate, HierarchyError> {
    let index = locate(nodes, key)?;
    if nodes[index].child(child_id).is_none() {
        return Ok(HierarchyUpdate::ignored(
            nodes,
            HierarchyDiagnostic::UnknownChild { key, child_id },
        ));
    }

    let mut next = nodes.to_vec();
    let node = &mut next[index];
    for child in node.children.iter_mut().filter(|c| c.id == child_id) {
        child.confirmed_qty = Some(qty);
        child.qty = Some(qty);
    }
    node.ordered_qty = ordered_qty(node);

    debug!(ordered_qty = %node.ordered_qty, "Recomputed parent quantity");
    Ok(HierarchyUpdate::applied(next))
}

/// Sets the confirmed quantity of an order item itself. Only a leaf's own
/// quantity feeds its total; a parent's total stays the sum of its children.
#[instrument(level = "debug", skip(nodes))]
pub fn update_item_quantity(
    nodes: &[MaterialHierarchyNode],
    key: OrderItemKey,
    qty: Decimal,
) -> Result<HierarchyUpdate, HierarchyError> {
    let index = locate(nodes, key)?;
    let mut next = nodes.to_vec();
    let node = &mut next[index];
    node.confirmed_qty = Some(qty);
    node.ordered_qty = ordered_qty(node);
    Ok(HierarchyUpdate::applied(next))
}

/// Removes a trademark child. A parent left without children falls back to
/// its own quantity.
#[instrument(level = "debug", skip(nodes))]
pub fn remove_child(
    nodes: &[MaterialHierarchyNode],
    key: OrderItemKey,
    child_id: i64,
) -> Result<HierarchyUpdate, HierarchyError> {
    let index = locate(nodes, key)?;
    if nodes[index].child(child_id).is_none() {
        return Ok(HierarchyUpdate::ignored(
            nodes,
            HierarchyDiagnostic::UnknownChild { key, child_id },
        ));
    }

    let mut next = nodes.to_vec();
    let node = &mut next[index];
    node.children.retain(|c| c.id != child_id);
    node.ordered_qty = ordered_qty(node);

    if !node.is_hierarchy() {
        debug!(%key, "Parent demoted to leaf");
    }
    Ok(HierarchyUpdate::applied(next))
}

fn edit_stock<F>(
    nodes: &[MaterialHierarchyNode],
    key: OrderItemKey,
    child_id: Option<i64>,
    stock_id: i64,
    edit: F,
) -> Result<HierarchyUpdate, HierarchyError>
where
    F: FnOnce(&mut AllocationStockEntry),
{
    let index = locate(nodes, key)?;
    let mut next = nodes.to_vec();
    let node = &mut next[index];

    let stocks = match child_id {
        None => &mut node.stocks,
        Some(child_id) => match node.children.iter_mut().find(|c| c.id == child_id) {
            Some(child) => &mut child.stocks,
            None => {
                return Ok(HierarchyUpdate::ignored(
                    nodes,
                    HierarchyDiagnostic::UnknownChild { key, child_id },
                ))
            }
        },
    };

    match stocks.iter_mut().find(|s| s.stock_id == stock_id) {
        Some(stock) => edit(stock),
        None => {
            return Ok(HierarchyUpdate::ignored(
                nodes,
                HierarchyDiagnostic::UnknownStock {
                    key,
                    child_id,
                    stock_id,
                },
            ))
        }
    }

    if let Some(child_id) = child_id {
        for child in node
            .children
            .iter_mut()
            .filter(|c| c.id == child_id && c.is_batch)
        {
            child.total_allocated_qty = Some(saturating_sum(
                child.stocks.iter().map(AllocationStockEntry::allocated_qty),
            ));
        }
    }

    Ok(HierarchyUpdate::applied(next))
}

/// Sets the drafted allocation of one stock lot, on the item itself
/// (`child_id = None`) or on one of its trademark children.
#[instrument(level = "debug", skip(nodes))]
pub fn set_stock_allocation(
    nodes: &[MaterialHierarchyNode],
    key: OrderItemKey,
    child_id: Option<i64>,
    stock_id: i64,
    qty: Decimal,
) -> Result<HierarchyUpdate, HierarchyError> {
    edit_stock(nodes, key, child_id, stock_id, |stock| {
        stock.draft_allocated_qty = Some(qty)
    })
}

#[instrument(level = "debug", skip(nodes))]
pub fn set_stock_status(
    nodes: &[MaterialHierarchyNode],
    key: OrderItemKey,
    child_id: Option<i64>,
    stock_id: i64,
    status: Option<OrderStockStatus>,
) -> Result<HierarchyUpdate, HierarchyError> {
    edit_stock(nodes, key, child_id, stock_id, |stock| {
        stock.draft_order_stock_status = status
    })
}

/// Hierarchy drafts for the caller to persist. Leaves are exported without a
/// hierarchy so that a removed last child stays removed on reload.
pub fn to_drafts(nodes: &[MaterialHierarchyNode]) -> Vec<HierarchyDraft> {
    nodes
        .iter()
        .map(|node| HierarchyDraft {
            material_id: node.material_id,
            material_hierarchy: node.is_hierarchy().then(|| node.children.clone()),
        })
        .collect()
}
