mod common;

use std::collections::HashMap;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use supplyline_engine::models::{
    AllocationStockEntry, HierarchyDraft, OrderItem, OrderItemKey, TrademarkMaterial,
};
use supplyline_engine::services::hierarchy_aggregator::{
    self, merge_hierarchy, remove_child, set_stock_allocation, set_stock_status, to_drafts,
    update_child_quantity, HierarchyDiagnostic,
};
use supplyline_engine::ServiceError;

const PARENT: OrderItemKey = OrderItemKey(common::PARENT_ITEM_ID);
const LEAF: OrderItemKey = OrderItemKey(common::LEAF_ITEM_ID);

fn three_and_seven() -> Vec<supplyline_engine::models::MaterialHierarchyNode> {
    let mut drafts = HashMap::new();
    drafts.insert(
        500,
        HierarchyDraft {
            material_id: 500,
            material_hierarchy: Some(vec![
                TrademarkMaterial::new(1, 5001, dec!(3)),
                TrademarkMaterial::new(2, 5002, dec!(7)),
            ]),
        },
    );
    merge_hierarchy(&[OrderItem::new(common::PARENT_ITEM_ID, 500, dec!(99))], &drafts)
}

#[test]
fn updating_a_child_recomputes_parent_without_touching_input() {
    let nodes = three_and_seven();
    let before = nodes.clone();

    let update = update_child_quantity(&nodes, PARENT, 2, dec!(10)).unwrap();

    assert_eq!(update.nodes[0].ordered_qty, dec!(13));
    assert_eq!(nodes, before);
    assert_ne!(update.nodes, nodes);
}

#[test]
fn confirmed_quantity_wins_over_requested() {
    let mut drafts = HashMap::new();
    drafts.insert(
        500,
        HierarchyDraft {
            material_id: 500,
            material_hierarchy: Some(vec![
                TrademarkMaterial {
                    confirmed_qty: Some(dec!(1)),
                    ..TrademarkMaterial::new(1, 5001, dec!(3))
                },
                TrademarkMaterial::new(2, 5002, dec!(7)),
            ]),
        },
    );
    let nodes = merge_hierarchy(&[OrderItem::new(1, 500, dec!(0))], &drafts);
    assert_eq!(nodes[0].ordered_qty, dec!(8));
}

#[test]
fn items_without_draft_are_leaves() {
    let nodes = merge_hierarchy(&common::order_items(), &HashMap::new());
    assert!(nodes.iter().all(|n| !n.is_hierarchy()));
    assert_eq!(nodes[0].ordered_qty, dec!(10));
    assert_eq!(nodes[1].ordered_qty, dec!(6));
}

#[test]
fn draft_without_hierarchy_is_a_leaf() {
    let mut drafts = HashMap::new();
    drafts.insert(
        common::PARENT_MATERIAL_ID,
        HierarchyDraft {
            material_id: common::PARENT_MATERIAL_ID,
            material_hierarchy: None,
        },
    );
    let nodes = merge_hierarchy(&common::order_items(), &drafts);
    assert!(!nodes[0].is_hierarchy());
}

#[test]
fn emptied_parent_uses_its_own_quantity() {
    let nodes = three_and_seven();
    let nodes = remove_child(&nodes, PARENT, 1).unwrap().nodes;
    let nodes = remove_child(&nodes, PARENT, 2).unwrap().nodes;

    assert!(!nodes[0].is_hierarchy());
    assert_eq!(nodes[0].ordered_qty, dec!(99));
}

#[test]
fn unknown_child_is_a_diagnosed_no_op() {
    let nodes = three_and_seven();
    let update = update_child_quantity(&nodes, PARENT, 42, dec!(5)).unwrap();

    assert!(!update.is_clean());
    assert_eq!(update.nodes, nodes);
    assert_matches!(
        update.diagnostics.as_slice(),
        [HierarchyDiagnostic::UnknownChild { child_id: 42, .. }]
    );
}

#[test]
fn unknown_order_item_is_desynchronization() {
    let nodes = three_and_seven();
    assert_matches!(
        remove_child(&nodes, OrderItemKey(1), 1),
        Err(ServiceError::Desynchronized(_))
    );
}

#[test]
fn batch_child_total_follows_its_stocks() {
    let nodes = merge_hierarchy(&common::order_items(), &common::drafts());
    let update = set_stock_allocation(&nodes, PARENT, Some(7), 1, dec!(8)).unwrap();

    let child = update.nodes[0].child(7).unwrap();
    assert_eq!(child.stocks[0].draft_allocated_qty, Some(dec!(8)));
    assert_eq!(child.total_allocated_qty, Some(dec!(8)));
}

#[test]
fn leaf_stock_status_is_set_and_cleared() {
    let nodes = merge_hierarchy(&common::order_items(), &common::drafts());

    let flagged = set_stock_status(&nodes, LEAF, None, 22, Some(common::expiring()))
        .unwrap()
        .nodes;
    assert_eq!(
        flagged[1].stocks[1].draft_order_stock_status,
        Some(common::expiring())
    );

    let cleared = set_stock_status(&flagged, LEAF, None, 22, None).unwrap().nodes;
    assert_eq!(cleared[1].stocks[1].draft_order_stock_status, None);
}

#[test]
fn unknown_stock_is_diagnosed() {
    let nodes = merge_hierarchy(&common::order_items(), &common::drafts());
    let update = set_stock_allocation(&nodes, LEAF, None, 999, dec!(1)).unwrap();

    assert_eq!(
        update.diagnostics,
        vec![HierarchyDiagnostic::UnknownStock {
            key: LEAF,
            child_id: None,
            stock_id: 999
        }]
    );
    assert_eq!(
        update.diagnostics[0].to_string(),
        format!("order item {} has no stock 999", common::LEAF_ITEM_ID)
    );
}

#[test]
fn drafts_export_keeps_edits() {
    let nodes = merge_hierarchy(&common::order_items(), &common::drafts());
    let nodes = update_child_quantity(&nodes, PARENT, 8, dec!(2)).unwrap().nodes;

    let drafts = to_drafts(&nodes);
    assert_eq!(drafts.len(), 2);
    let children = drafts[0].material_hierarchy.as_ref().unwrap();
    assert_eq!(children[1].confirmed_qty, Some(dec!(2)));
    assert!(drafts[1].material_hierarchy.is_none());
}

#[test]
fn recompute_restores_stale_totals() {
    let mut nodes = three_and_seven();
    nodes[0].ordered_qty = dec!(0);
    let nodes = hierarchy_aggregator::recompute_totals(&nodes);
    assert_eq!(nodes[0].ordered_qty, dec!(10));
}

#[test]
fn totals_saturate_instead_of_overflowing() {
    let mut batch = TrademarkMaterial::new(1, 5001, Decimal::MAX);
    batch.is_batch = true;
    batch.stocks = vec![
        AllocationStockEntry::new(1, Decimal::MAX),
        AllocationStockEntry::new(2, dec!(1)),
    ];
    let mut drafts = HashMap::new();
    drafts.insert(
        500,
        HierarchyDraft {
            material_id: 500,
            material_hierarchy: Some(vec![batch, TrademarkMaterial::new(2, 5002, Decimal::MAX)]),
        },
    );

    let nodes = merge_hierarchy(&[OrderItem::new(common::PARENT_ITEM_ID, 500, dec!(1))], &drafts);
    assert_eq!(nodes[0].ordered_qty, Decimal::MAX);

    let update = set_stock_allocation(&nodes, PARENT, Some(1), 2, Decimal::MAX).unwrap();
    assert!(update.is_clean());
    assert_eq!(
        update.nodes[0].child(1).unwrap().total_allocated_qty,
        Some(Decimal::MAX)
    );

    let update = update_child_quantity(&update.nodes, PARENT, 2, Decimal::MAX).unwrap();
    assert_eq!(update.nodes[0].ordered_qty, Decimal::MAX);
}
