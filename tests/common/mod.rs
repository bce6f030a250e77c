#![allow(dead_code)]

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use supplyline_engine::models::{
    AllocationStockEntry, DiscardState, HierarchyDraft, OrderItem, OrderReason,
    OrderStockStatus, TrademarkMaterial, TransactionLine, TransactionReason,
};
use supplyline_engine::{DraftSnapshot, InMemoryDraftStore};

pub const ORDER_ID: i64 = 42;
pub const PARENT_ITEM_ID: i64 = 300;
pub const PARENT_MATERIAL_ID: i64 = 500;
pub const LEAF_ITEM_ID: i64 = 301;

pub fn reason() -> TransactionReason {
    TransactionReason {
        id: 2,
        is_other: false,
        is_purchase: false,
    }
}

pub fn other_reason() -> TransactionReason {
    TransactionReason {
        id: 9,
        is_other: true,
        is_purchase: false,
    }
}

pub fn discard(broken_qty: Decimal) -> DiscardState {
    DiscardState {
        is_any_discard: true,
        broken_qty: Some(broken_qty),
        ..Default::default()
    }
}

/// Sealed return of four boxes of five, one of them broken.
pub fn sealed_return() -> TransactionLine {
    TransactionLine::sealed(1001, 5)
        .with_change_qty(dec!(20))
        .with_max_return(dec!(20))
        .with_discard(discard(dec!(5)))
        .with_reason(reason())
}

/// Open vial of ten doses: four doses left plus two closed vials.
pub fn open_vial_return() -> TransactionLine {
    TransactionLine::open_vial(1002, 10)
        .with_vial_qty(Some(dec!(4)), Some(dec!(20)))
        .with_max_return(dec!(30))
}

pub fn batch_child() -> TrademarkMaterial {
    TrademarkMaterial {
        is_batch: true,
        total_allocated_qty: Some(dec!(5)),
        stocks: vec![AllocationStockEntry::new(1, dec!(5))],
        ..TrademarkMaterial::new(7, 9001, dec!(3))
    }
}

pub fn flat_child() -> TrademarkMaterial {
    TrademarkMaterial {
        total_allocated_qty: Some(dec!(9)),
        order_item_level_id: Some(2),
        ..TrademarkMaterial::new(8, 9002, dec!(7))
    }
}

pub fn expiring() -> OrderStockStatus {
    OrderStockStatus {
        value: 3,
        label: "Near expiry".into(),
    }
}

/// One hierarchy parent and one plain leaf item.
pub fn order_items() -> Vec<OrderItem> {
    let mut parent = OrderItem::new(PARENT_ITEM_ID, PARENT_MATERIAL_ID, dec!(10));
    parent.recommended_stock = Some(dec!(120));
    parent.reason = Some(OrderReason {
        id: 4,
        label: Some("Campaign".into()),
    });

    let mut leaf = OrderItem::new(LEAF_ITEM_ID, 600, dec!(6));
    leaf.stocks = vec![
        AllocationStockEntry::new(21, dec!(4)),
        AllocationStockEntry::new(22, dec!(2)),
    ];

    vec![parent, leaf]
}

pub fn parent_draft() -> HierarchyDraft {
    HierarchyDraft {
        material_id: PARENT_MATERIAL_ID,
        material_hierarchy: Some(vec![batch_child(), flat_child()]),
    }
}

pub fn drafts() -> HashMap<i64, HierarchyDraft> {
    let mut drafts = HashMap::new();
    drafts.insert(PARENT_MATERIAL_ID, parent_draft());
    drafts
}

pub fn seeded_store() -> InMemoryDraftStore {
    let store = InMemoryDraftStore::new();
    store
        .put(&DraftSnapshot::new(ORDER_ID, vec![parent_draft()]))
        .expect("seed draft store");
    store
}
