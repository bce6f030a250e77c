mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use serde_json::json;
use supplyline_engine::models::{OrderItemAllocationPayload, OrderItemKey};
use supplyline_engine::services::{AllocationEdit, DraftSession};
use supplyline_engine::{DraftStore, EngineConfig, InMemoryDraftStore, ServiceError};

const PARENT: OrderItemKey = OrderItemKey(common::PARENT_ITEM_ID);

fn session(store: &InMemoryDraftStore) -> DraftSession {
    DraftSession::start(
        common::ORDER_ID,
        common::order_items(),
        store,
        &EngineConfig::default(),
    )
    .expect("session starts")
}

#[test]
fn session_without_stored_draft_starts_flat() {
    let session = session(&InMemoryDraftStore::new());
    assert!(session.nodes().iter().all(|n| !n.is_hierarchy()));
    assert_eq!(session.order_id(), common::ORDER_ID);
}

#[test]
fn edits_flow_through_to_the_request() {
    let session = session(&common::seeded_store());

    let edited = session
        .apply_all(vec![
            AllocationEdit::ChildQuantity {
                key: PARENT,
                child_id: 8,
                qty: dec!(11),
            },
            AllocationEdit::StockAllocation {
                key: PARENT,
                child_id: Some(7),
                stock_id: 1,
                qty: dec!(6),
            },
        ])
        .unwrap();

    assert_eq!(edited.node(PARENT).unwrap().ordered_qty, dec!(14));
    assert_eq!(session.node(PARENT).unwrap().ordered_qty, dec!(10));

    let request = edited.build_request().unwrap();
    assert_eq!(request.id, common::ORDER_ID);
    assert_matches!(
        &request.order_items[0],
        OrderItemAllocationPayload::Hierarchy { id, .. } if *id == common::PARENT_ITEM_ID
    );
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value["order_items"][0]["children"][0]["allocations"][0]["allocated_qty"],
        json!(6.0)
    );
}

#[test]
fn snapshot_round_trips_through_the_store() {
    let store = common::seeded_store();
    let edited = session(&store)
        .apply(AllocationEdit::RemoveChild {
            key: PARENT,
            child_id: 7,
        })
        .unwrap();

    store.put(&edited.snapshot()).unwrap();
    let reloaded = session(&store);

    let node = reloaded.node(PARENT).unwrap();
    assert_eq!(node.children.len(), 1);
    assert_eq!(node.ordered_qty, dec!(7));
    assert_ne!(reloaded.id(), edited.id());
}

#[test]
fn corrupt_stored_draft_fails_the_start() {
    let store = InMemoryDraftStore::new();
    store.put_raw(common::ORDER_ID, "{not json");

    assert_matches!(
        DraftSession::start(
            common::ORDER_ID,
            common::order_items(),
            &store,
            &EngineConfig::default(),
        ),
        Err(ServiceError::DraftStoreError(_))
    );
    assert!(store.load(common::ORDER_ID).is_err());
}

#[test]
fn edits_deserialize_from_tagged_json() {
    let edit: AllocationEdit = serde_json::from_value(json!({
        "type": "stock_status",
        "key": 301,
        "stock_id": 22,
        "status": { "value": 3, "label": "Near expiry" }
    }))
    .unwrap();

    assert_eq!(edit.key(), OrderItemKey(common::LEAF_ITEM_ID));
    let edited = session(&common::seeded_store()).apply(edit).unwrap();
    assert_eq!(
        edited.node(OrderItemKey(common::LEAF_ITEM_ID)).unwrap().stocks[1].draft_order_stock_status,
        Some(common::expiring())
    );
}
