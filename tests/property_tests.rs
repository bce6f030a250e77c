//! Property-based tests for the quantity engine.
//!
//! These tests use proptest to check the derivation, validation and
//! aggregation invariants across a wide range of quantities.

mod common;

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use supplyline_engine::models::{
    DiscardState, HierarchyDraft, OrderItem, OrderItemKey, TrademarkMaterial, TransactionLine,
};
use supplyline_engine::services::{self, hierarchy_aggregator};
use supplyline_engine::validation::{validate_line, Field, ViolationKind};

// Strategies for generating test data
fn qty_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..100_000).prop_map(Decimal::from)
}

fn optional_qty_strategy() -> impl Strategy<Value = Option<Decimal>> {
    proptest::option::of(qty_strategy())
}

fn piece_units_strategy() -> impl Strategy<Value = u32> {
    2u32..500
}

// Property: combined quantity follows the vial mode
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn sealed_effective_qty_is_change_qty(change in optional_qty_strategy()) {
        let mut line = TransactionLine::sealed(1, 5);
        if let Some(change) = change {
            line = line.with_change_qty(change);
        }
        prop_assert_eq!(services::effective_qty(&line), change.unwrap_or(Decimal::ZERO));
    }

    #[test]
    fn open_vial_effective_qty_sums_parts(
        open in optional_qty_strategy(),
        close in optional_qty_strategy(),
    ) {
        let line = TransactionLine::open_vial(1, 10).with_vial_qty(open, close);
        prop_assert_eq!(
            services::effective_qty(&line),
            open.unwrap_or(Decimal::ZERO) + close.unwrap_or(Decimal::ZERO)
        );
    }

    #[test]
    fn net_return_subtracts_positive_discard(total in 1u32..10_000, broken in 1u32..10_000) {
        let broken = broken.min(total);
        let line = TransactionLine::sealed(1, 1)
            .with_change_qty(Decimal::from(total))
            .with_discard(common::discard(Decimal::from(broken)));
        prop_assert_eq!(
            services::number_of_return(&line),
            Decimal::from(total) - Decimal::from(broken)
        );
    }
}

// Property: rule outcomes for generated units and bounds
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn change_qty_must_be_whole_containers(p in piece_units_strategy()) {
        let units = Decimal::from(p);

        let whole = TransactionLine::sealed(1, p).with_change_qty(units * Decimal::TWO);
        prop_assert!(validate_line(&whole).get(Field::ChangeQty).is_none());

        let partial = TransactionLine::sealed(1, p).with_change_qty(units + Decimal::ONE);
        prop_assert_eq!(
            validate_line(&partial).kind_of(Field::ChangeQty),
            Some(ViolationKind::NotMultipleOfUnit)
        );
    }

    #[test]
    fn change_qty_is_bounded_by_max_return(max in 1u32..100_000) {
        let max = Decimal::from(max);

        let at_bound = TransactionLine::sealed(1, 1)
            .with_change_qty(max)
            .with_max_return(max);
        prop_assert!(validate_line(&at_bound).is_valid());

        let over = TransactionLine::sealed(1, 1)
            .with_change_qty(max + Decimal::ONE)
            .with_max_return(max);
        prop_assert_eq!(
            validate_line(&over).kind_of(Field::ChangeQty),
            Some(ViolationKind::MaxExceeded)
        );
    }

    #[test]
    fn open_vial_is_less_than_a_container(p in piece_units_strategy()) {
        let units = Decimal::from(p);

        let full = TransactionLine::open_vial(1, p).with_vial_qty(Some(units), None);
        prop_assert_eq!(
            validate_line(&full).kind_of(Field::OpenVialQty),
            Some(ViolationKind::MaxExceeded)
        );

        let partial = TransactionLine::open_vial(1, p).with_vial_qty(Some(units - Decimal::ONE), None);
        prop_assert!(validate_line(&partial).get(Field::OpenVialQty).is_none());
    }

    #[test]
    fn opened_vial_is_discarded_whole(open in 1u32..10, short_by in 1u32..10) {
        let open = Decimal::from(open);
        let line = |broken: Decimal| {
            TransactionLine::open_vial(1, 10)
                .with_vial_qty(Some(open), None)
                .with_reason(common::reason())
                .with_discard(DiscardState {
                    is_any_discard: true,
                    broken_open_vial: Some(broken),
                    ..Default::default()
                })
        };

        prop_assert!(validate_line(&line(open)).get(Field::BrokenOpenVial).is_none());

        let short = open - Decimal::from(short_by);
        if short > Decimal::ZERO {
            prop_assert_eq!(
                validate_line(&line(short)).kind_of(Field::BrokenOpenVial),
                Some(ViolationKind::MustEqual)
            );
        }
    }
}

// Property: parent totals track children
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn parent_total_is_sum_of_children(
        qtys in proptest::collection::vec(0u32..1_000, 1..8),
        edited in any::<prop::sample::Index>(),
        new_qty in 0u32..1_000,
    ) {
        let children: Vec<TrademarkMaterial> = qtys
            .iter()
            .enumerate()
            .map(|(i, q)| TrademarkMaterial::new(i as i64 + 1, 9000 + i as i64, Decimal::from(*q)))
            .collect();
        let mut drafts = HashMap::new();
        drafts.insert(500, HierarchyDraft { material_id: 500, material_hierarchy: Some(children) });
        let nodes = hierarchy_aggregator::merge_hierarchy(&[OrderItem::new(1, 500, Decimal::ZERO)], &drafts);

        let index = edited.index(qtys.len());
        let update = hierarchy_aggregator::update_child_quantity(
            &nodes,
            OrderItemKey(1),
            index as i64 + 1,
            Decimal::from(new_qty),
        )
        .unwrap();

        let expected: u32 = qtys.iter().sum::<u32>() - qtys[index] + new_qty;
        prop_assert_eq!(update.nodes[0].ordered_qty, Decimal::from(expected));
        prop_assert_eq!(nodes[0].ordered_qty, Decimal::from(qtys.iter().sum::<u32>()));
    }
}
