//! Allocation draft session
//!
//! Holds the original order items next to the edited hierarchy snapshot for
//! one order. Edits are pure transitions: `apply` returns the next session
//! and leaves the current one untouched, so a review screen can keep showing
//! the snapshot it was given.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::cache::{DraftSnapshot, DraftStore};
use crate::config::EngineConfig;
use crate::errors::ServiceError;
use crate::models::{
    AllocationRequest, MaterialHierarchyNode, OrderItem, OrderItemKey, OrderStockStatus,
};
use crate::services::allocation_builder;
use crate::services::hierarchy_aggregator::{self, HierarchyDiagnostic, HierarchyUpdate};

/// One user edit against the allocation draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllocationEdit {
    ChildQuantity {
        key: OrderItemKey,
        child_id: i64,
        qty: Decimal,
    },
    ItemQuantity {
        key: OrderItemKey,
        qty: Decimal,
    },
    RemoveChild {
        key: OrderItemKey,
        child_id: i64,
    },
    StockAllocation {
        key: OrderItemKey,
        #[serde(default)]
        child_id: Option<i64>,
        stock_id: i64,
        qty: Decimal,
    },
    StockStatus {
        key: OrderItemKey,
        #[serde(default)]
        child_id: Option<i64>,
        stock_id: i64,
        #[serde(default)]
        status: Option<OrderStockStatus>,
    },
}

impl AllocationEdit {
    pub fn key(&self) -> OrderItemKey {
        match self {
            AllocationEdit::ChildQuantity { key, .. }
            | AllocationEdit::ItemQuantity { key, .. }
            | AllocationEdit::RemoveChild { key, .. }
            | AllocationEdit::StockAllocation { key, .. }
            | AllocationEdit::StockStatus { key, .. } => *key,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DraftSession {
    id: Uuid,
    order_id: i64,
    started_at: DateTime<Utc>,
    original: Arc<[OrderItem]>,
    nodes: Vec<MaterialHierarchyNode>,
    diagnostics: Vec<HierarchyDiagnostic>,
    surface_diagnostics: bool,
}

impl DraftSession {
    /// Joins the order items with whatever drafts the store holds for the
    /// order.
    #[instrument(skip(items, store, config), fields(items = items.len()))]
    pub fn start(
        order_id: i64,
        items: Vec<OrderItem>,
        store: &dyn DraftStore,
        config: &EngineConfig,
    ) -> Result<Self, ServiceError> {
        let drafts = store
            .load(order_id)?
            .map(|snapshot| snapshot.by_material())
            .unwrap_or_default();
        let nodes = hierarchy_aggregator::merge_hierarchy(&items, &drafts);

        let session = Self {
            id: Uuid::new_v4(),
            order_id,
            started_at: Utc::now(),
            original: items.into(),
            nodes,
            diagnostics: Vec::new(),
            surface_diagnostics: config.surface_hierarchy_diagnostics,
        };

        info!(
            session_id = %session.id,
            order_id,
            restored_drafts = drafts.len(),
            "Started allocation draft session"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn original(&self) -> &[OrderItem] {
        &self.original
    }

    pub fn nodes(&self) -> &[MaterialHierarchyNode] {
        &self.nodes
    }

    pub fn node(&self, key: OrderItemKey) -> Option<&MaterialHierarchyNode> {
        self.nodes.iter().find(|node| node.key == key)
    }

    /// Edits that could not be applied so far. Always empty when diagnostics
    /// are not surfaced; they are still logged.
    pub fn diagnostics(&self) -> &[HierarchyDiagnostic] {
        &self.diagnostics
    }

    /// Returns the session after `edit`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn apply(&self, edit: AllocationEdit) -> Result<Self, ServiceError> {
        let nodes = &self.nodes;
        let update: HierarchyUpdate = match edit {
            AllocationEdit::ChildQuantity { key, child_id, qty } => {
                hierarchy_aggregator::update_child_quantity(nodes, key, child_id, qty)?
            }
            AllocationEdit::ItemQuantity { key, qty } => {
                hierarchy_aggregator::update_item_quantity(nodes, key, qty)?
            }
            AllocationEdit::RemoveChild { key, child_id } => {
                hierarchy_aggregator::remove_child(nodes, key, child_id)?
            }
            AllocationEdit::StockAllocation {
                key,
                child_id,
                stock_id,
                qty,
            } => hierarchy_aggregator::set_stock_allocation(nodes, key, child_id, stock_id, qty)?,
            AllocationEdit::StockStatus {
                key,
                child_id,
                stock_id,
                status,
            } => hierarchy_aggregator::set_stock_status(nodes, key, child_id, stock_id, status)?,
        };

        let mut diagnostics = self.diagnostics.clone();
        if self.surface_diagnostics {
            diagnostics.extend(update.diagnostics);
        }

        Ok(Self {
            id: self.id,
            order_id: self.order_id,
            started_at: self.started_at,
            original: Arc::clone(&self.original),
            nodes: update.nodes,
            diagnostics,
            surface_diagnostics: self.surface_diagnostics,
        })
    }

    /// Applies edits in order, stopping at the first error.
    pub fn apply_all<I>(&self, edits: I) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = AllocationEdit>,
    {
        edits
            .into_iter()
            .try_fold(self.clone(), |session, edit| session.apply(edit))
    }

    /// The draft to persist. Writing it is up to the caller.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot::new(self.order_id, hierarchy_aggregator::to_drafts(&self.nodes))
    }

    pub fn build_request(&self) -> Result<AllocationRequest, ServiceError> {
        allocation_builder::build_request(self.order_id, &self.original, &self.nodes)
    }
}
