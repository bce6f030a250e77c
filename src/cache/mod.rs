// Local draft cache: read at session start, never written by the engine

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::HierarchyDraft;

/// A previously persisted draft tree for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub order_id: i64,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub drafts: Vec<HierarchyDraft>,
}

impl DraftSnapshot {
    pub fn new(order_id: i64, drafts: Vec<HierarchyDraft>) -> Self {
        Self {
            order_id,
            saved_at: Utc::now(),
            drafts,
        }
    }

    /// Drafts keyed by their active-ingredient material. A later draft for
    /// the same material replaces an earlier one.
    pub fn by_material(&self) -> HashMap<i64, HierarchyDraft> {
        self.drafts
            .iter()
            .map(|draft| (draft.material_id, draft.clone()))
            .collect()
    }
}

/// Point-in-time read access to saved drafts.
pub trait DraftStore: Send + Sync {
    fn load(&self, order_id: i64) -> Result<Option<DraftSnapshot>, ServiceError>;
}

// In-memory draft store; values are kept serialized so every load hands out
// an independent copy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDraftStore {
    store: Arc<DashMap<String, String>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(order_id: i64) -> String {
        format!("draft:{}", order_id)
    }

    pub fn put(&self, snapshot: &DraftSnapshot) -> Result<(), ServiceError> {
        let value = serde_json::to_string(snapshot)
            .map_err(|e| ServiceError::DraftStoreError(format!("Failed to encode draft: {}", e)))?;
        self.store.insert(Self::key(snapshot.order_id), value);
        debug!(order_id = snapshot.order_id, "Stored draft snapshot");
        Ok(())
    }

    /// Stores a raw value as-is, for callers that hydrate the cache from disk.
    pub fn put_raw(&self, order_id: i64, value: impl Into<String>) {
        self.store.insert(Self::key(order_id), value.into());
    }

    pub fn remove(&self, order_id: i64) {
        self.store.remove(&Self::key(order_id));
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load(&self, order_id: i64) -> Result<Option<DraftSnapshot>, ServiceError> {
        let Some(raw) = self.store.get(&Self::key(order_id)).map(|v| v.value().clone()) else {
            return Ok(None);
        };

        let snapshot: DraftSnapshot = serde_json::from_str(&raw).map_err(|e| {
            ServiceError::DraftStoreError(format!(
                "Stored draft for order {} is unreadable: {}",
                order_id, e
            ))
        })?;
        Ok(Some(snapshot))
    }
}
