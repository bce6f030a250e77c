// Transaction lines
pub mod line_edits;
pub mod quantity;

// Ordering hierarchy
pub mod allocation_builder;
pub mod draft_session;
pub mod hierarchy_aggregator;

pub use allocation_builder::{build_order_item_payloads, build_request};
pub use draft_session::{AllocationEdit, DraftSession};
pub use hierarchy_aggregator::{
    merge_hierarchy, recompute_totals, remove_child, set_stock_allocation, set_stock_status,
    to_drafts, update_child_quantity, update_item_quantity, HierarchyDiagnostic,
    HierarchyUpdate,
};
pub use line_edits::{apply_and_revalidate, apply_edit, LineEdit};
pub use quantity::{
    effective_discard_qty, effective_qty, number_of_return, number_of_return_for,
    number_of_return_with,
};
