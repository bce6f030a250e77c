// Transaction lines
pub mod stock_taking_line;
pub mod transaction_line;

// Ordering hierarchy and submission payloads
pub mod allocation_payload;
pub mod hierarchy;

pub use allocation_payload::{
    AllocationRequest, BatchChildAllocation, ChildAllocationPayload, FlatChildAllocation,
    OrderItemAllocationPayload, StockAllocation,
};
pub use hierarchy::{
    AllocationStockEntry, HierarchyDraft, MaterialHierarchyNode, OrderItem, OrderItemKey,
    OrderReason, OrderStockStatus, TrademarkMaterial,
};
pub use stock_taking_line::StockTakingLine;
pub use transaction_line::{
    Batch, ConsumptionRecord, DiscardState, LineQuantities, TransactionLine,
    TransactionLineRecord, TransactionReason,
};
