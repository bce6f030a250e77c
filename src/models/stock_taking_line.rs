use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction_line::Batch;

/// One counted stock entry in a stock-taking session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTakingLine {
    pub stock_id: i64,
    #[serde(default)]
    pub batch: Option<Batch>,
    /// Quantity the system currently records on hand.
    #[serde(default)]
    pub recorded_qty: Option<Decimal>,
    /// Quantity shipped towards this facility but not yet received.
    #[serde(default)]
    pub in_transit_qty: Option<Decimal>,
    /// Quantity physically counted by the operator.
    #[serde(default)]
    pub actual_qty: Option<Decimal>,
}

impl StockTakingLine {
    pub fn new(stock_id: i64) -> Self {
        Self {
            stock_id,
            ..Default::default()
        }
    }

    pub fn with_recorded(mut self, recorded_qty: Decimal, in_transit_qty: Decimal) -> Self {
        self.recorded_qty = Some(recorded_qty);
        self.in_transit_qty = Some(in_transit_qty);
        self
    }

    pub fn with_actual(mut self, actual_qty: Decimal) -> Self {
        self.actual_qty = Some(actual_qty);
        self
    }

    /// Whether the system believes there is anything to count for this entry.
    pub fn expects_count(&self) -> bool {
        let positive = |v: Option<Decimal>| v.map_or(false, |v| v > Decimal::ZERO);
        positive(self.recorded_qty) || positive(self.in_transit_qty)
    }
}
