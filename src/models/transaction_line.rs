use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Batch information attached to a stock entry. Its presence marks the
/// material as batch-managed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub code: String,
    #[serde(default)]
    pub expired_date: Option<NaiveDate>,
}

/// Reason code chosen for a discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReason {
    pub id: i64,
    #[serde(default)]
    pub is_other: bool,
    #[serde(default)]
    pub is_purchase: bool,
}

/// The active quantity representation of a line.
///
/// A sealed line is edited as a single `change_qty`; an open-vial line splits
/// the same movement into the doses left in an opened vial and the closed
/// containers returned alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LineQuantities {
    Sealed {
        change_qty: Option<Decimal>,
    },
    OpenVial {
        open_vial_qty: Option<Decimal>,
        close_vial_qty: Option<Decimal>,
    },
}

impl Default for LineQuantities {
    fn default() -> Self {
        LineQuantities::Sealed { change_qty: None }
    }
}

/// How much of the returned quantity was broken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscardState {
    pub is_any_discard: bool,
    pub broken_qty: Option<Decimal>,
    pub broken_open_vial: Option<Decimal>,
    pub broken_close_vial: Option<Decimal>,
}

/// One stock movement being edited (return, discard or open-vial transaction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub stock_id: i64,
    pub batch: Option<Batch>,
    pub piece_units_per_container: u32,
    pub max_return: Option<Decimal>,
    pub quantities: LineQuantities,
    pub discard: DiscardState,
    pub transaction_reason: Option<TransactionReason>,
    pub other_reason_text: Option<String>,
}

impl TransactionLine {
    /// Creates an empty sealed line for the given stock.
    pub fn sealed(stock_id: i64, piece_units_per_container: u32) -> Self {
        Self {
            stock_id,
            batch: None,
            piece_units_per_container,
            max_return: None,
            quantities: LineQuantities::Sealed { change_qty: None },
            discard: DiscardState::default(),
            transaction_reason: None,
            other_reason_text: None,
        }
    }

    /// Creates an empty open-vial line for the given stock.
    pub fn open_vial(stock_id: i64, piece_units_per_container: u32) -> Self {
        Self {
            quantities: LineQuantities::OpenVial {
                open_vial_qty: None,
                close_vial_qty: None,
            },
            ..Self::sealed(stock_id, piece_units_per_container)
        }
    }

    pub fn with_max_return(mut self, max_return: Decimal) -> Self {
        self.max_return = Some(max_return);
        self
    }

    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn with_change_qty(mut self, qty: Decimal) -> Self {
        self.quantities = LineQuantities::Sealed {
            change_qty: Some(qty),
        };
        self
    }

    pub fn with_vial_qty(mut self, open_vial_qty: Option<Decimal>, close_vial_qty: Option<Decimal>) -> Self {
        self.quantities = LineQuantities::OpenVial {
            open_vial_qty,
            close_vial_qty,
        };
        self
    }

    pub fn with_discard(mut self, discard: DiscardState) -> Self {
        self.discard = discard;
        self
    }

    pub fn with_reason(mut self, reason: TransactionReason) -> Self {
        self.transaction_reason = Some(reason);
        self
    }

    pub fn with_other_reason_text(mut self, text: impl Into<String>) -> Self {
        self.other_reason_text = Some(text.into());
        self
    }

    pub fn is_open_vial(&self) -> bool {
        matches!(self.quantities, LineQuantities::OpenVial { .. })
    }

    pub fn is_batch_managed(&self) -> bool {
        self.batch.is_some()
    }

    /// Units per container as a decimal. A zero unit count never reaches the
    /// modulo rules; it is clamped to one.
    pub fn piece_units(&self) -> Decimal {
        Decimal::from(self.piece_units_per_container.max(1))
    }

    pub fn change_qty(&self) -> Option<Decimal> {
        match self.quantities {
            LineQuantities::Sealed { change_qty } => change_qty,
            LineQuantities::OpenVial { .. } => None,
        }
    }

    pub fn open_vial_qty(&self) -> Option<Decimal> {
        match self.quantities {
            LineQuantities::OpenVial { open_vial_qty, .. } => open_vial_qty,
            LineQuantities::Sealed { .. } => None,
        }
    }

    pub fn close_vial_qty(&self) -> Option<Decimal> {
        match self.quantities {
            LineQuantities::OpenVial { close_vial_qty, .. } => close_vial_qty,
            LineQuantities::Sealed { .. } => None,
        }
    }
}

/// A consumption record picked from the stock history to be returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    pub stock_id: i64,
    #[serde(default)]
    pub batch: Option<Batch>,
    #[serde(default)]
    pub is_open_vial: bool,
    pub piece_units_per_container: u32,
    pub consumed_qty: Decimal,
}

impl From<&ConsumptionRecord> for TransactionLine {
    /// A freshly selected record starts with no quantities and may return at
    /// most what was consumed.
    fn from(record: &ConsumptionRecord) -> Self {
        let line = if record.is_open_vial {
            TransactionLine::open_vial(record.stock_id, record.piece_units_per_container)
        } else {
            TransactionLine::sealed(record.stock_id, record.piece_units_per_container)
        };
        TransactionLine {
            batch: record.batch.clone(),
            max_return: Some(record.consumed_qty),
            ..line
        }
    }
}

/// Flat shape exchanged with the form state collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLineRecord {
    pub stock_id: i64,
    #[serde(default)]
    pub batch: Option<Batch>,
    #[serde(default)]
    pub is_open_vial: bool,
    pub piece_units_per_container: u32,
    #[serde(default)]
    pub change_qty: Option<Decimal>,
    #[serde(default)]
    pub open_vial_qty: Option<Decimal>,
    #[serde(default)]
    pub close_vial_qty: Option<Decimal>,
    #[serde(default)]
    pub max_return: Option<Decimal>,
    #[serde(default)]
    pub is_any_discard: bool,
    #[serde(default)]
    pub broken_qty: Option<Decimal>,
    #[serde(default)]
    pub broken_open_vial: Option<Decimal>,
    #[serde(default)]
    pub broken_close_vial: Option<Decimal>,
    #[serde(default)]
    pub transaction_reason: Option<TransactionReason>,
    #[serde(default)]
    pub other_reason_text: Option<String>,
}

impl From<TransactionLineRecord> for TransactionLine {
    fn from(record: TransactionLineRecord) -> Self {
        // Only the representation selected by the vial flag survives.
        let quantities = if record.is_open_vial {
            LineQuantities::OpenVial {
                open_vial_qty: record.open_vial_qty,
                close_vial_qty: record.close_vial_qty,
            }
        } else {
            LineQuantities::Sealed {
                change_qty: record.change_qty,
            }
        };

        TransactionLine {
            stock_id: record.stock_id,
            batch: record.batch,
            piece_units_per_container: record.piece_units_per_container,
            max_return: record.max_return,
            quantities,
            discard: DiscardState {
                is_any_discard: record.is_any_discard,
                broken_qty: record.broken_qty,
                broken_open_vial: record.broken_open_vial,
                broken_close_vial: record.broken_close_vial,
            },
            transaction_reason: record.transaction_reason,
            other_reason_text: record.other_reason_text,
        }
    }
}

impl From<&TransactionLine> for TransactionLineRecord {
    fn from(line: &TransactionLine) -> Self {
        TransactionLineRecord {
            stock_id: line.stock_id,
            batch: line.batch.clone(),
            is_open_vial: line.is_open_vial(),
            piece_units_per_container: line.piece_units_per_container,
            change_qty: line.change_qty(),
            open_vial_qty: line.open_vial_qty(),
            close_vial_qty: line.close_vial_qty(),
            max_return: line.max_return,
            is_any_discard: line.discard.is_any_discard,
            broken_qty: line.discard.broken_qty,
            broken_open_vial: line.discard.broken_open_vial,
            broken_close_vial: line.discard.broken_close_vial,
            transaction_reason: line.transaction_reason.clone(),
            other_reason_text: line.other_reason_text.clone(),
        }
    }
}
