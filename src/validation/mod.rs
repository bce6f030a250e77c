//! Field validation rule set for transaction and stock-taking lines.
//!
//! Validation never fails as an operation: a record is turned into a
//! [`ValidationReport`] listing at most one violation per field, and the
//! caller decides whether to block submission. Lines are independent; there
//! are no cross-line rules.

pub mod field;
pub mod report;
pub mod rules;

use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

pub use field::Field;
pub use report::{FieldViolation, ValidationReport, ViolationKind};
pub use rules::{FieldRule, RuleSubject};

use crate::models::{StockTakingLine, TransactionLine};
use crate::services::quantity;

impl RuleSubject for TransactionLine {
    fn quantity(&self, field: Field) -> Option<Decimal> {
        match field {
            Field::ChangeQty => self.change_qty(),
            Field::OpenVialQty => self.open_vial_qty(),
            Field::CloseVialQty => self.close_vial_qty(),
            Field::BrokenQty => self.discard.broken_qty,
            Field::BrokenOpenVial => self.discard.broken_open_vial,
            Field::BrokenCloseVial => self.discard.broken_close_vial,
            _ => None,
        }
    }

    fn is_filled(&self, field: Field) -> bool {
        match field {
            Field::TransactionReason => self.transaction_reason.is_some(),
            Field::OtherReasonText => self
                .other_reason_text
                .as_deref()
                .map_or(false, |text| !text.trim().is_empty()),
            _ => self.quantity(field).is_some(),
        }
    }

    fn piece_units(&self) -> Option<Decimal> {
        Some(TransactionLine::piece_units(self))
    }

    fn max_return(&self) -> Option<Decimal> {
        self.max_return
    }

    fn is_discarding(&self) -> bool {
        self.discard.is_any_discard
    }

    fn effective_qty(&self) -> Decimal {
        quantity::effective_qty(self)
    }

    fn reason_is_other(&self) -> bool {
        self.transaction_reason
            .as_ref()
            .map_or(false, |reason| reason.is_other)
    }

    fn rules(&self) -> &'static [FieldRule] {
        if self.is_open_vial() {
            rules::OPEN_VIAL_LINE_RULES
        } else {
            rules::SEALED_LINE_RULES
        }
    }
}

impl RuleSubject for StockTakingLine {
    fn quantity(&self, field: Field) -> Option<Decimal> {
        match field {
            Field::RecordedQty => self.recorded_qty,
            Field::InTransitQty => self.in_transit_qty,
            Field::ActualQty => self.actual_qty,
            _ => None,
        }
    }

    fn rules(&self) -> &'static [FieldRule] {
        rules::STOCK_TAKING_RULES
    }
}

/// Validates any record against its variant's rule table.
pub fn validate<S: RuleSubject + ?Sized>(subject: &S) -> ValidationReport {
    let mut report = ValidationReport::new();
    for rule in subject.rules() {
        if let Some(violation) = rule.evaluate(subject) {
            counter!("supplyline.validation.violations", 1, "kind" => violation.kind.to_string());
            report.insert(rule.field, violation);
        }
    }
    report
}

pub fn validate_line(line: &TransactionLine) -> ValidationReport {
    let report = validate(line);
    debug!(
        stock_id = line.stock_id,
        open_vial = line.is_open_vial(),
        violations = report.len(),
        "Validated transaction line"
    );
    report
}

pub fn validate_stock_taking_line(line: &StockTakingLine) -> ValidationReport {
    validate(line)
}

/// Revalidates after `edited` changed: the edited field and every field whose
/// rule reads it. Other fields keep whatever state the caller already holds.
pub fn revalidate(line: &TransactionLine, edited: Field) -> ValidationReport {
    let affected = rules::dependents(line.rules(), edited);
    let mut report = validate(line);
    report.retain(&affected);
    report
}

/// Fields to refresh in the form after `edited` changed.
pub fn affected_fields(line: &TransactionLine, edited: Field) -> Vec<Field> {
    rules::dependents(line.rules(), edited)
}

/// Report for one line of a list, keyed by its stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport {
    pub stock_id: i64,
    pub report: ValidationReport,
}

impl LineReport {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}

pub fn validate_lines(lines: &[TransactionLine]) -> Vec<LineReport> {
    lines
        .iter()
        .map(|line| LineReport {
            stock_id: line.stock_id,
            report: validate_line(line),
        })
        .collect()
}

pub fn validate_stock_taking_lines(lines: &[StockTakingLine]) -> Vec<LineReport> {
    lines
        .iter()
        .map(|line| LineReport {
            stock_id: line.stock_id,
            report: validate_stock_taking_line(line),
        })
        .collect()
}
