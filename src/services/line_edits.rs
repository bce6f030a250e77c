//! Field-level edits applied to a transaction line as pure transitions.
//!
//! The form collaborator sends `(fieldPath, value)` pairs on every keystroke.
//! Each pair is parsed into a [`LineEdit`], applied to a copy of the line and
//! followed by revalidation of the fields the edit can affect.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::{LineQuantities, TransactionLine, TransactionReason};
use crate::validation::{self, Field, ValidationReport};

#[derive(Debug, Clone, PartialEq)]
pub enum LineEdit {
    ChangeQty(Option<Decimal>),
    OpenVialQty(Option<Decimal>),
    CloseVialQty(Option<Decimal>),
    BrokenQty(Option<Decimal>),
    BrokenOpenVial(Option<Decimal>),
    BrokenCloseVial(Option<Decimal>),
    AnyDiscard(bool),
    /// Switches the line between sealed and open-vial entry.
    OpenVial(bool),
    Reason(Option<TransactionReason>),
    OtherReasonText(Option<String>),
}

impl LineEdit {
    /// Parses a form path and its raw value.
    pub fn from_path(path: &str, value: &Value) -> Result<Self, ServiceError> {
        match path {
            "isAnyDiscard" | "is_any_discard" => Ok(LineEdit::AnyDiscard(parse_flag(path, value)?)),
            "isOpenVial" | "is_open_vial" => Ok(LineEdit::OpenVial(parse_flag(path, value)?)),
            _ => {
                let field = Field::from_path(path).ok_or_else(|| {
                    ServiceError::InvalidInput(format!("Unknown field path: {}", path))
                })?;
                Self::for_field(field, value)
            }
        }
    }

    fn for_field(field: Field, value: &Value) -> Result<Self, ServiceError> {
        let edit = match field {
            Field::ChangeQty => LineEdit::ChangeQty(parse_quantity(field, value)?),
            Field::OpenVialQty => LineEdit::OpenVialQty(parse_quantity(field, value)?),
            Field::CloseVialQty => LineEdit::CloseVialQty(parse_quantity(field, value)?),
            Field::BrokenQty => LineEdit::BrokenQty(parse_quantity(field, value)?),
            Field::BrokenOpenVial => LineEdit::BrokenOpenVial(parse_quantity(field, value)?),
            Field::BrokenCloseVial => LineEdit::BrokenCloseVial(parse_quantity(field, value)?),
            Field::TransactionReason => {
                let reason = if value.is_null() {
                    None
                } else {
                    Some(serde_json::from_value(value.clone()).map_err(|e| {
                        ServiceError::InvalidInput(format!("Invalid transaction reason: {}", e))
                    })?)
                };
                LineEdit::Reason(reason)
            }
            Field::OtherReasonText => match value {
                Value::Null => LineEdit::OtherReasonText(None),
                Value::String(text) => LineEdit::OtherReasonText(Some(text.clone())),
                other => {
                    return Err(ServiceError::InvalidInput(format!(
                        "Expected text for {}, got {}",
                        field, other
                    )))
                }
            },
            Field::RecordedQty | Field::InTransitQty | Field::ActualQty => {
                return Err(ServiceError::InvalidInput(format!(
                    "{} is not a transaction line field",
                    field
                )))
            }
        };
        Ok(edit)
    }

    /// Field whose rule the edit touches directly. `None` for edits that
    /// switch the active rule table or gate, which require a full pass.
    pub fn field(&self) -> Option<Field> {
        match self {
            LineEdit::ChangeQty(_) => Some(Field::ChangeQty),
            LineEdit::OpenVialQty(_) => Some(Field::OpenVialQty),
            LineEdit::CloseVialQty(_) => Some(Field::CloseVialQty),
            LineEdit::BrokenQty(_) => Some(Field::BrokenQty),
            LineEdit::BrokenOpenVial(_) => Some(Field::BrokenOpenVial),
            LineEdit::BrokenCloseVial(_) => Some(Field::BrokenCloseVial),
            LineEdit::Reason(_) => Some(Field::TransactionReason),
            LineEdit::OtherReasonText(_) => Some(Field::OtherReasonText),
            LineEdit::AnyDiscard(_) | LineEdit::OpenVial(_) => None,
        }
    }
}

fn parse_flag(path: &str, value: &Value) -> Result<bool, ServiceError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Null => Ok(false),
        other => Err(ServiceError::InvalidInput(format!(
            "Expected a boolean for {}, got {}",
            path, other
        ))),
    }
}

/// Empty input clears the field; numbers arrive either as JSON numbers or as
/// the raw text of the input box.
fn parse_quantity(field: Field, value: &Value) -> Result<Option<Decimal>, ServiceError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(ServiceError::InvalidInput(format!(
                "Expected a quantity for {}, got {}",
                field, other
            )))
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(|qty| Some(qty.normalize()))
        .map_err(|_| ServiceError::InvalidInput(format!("Invalid quantity for {}: {}", field, text)))
}

fn sum_filled(
    field: Field,
    a: Option<Decimal>,
    b: Option<Decimal>,
) -> Result<Option<Decimal>, ServiceError> {
    match (a, b) {
        (None, None) => Ok(None),
        (a, b) => a
            .unwrap_or(Decimal::ZERO)
            .checked_add(b.unwrap_or(Decimal::ZERO))
            .map(Some)
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("Combined {} is out of range", field))
            }),
    }
}

fn wrong_mode(field: Field, line: &TransactionLine) -> ServiceError {
    let mode = if line.is_open_vial() { "open-vial" } else { "sealed" };
    ServiceError::InvalidInput(format!("{} cannot be edited on a {} line", field, mode))
}

/// Returns the edited copy of `line`. Quantity edits must target the line's
/// active representation.
pub fn apply_edit(line: &TransactionLine, edit: LineEdit) -> Result<TransactionLine, ServiceError> {
    let mut next = line.clone();

    match edit {
        LineEdit::ChangeQty(qty) => match &mut next.quantities {
            LineQuantities::Sealed { change_qty } => *change_qty = qty,
            LineQuantities::OpenVial { .. } => return Err(wrong_mode(Field::ChangeQty, line)),
        },
        LineEdit::OpenVialQty(qty) => match &mut next.quantities {
            LineQuantities::OpenVial { open_vial_qty, .. } => *open_vial_qty = qty,
            LineQuantities::Sealed { .. } => return Err(wrong_mode(Field::OpenVialQty, line)),
        },
        LineEdit::CloseVialQty(qty) => match &mut next.quantities {
            LineQuantities::OpenVial { close_vial_qty, .. } => *close_vial_qty = qty,
            LineQuantities::Sealed { .. } => return Err(wrong_mode(Field::CloseVialQty, line)),
        },
        LineEdit::BrokenQty(qty) => {
            if line.is_open_vial() {
                return Err(wrong_mode(Field::BrokenQty, line));
            }
            next.discard.broken_qty = qty;
        }
        LineEdit::BrokenOpenVial(qty) => {
            if !line.is_open_vial() {
                return Err(wrong_mode(Field::BrokenOpenVial, line));
            }
            next.discard.broken_open_vial = qty;
        }
        LineEdit::BrokenCloseVial(qty) => {
            if !line.is_open_vial() {
                return Err(wrong_mode(Field::BrokenCloseVial, line));
            }
            next.discard.broken_close_vial = qty;
        }
        LineEdit::AnyDiscard(flag) => next.discard.is_any_discard = flag,
        LineEdit::OpenVial(open) => toggle_vial_mode(&mut next, open)?,
        LineEdit::Reason(reason) => {
            if !reason.as_ref().map_or(false, |r| r.is_other) {
                next.other_reason_text = None;
            }
            next.transaction_reason = reason;
        }
        LineEdit::OtherReasonText(text) => next.other_reason_text = text,
    }

    Ok(next)
}

/// Converts the quantity variant in place on the copy. Closed containers are
/// the sealed quantity's counterpart; the open-vial part folds into it when
/// returning to sealed entry.
fn toggle_vial_mode(line: &mut TransactionLine, open: bool) -> Result<(), ServiceError> {
    if line.is_open_vial() == open {
        return Ok(());
    }

    let discard = &mut line.discard;
    line.quantities = match line.quantities {
        LineQuantities::Sealed { change_qty } => {
            discard.broken_close_vial = discard.broken_qty.take();
            discard.broken_open_vial = None;
            LineQuantities::OpenVial {
                open_vial_qty: None,
                close_vial_qty: change_qty,
            }
        }
        LineQuantities::OpenVial {
            open_vial_qty,
            close_vial_qty,
        } => {
            let change_qty = sum_filled(Field::ChangeQty, open_vial_qty, close_vial_qty)?;
            discard.broken_qty = sum_filled(
                Field::BrokenQty,
                discard.broken_open_vial.take(),
                discard.broken_close_vial.take(),
            )?;
            LineQuantities::Sealed { change_qty }
        }
    };

    debug!(stock_id = line.stock_id, open_vial = open, "Toggled vial mode");
    Ok(())
}

/// Applies an edit and revalidates what it can affect.
pub fn apply_and_revalidate(
    line: &TransactionLine,
    edit: LineEdit,
) -> Result<(TransactionLine, ValidationReport), ServiceError> {
    let field = edit.field();
    let next = apply_edit(line, edit)?;
    let report = match field {
        Some(field) => validation::revalidate(&next, field),
        None => validation::validate_line(&next),
    };
    Ok((next, report))
}
