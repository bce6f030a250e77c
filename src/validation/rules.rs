//! Declarative rule tables.
//!
//! Every field of a record variant has one [`FieldRule`]: a gate deciding
//! whether the field is validated at all, and a list of checks in priority
//! order. The first failing check is the field's violation.

use rust_decimal::Decimal;

use super::field::Field;
use super::report::{FieldViolation, ViolationKind};

/// A record the rule tables can be evaluated against.
pub trait RuleSubject {
    /// Quantity held by a field, `None` when it was left empty.
    fn quantity(&self, field: Field) -> Option<Decimal>;

    /// Whether the field was filled in.
    fn is_filled(&self, field: Field) -> bool {
        self.quantity(field).is_some()
    }

    fn piece_units(&self) -> Option<Decimal> {
        None
    }

    fn max_return(&self) -> Option<Decimal> {
        None
    }

    fn is_discarding(&self) -> bool {
        false
    }

    /// Combined quantity the record moves.
    fn effective_qty(&self) -> Decimal {
        Decimal::ZERO
    }

    fn reason_is_other(&self) -> bool {
        false
    }

    /// Rule table for the record's current variant.
    fn rules(&self) -> &'static [FieldRule];
}

/// Value a check compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Another field, empty counting as zero.
    Field(Field),
    PieceUnits,
    MaxReturn,
    /// `max_return` minus a field.
    MaxReturnLess(Field),
}

impl Operand {
    fn resolve<S: RuleSubject + ?Sized>(&self, subject: &S) -> Option<Decimal> {
        match *self {
            Operand::Field(field) => Some(subject.quantity(field).unwrap_or(Decimal::ZERO)),
            Operand::PieceUnits => subject.piece_units(),
            Operand::MaxReturn => subject.max_return(),
            Operand::MaxReturnLess(field) => subject
                .max_return()
                .map(|max| max.saturating_sub(subject.quantity(field).unwrap_or(Decimal::ZERO))),
        }
    }

    fn references(&self, field: Field) -> bool {
        match *self {
            Operand::Field(f) | Operand::MaxReturnLess(f) => f == field,
            Operand::PieceUnits | Operand::MaxReturn => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// The discard flag is set.
    Discarding,
    /// The record moves a positive combined quantity.
    Returning,
    Filled(Field),
    Positive(Field),
    /// The chosen reason is the free-text "other" reason.
    ReasonIsOther,
    Not(&'static Condition),
    All(&'static [Condition]),
    Any(&'static [Condition]),
}

impl Condition {
    pub fn holds<S: RuleSubject + ?Sized>(&self, subject: &S) -> bool {
        match *self {
            Condition::Always => true,
            Condition::Discarding => subject.is_discarding(),
            Condition::Returning => subject.effective_qty() > Decimal::ZERO,
            Condition::Filled(field) => subject.is_filled(field),
            Condition::Positive(field) => subject
                .quantity(field)
                .map_or(false, |v| v > Decimal::ZERO),
            Condition::ReasonIsOther => subject.reason_is_other(),
            Condition::Not(inner) => !inner.holds(subject),
            Condition::All(all) => all.iter().all(|c| c.holds(subject)),
            Condition::Any(any) => any.iter().any(|c| c.holds(subject)),
        }
    }

    fn references(&self, field: Field) -> bool {
        match *self {
            Condition::Always | Condition::Discarding => false,
            Condition::Returning => matches!(
                field,
                Field::ChangeQty | Field::OpenVialQty | Field::CloseVialQty
            ),
            Condition::Filled(f) | Condition::Positive(f) => f == field,
            Condition::ReasonIsOther => field == Field::TransactionReason,
            Condition::Not(inner) => inner.references(field),
            Condition::All(list) | Condition::Any(list) => {
                list.iter().any(|c| c.references(field))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Required-if: empty while the condition holds is `required`.
    Required(Condition),
    /// Positive when required, non-negative otherwise.
    Minimum,
    /// Non-negative even when required; zero is a legitimate value.
    NonNegative,
    /// Positive values must be whole multiples of the operand.
    MultipleOf(Operand),
    AtMost(Operand),
    /// Strict upper bound.
    LessThan(Operand),
    /// Must equal the operand while the condition holds.
    EqualTo(Operand, Condition),
    /// The value plus another field, empty counting as zero, must fit in a
    /// `Decimal`.
    SumFits(Field),
}

impl Check {
    fn references(&self, field: Field) -> bool {
        match self {
            Check::Required(condition) => condition.references(field),
            Check::Minimum | Check::NonNegative => false,
            Check::MultipleOf(op) | Check::AtMost(op) | Check::LessThan(op) => op.references(field),
            Check::EqualTo(op, condition) => op.references(field) || condition.references(field),
            Check::SumFits(other) => *other == field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub applies: Condition,
    pub checks: &'static [Check],
}

impl FieldRule {
    /// Whether editing `field` can change this rule's outcome.
    pub fn depends_on(&self, field: Field) -> bool {
        self.field == field
            || self.applies.references(field)
            || self.checks.iter().any(|c| c.references(field))
    }

    /// Evaluates the rule, returning the first failing check.
    pub fn evaluate<S: RuleSubject + ?Sized>(&self, subject: &S) -> Option<FieldViolation> {
        if !self.applies.holds(subject) {
            return None;
        }

        let field = self.field;
        let value = subject.quantity(field);
        let violation = |kind, limit| Some(FieldViolation::new(field, kind, limit));
        let mut required = false;

        for check in self.checks {
            match *check {
                Check::Required(condition) => {
                    if condition.holds(subject) {
                        required = true;
                        if !subject.is_filled(field) {
                            return violation(ViolationKind::Required, None);
                        }
                    }
                }
                Check::Minimum => match value {
                    Some(v) if required && v <= Decimal::ZERO => {
                        return violation(ViolationKind::ZeroQuantity, Some(Decimal::ZERO));
                    }
                    Some(v) if v < Decimal::ZERO => {
                        return violation(ViolationKind::ZeroQuantity, Some(Decimal::ZERO));
                    }
                    _ => {}
                },
                Check::NonNegative => {
                    if value.map_or(false, |v| v < Decimal::ZERO) {
                        return violation(ViolationKind::ZeroQuantity, Some(Decimal::ZERO));
                    }
                }
                Check::MultipleOf(op) => {
                    // Empty and zero values are exempt; only positive ones are checked.
                    if let (Some(v), Some(unit)) = (value, op.resolve(subject)) {
                        if v > Decimal::ZERO && unit > Decimal::ZERO && !(v % unit).is_zero() {
                            return violation(ViolationKind::NotMultipleOfUnit, Some(unit));
                        }
                    }
                }
                Check::AtMost(op) => {
                    if let (Some(v), Some(bound)) = (value, op.resolve(subject)) {
                        if v > bound {
                            return violation(ViolationKind::MaxExceeded, Some(bound));
                        }
                    }
                }
                Check::LessThan(op) => {
                    if let (Some(v), Some(bound)) = (value, op.resolve(subject)) {
                        if v >= bound {
                            return violation(ViolationKind::MaxExceeded, Some(bound));
                        }
                    }
                }
                Check::EqualTo(op, condition) => {
                    if condition.holds(subject) {
                        if let Some(expected) = op.resolve(subject) {
                            if value.unwrap_or(Decimal::ZERO) != expected {
                                return violation(ViolationKind::MustEqual, Some(expected));
                            }
                        }
                    }
                }
                Check::SumFits(other) => {
                    let other = subject.quantity(other).unwrap_or(Decimal::ZERO);
                    if let Some(v) = value {
                        if v.checked_add(other).is_none() {
                            let limit = if other.is_sign_negative() {
                                Decimal::MIN.checked_sub(other)
                            } else {
                                Decimal::MAX.checked_sub(other)
                            };
                            return violation(ViolationKind::MaxExceeded, limit);
                        }
                    }
                }
            }
        }

        None
    }
}

const REASON_RULES: [FieldRule; 2] = [
    FieldRule {
        field: Field::TransactionReason,
        applies: Condition::Always,
        checks: &[Check::Required(Condition::All(&[
            Condition::Discarding,
            Condition::Returning,
        ]))],
    },
    FieldRule {
        field: Field::OtherReasonText,
        applies: Condition::Always,
        checks: &[Check::Required(Condition::ReasonIsOther)],
    },
];

pub static SEALED_LINE_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::ChangeQty,
        applies: Condition::Always,
        checks: &[
            Check::Required(Condition::Always),
            Check::Minimum,
            Check::MultipleOf(Operand::PieceUnits),
            Check::AtMost(Operand::MaxReturn),
        ],
    },
    FieldRule {
        field: Field::BrokenQty,
        applies: Condition::Discarding,
        checks: &[
            Check::Required(Condition::Always),
            Check::Minimum,
            Check::MultipleOf(Operand::PieceUnits),
            Check::AtMost(Operand::Field(Field::ChangeQty)),
        ],
    },
    REASON_RULES[0],
    REASON_RULES[1],
];

pub static OPEN_VIAL_LINE_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::OpenVialQty,
        applies: Condition::Always,
        checks: &[
            Check::Required(Condition::Positive(Field::CloseVialQty)),
            Check::Minimum,
            // A full container is not an open vial.
            Check::LessThan(Operand::PieceUnits),
            Check::AtMost(Operand::MaxReturn),
        ],
    },
    FieldRule {
        field: Field::CloseVialQty,
        applies: Condition::Always,
        checks: &[
            Check::Required(Condition::Not(&Condition::Filled(Field::OpenVialQty))),
            Check::Minimum,
            Check::SumFits(Field::OpenVialQty),
            Check::MultipleOf(Operand::PieceUnits),
            Check::AtMost(Operand::MaxReturnLess(Field::OpenVialQty)),
        ],
    },
    FieldRule {
        field: Field::BrokenOpenVial,
        applies: Condition::Discarding,
        checks: &[
            Check::Required(Condition::Positive(Field::OpenVialQty)),
            Check::Minimum,
            Check::AtMost(Operand::Field(Field::OpenVialQty)),
            // An opened vial is discarded whole or not at all.
            Check::EqualTo(
                Operand::Field(Field::OpenVialQty),
                Condition::Positive(Field::OpenVialQty),
            ),
        ],
    },
    FieldRule {
        field: Field::BrokenCloseVial,
        applies: Condition::Discarding,
        checks: &[
            Check::Required(Condition::Not(&Condition::Positive(Field::OpenVialQty))),
            Check::Minimum,
            Check::SumFits(Field::BrokenOpenVial),
            Check::MultipleOf(Operand::PieceUnits),
            Check::AtMost(Operand::Field(Field::CloseVialQty)),
        ],
    },
    REASON_RULES[0],
    REASON_RULES[1],
];

pub static STOCK_TAKING_RULES: &[FieldRule] = &[FieldRule {
    field: Field::ActualQty,
    applies: Condition::Always,
    checks: &[
        Check::Required(Condition::Any(&[
            Condition::Positive(Field::RecordedQty),
            Condition::Positive(Field::InTransitQty),
        ])),
        Check::NonNegative,
    ],
}];

/// Fields of a table whose rule depends on `field`, `field` itself included
/// when the table validates it.
pub fn dependents(rules: &[FieldRule], field: Field) -> Vec<Field> {
    rules
        .iter()
        .filter(|rule| rule.depends_on(field))
        .map(|rule| rule.field)
        .collect()
}
