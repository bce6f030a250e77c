use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

use super::field::Field;
use crate::errors::ServiceError;

/// Stable tag of a failed rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationKind {
    /// A field that is required in the current state is empty.
    Required,
    /// A quantity is zero or negative where a positive one is needed.
    ZeroQuantity,
    /// A quantity is not a whole number of containers.
    #[serde(rename = "multiple_of")]
    #[strum(serialize = "multiple_of")]
    NotMultipleOfUnit,
    /// A quantity exceeds its bound.
    MaxExceeded,
    /// A quantity must match another one exactly.
    MustEqual,
}

impl ViolationKind {
    pub fn code(self) -> &'static str {
        self.into()
    }
}

/// The single violation reported for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub kind: ViolationKind,
    pub message_key: String,
    /// The bound, unit or expected value the field was checked against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Decimal>,
}

impl FieldViolation {
    pub fn new(field: Field, kind: ViolationKind, limit: Option<Decimal>) -> Self {
        Self {
            kind,
            message_key: format!("validation.{}.{}", field.path(), kind.code()),
            limit,
        }
    }
}

/// Per-field outcome of validating one record. Fields absent from the report
/// passed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    violations: BTreeMap<Field, FieldViolation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, field: Field, violation: FieldViolation) {
        self.violations.insert(field, violation);
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&FieldViolation> {
        self.violations.get(&field)
    }

    pub fn kind_of(&self, field: Field) -> Option<ViolationKind> {
        self.get(field).map(|v| v.kind)
    }

    /// Looks a violation up by form path.
    pub fn get_path(&self, path: &str) -> Option<&FieldViolation> {
        Field::from_path(path).and_then(|field| self.get(field))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.violations.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldViolation)> + '_ {
        self.violations.iter().map(|(field, v)| (*field, v))
    }

    /// Field path to message key, the shape the form renders.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.violations
            .iter()
            .map(|(field, v)| (field.path(), v.message_key.clone()))
            .collect()
    }

    /// Keeps only the given fields, used when revalidating after an edit.
    pub(crate) fn retain(&mut self, keep: &[Field]) {
        self.violations.retain(|field, _| keep.contains(field));
    }

    /// Converts into `validator`'s error map, code = kind tag.
    pub fn to_validation_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (field, violation) in &self.violations {
            let mut err = ValidationError::new(violation.kind.code());
            err.message = Some(violation.message_key.clone().into());
            if let Some(limit) = violation.limit.and_then(|l| l.to_f64()) {
                err.add_param("limit".into(), &limit);
            }
            errors.add(field.path(), err);
        }
        errors
    }

    /// `Ok` when every field passed, for callers that block submission.
    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.to_validation_errors().into())
        }
    }
}
