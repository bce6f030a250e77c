use serde::{Deserialize, Serialize};

/// Field paths the rule set reports against. The string form is the path the
/// form state collaborator uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    ChangeQty,
    OpenVialQty,
    CloseVialQty,
    BrokenQty,
    BrokenOpenVial,
    BrokenCloseVial,
    TransactionReason,
    OtherReasonText,
    RecordedQty,
    InTransitQty,
    ActualQty,
}

impl Field {
    pub fn path(self) -> &'static str {
        self.into()
    }

    /// Whether the field holds a quantity (as opposed to a reason selection
    /// or free text).
    pub fn is_quantity(self) -> bool {
        !matches!(self, Field::TransactionReason | Field::OtherReasonText)
    }

    /// Resolves a form path, accepting the camelCase spelling used by the
    /// mobile form as well as the snake_case one.
    pub fn from_path(path: &str) -> Option<Field> {
        use std::str::FromStr;

        Field::from_str(path)
            .ok()
            .or_else(|| Field::from_str(&camel_to_snake(path)).ok())
    }
}

fn camel_to_snake(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 4);
    for ch in path.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
