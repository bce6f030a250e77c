//! Derived quantities of a transaction line.
//!
//! Missing quantities count as zero here; whether a field was filled at all is
//! a validation concern and is answered from the line itself.

use rust_decimal::Decimal;

use crate::config::{EngineConfig, ReturnCountPolicy};
use crate::models::{LineQuantities, TransactionLine};

fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// Combined quantity moved by the line: the change quantity for sealed lines,
/// open plus closed vials for open-vial lines. Saturates at the bounds of
/// `Decimal`; validation reports the field whose sum does not fit.
pub fn effective_qty(line: &TransactionLine) -> Decimal {
    match line.quantities {
        LineQuantities::Sealed { change_qty } => or_zero(change_qty),
        LineQuantities::OpenVial {
            open_vial_qty,
            close_vial_qty,
        } => or_zero(open_vial_qty).saturating_add(or_zero(close_vial_qty)),
    }
}

/// Combined broken quantity, using the same vial split as [`effective_qty`].
pub fn effective_discard_qty(line: &TransactionLine) -> Decimal {
    let discard = &line.discard;
    if line.is_open_vial() {
        or_zero(discard.broken_open_vial).saturating_add(or_zero(discard.broken_close_vial))
    } else {
        or_zero(discard.broken_qty)
    }
}

/// Net returned, non-discarded quantity under the default reporting policy.
pub fn number_of_return(line: &TransactionLine) -> Decimal {
    number_of_return_with(line, ReturnCountPolicy::default())
}

/// Net returned, non-discarded quantity under the configured policy.
pub fn number_of_return_for(line: &TransactionLine, config: &EngineConfig) -> Decimal {
    number_of_return_with(line, config.return_count_policy)
}

/// Net returned, non-discarded quantity.
///
/// Under [`ReturnCountPolicy::DiscardOnly`] the figure is zero unless a
/// discard amount exists.
pub fn number_of_return_with(line: &TransactionLine, policy: ReturnCountPolicy) -> Decimal {
    let discarded = effective_discard_qty(line);
    match policy {
        ReturnCountPolicy::DiscardOnly if discarded.is_zero() => Decimal::ZERO,
        _ => effective_qty(line).saturating_sub(discarded),
    }
}
