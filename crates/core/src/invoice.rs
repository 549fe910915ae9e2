//! Invoice statuses, transitions and money arithmetic.
//!
//! All amounts are integer cents. Tax rates are basis points (825 = 8.25%).

use crate::error::CoreError;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_OVERDUE: &str = "overdue";
pub const STATUS_VOID: &str = "void";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_SENT,
    STATUS_PAID,
    STATUS_OVERDUE,
    STATUS_VOID,
];

/// Upper bound for `tax_rate_bps` (100%).
pub const MAX_TAX_RATE_BPS: i32 = 10_000;

/// Returns the statuses `from_status` may transition to.
///
/// - `draft`   -> `sent`, `void`
/// - `sent`    -> `paid`, `overdue`, `void`
/// - `overdue` -> `paid`, `void`
/// - `paid`, `void` are terminal
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_DRAFT => &[STATUS_SENT, STATUS_VOID],
        STATUS_SENT => &[STATUS_PAID, STATUS_OVERDUE, STATUS_VOID],
        STATUS_OVERDUE => &[STATUS_PAID, STATUS_VOID],
        _ => &[],
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid invoice status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot transition invoice from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

pub fn validate_tax_rate(bps: i32) -> Result<(), CoreError> {
    if (0..=MAX_TAX_RATE_BPS).contains(&bps) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "tax_rate_bps must be between 0 and {MAX_TAX_RATE_BPS}"
        )))
    }
}

/// A line item as entered, before amounts are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub quantity: f64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Largest quantity on a single line.
pub const MAX_QUANTITY: f64 = 100_000.0;
/// Largest unit price on a single line ($100M).
pub const MAX_UNIT_PRICE_CENTS: i64 = 10_000_000_000;

/// Amount for one line, rounded half away from zero to the cent.
///
/// The bounds keep the product within the range `f64` represents exactly.
pub fn line_amount_cents(quantity: f64, unit_price_cents: i64) -> Result<i64, CoreError> {
    if !quantity.is_finite() || quantity <= 0.0 || quantity > MAX_QUANTITY {
        return Err(CoreError::Validation(format!(
            "Line item quantity must be a positive number no greater than {MAX_QUANTITY}"
        )));
    }
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&unit_price_cents) {
        return Err(CoreError::Validation(format!(
            "Line item unit price must be between 0 and {MAX_UNIT_PRICE_CENTS} cents"
        )));
    }
    Ok((quantity * unit_price_cents as f64).round() as i64)
}

fn too_large() -> CoreError {
    CoreError::Validation("Invoice total is too large".into())
}

/// Compute subtotal, tax and total for a set of lines.
pub fn compute_totals(lines: &[LineInput], tax_rate_bps: i32) -> Result<InvoiceTotals, CoreError> {
    validate_tax_rate(tax_rate_bps)?;
    let mut subtotal_cents = 0i64;
    for line in lines {
        let amount = line_amount_cents(line.quantity, line.unit_price_cents)?;
        subtotal_cents = subtotal_cents.checked_add(amount).ok_or_else(too_large)?;
    }
    // Both factors are non-negative, so adding half the divisor rounds half up.
    let tax = (i128::from(subtotal_cents) * i128::from(tax_rate_bps) + 5_000) / 10_000;
    let tax_cents = i64::try_from(tax).map_err(|_| too_large())?;
    Ok(InvoiceTotals {
        subtotal_cents,
        tax_cents,
        total_cents: subtotal_cents.checked_add(tax_cents).ok_or_else(too_large)?,
    })
}

/// Human-facing invoice number, e.g. `INV-2026-0007`.
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{year}-{sequence:04}")
}
