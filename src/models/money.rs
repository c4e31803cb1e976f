//! Monetary input checks shared by the request DTOs.
//!
//! All money in this service is exact-decimal with at most two fraction
//! digits; binary floating point never enters the data path.

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

pub const MAX_MONEY_SCALE: u32 = 2;

/// Validates a monetary field, appending failures to `errors`.
/// `require_positive` distinguishes payment amounts (> 0) from invoice
/// amounts (>= 0).
pub fn check_amount(
    errors: &mut ValidationErrors,
    field: &'static str,
    amount: Decimal,
    require_positive: bool,
) {
    if require_positive && amount <= Decimal::ZERO {
        let mut err = ValidationError::new("not_positive");
        err.message = Some("amount must be greater than zero".into());
        errors.add(field, err);
    } else if !require_positive && amount < Decimal::ZERO {
        let mut err = ValidationError::new("negative");
        err.message = Some("amount must not be negative".into());
        errors.add(field, err);
    }

    if amount.normalize().scale() > MAX_MONEY_SCALE {
        let mut err = ValidationError::new("scale");
        err.message = Some("amount must have at most 2 fraction digits".into());
        errors.add(field, err);
    }
}
