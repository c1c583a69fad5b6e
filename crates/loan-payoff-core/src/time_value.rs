use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::PayoffError;
use crate::types::{Money, Rate};
use crate::PayoffResult;

/// Level payment that retires `principal` over `nper` periods at `rate` per period.
///
/// Standard annuity formula `P * r(1+r)^n / ((1+r)^n - 1)`, evaluated as
/// `P * r / (1 - (1+r)^-n)` so the numerator never overflows. When the
/// compounding factor itself is too large to represent, the payment has
/// already converged to the perpetuity limit `P * r`.
pub fn level_payment(rate: Rate, nper: u32, principal: Money) -> PayoffResult<Money> {
    if nper == 0 {
        return Err(PayoffError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let one_plus_r = Decimal::ONE + rate;
    let factor = match one_plus_r.checked_powu(u64::from(nper)) {
        Some(f) => f,
        None => return Ok(principal * rate),
    };

    let annuity_factor = factor - Decimal::ONE;
    if annuity_factor.is_zero() {
        return Err(PayoffError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    Ok(principal * rate / (Decimal::ONE - Decimal::ONE / factor))
}
