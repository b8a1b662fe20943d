//! Decimal helpers shared by the pricing functions

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PricingError;

const SQRT_EPSILON: Decimal = dec!(0.0000000000000001);
const SQRT_MAX_ITERATIONS: usize = 100;

/// Square root of a Decimal using Newton's method
///
/// The `f64` root only seeds the iteration; every step and the result stay in Decimal.
pub fn decimal_sqrt(value: Decimal) -> Result<Decimal, PricingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::InvalidAmount { amount: value });
    }
    if value.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let mut x = value
        .to_f64()
        .and_then(|f| Decimal::from_f64(f.sqrt()))
        .filter(|seed| *seed > Decimal::ZERO)
        .unwrap_or(value);

    // Newton's method: x_new = (x + value/x) / 2
    for _ in 0..SQRT_MAX_ITERATIONS {
        let quotient = value
            .checked_div(x)
            .ok_or(PricingError::Overflow { operation: "sqrt" })?;
        let next_x = (x + quotient) / dec!(2);

        if (next_x - x).abs() < SQRT_EPSILON {
            return Ok(next_x);
        }
        x = next_x;
    }

    // Return best approximation if not fully converged
    Ok(x)
}

pub(crate) fn mul(a: Decimal, b: Decimal, operation: &'static str) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or(PricingError::Overflow { operation })
}

pub(crate) fn div(a: Decimal, b: Decimal, operation: &'static str) -> Result<Decimal, PricingError> {
    a.checked_div(b).ok_or(PricingError::Overflow { operation })
}

pub(crate) fn add(a: Decimal, b: Decimal, operation: &'static str) -> Result<Decimal, PricingError> {
    a.checked_add(b).ok_or(PricingError::Overflow { operation })
}
