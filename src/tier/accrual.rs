use super::error::AccrualError;

// absorbs binary representation error such as 10 * 1.2 = 11.999999999999998
const ROUNDING_SLACK: f64 = 1e-9;

/// Points earned for a purchase of `amount_cents`.
///
/// `rate` is the organization's points per whole currency unit and
/// `multiplier` the tier multiplier in force before the purchase. Fractional
/// points are always floored.
pub fn points_for_purchase(
    amount_cents: i64,
    rate: f64,
    multiplier: f64,
) -> Result<i64, AccrualError> {
    if amount_cents < 0 {
        return Err(AccrualError::NegativeAmount(amount_cents));
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(AccrualError::InvalidRate(rate));
    }

    let raw = (amount_cents as f64 / 100.0) * rate * multiplier;
    Ok((raw + ROUNDING_SLACK).floor() as i64)
}
