use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept for the USD-equivalent intermediate.
pub const INTERMEDIATE_SCALE: u32 = 6;

/// Fractional digits of a conversion result.
pub const RESULT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("source rate is zero")]
    ZeroRate,

    #[error("conversion overflowed")]
    Overflow,
}

/// Converts `amount` from a currency quoted at `from_rate` to one quoted at
/// `to_rate`, both rates expressed against the same base (USD).
///
/// The amount is first divided by `from_rate` and rounded half-up to
/// [`INTERMEDIATE_SCALE`] digits, then multiplied by `to_rate` and rounded
/// half-up to [`RESULT_SCALE`] digits. Rounding only once at the end gives
/// different last digits for some inputs, so both steps are kept.
pub fn convert(
    amount: Decimal,
    from_rate: Decimal,
    to_rate: Decimal,
) -> Result<Decimal, ConversionError> {
    if from_rate.is_zero() {
        return Err(ConversionError::ZeroRate);
    }

    let usd = amount
        .checked_div(from_rate)
        .ok_or(ConversionError::Overflow)?
        .round_dp_with_strategy(INTERMEDIATE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    let mut converted = usd
        .checked_mul(to_rate)
        .ok_or(ConversionError::Overflow)?
        .round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    converted.rescale(RESULT_SCALE);

    Ok(converted)
}
