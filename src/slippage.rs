// 3.0: slippage bounds. turns a reference price and a tolerance into the worst price
// the trader accepts. buyers accept paying more, sellers accept receiving less.

use crate::error::SizingError;
use crate::types::{Price, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default tolerance offered by the trade form.
pub const DEFAULT_SLIPPAGE_PCT: Decimal = dec!(0.5);

const HUNDRED: Decimal = dec!(100);

/// Tolerance must lie in [0, 100). 100% would zero (or invert) a sell limit.
pub fn validate_slippage(slippage_pct: Decimal) -> Result<Decimal, SizingError> {
    if slippage_pct < Decimal::ZERO || slippage_pct >= HUNDRED {
        tracing::warn!(%slippage_pct, "rejected slippage tolerance");
        return Err(SizingError::InvalidSlippage(slippage_pct));
    }
    Ok(slippage_pct)
}

pub fn slippage_bounded_price(
    reference: Price,
    slippage_pct: Decimal,
    direction: Side,
) -> Result<Price, SizingError> {
    let slippage_pct = validate_slippage(slippage_pct)?;
    if slippage_pct.is_zero() {
        return Ok(reference);
    }

    let tolerance = slippage_pct / HUNDRED;
    let factor = Decimal::ONE + direction.sign() * tolerance;
    let limit = Price::try_new(reference.value() * factor)?;

    tracing::debug!(%reference, %slippage_pct, ?direction, %limit, "slippage bounded price");
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price(v: Decimal) -> Price {
        Price::new_unchecked(v)
    }

    #[test]
    fn buy_pays_up_to_tolerance() {
        let limit = slippage_bounded_price(price(dec!(20000)), dec!(0.5), Side::Long).unwrap();
        assert_eq!(limit.value(), dec!(20100));
    }

    #[test]
    fn sell_accepts_down_to_tolerance() {
        let limit = slippage_bounded_price(price(dec!(20000)), dec!(0.5), Side::Short).unwrap();
        assert_eq!(limit.value(), dec!(19900));
    }

    #[test]
    fn zero_slippage_is_identity() {
        let reference = price(dec!(19876.54321));
        assert_eq!(
            slippage_bounded_price(reference, Decimal::ZERO, Side::Long).unwrap(),
            reference
        );
        assert_eq!(
            slippage_bounded_price(reference, Decimal::ZERO, Side::Short).unwrap(),
            reference
        );
    }

    #[test]
    fn out_of_range_slippage_rejected() {
        let reference = price(dec!(100));
        assert_eq!(
            slippage_bounded_price(reference, dec!(-0.1), Side::Long),
            Err(SizingError::InvalidSlippage(dec!(-0.1)))
        );
        assert_eq!(
            slippage_bounded_price(reference, dec!(100), Side::Short),
            Err(SizingError::InvalidSlippage(dec!(100)))
        );
        assert!(slippage_bounded_price(reference, dec!(99.99), Side::Short).is_ok());
    }
}
