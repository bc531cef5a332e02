//! Signed 64.64 fixed-point codec.
//!
//! The perpetual contracts represent every real number as an `int128` holding
//! `value * 2^64`. Conversions round toward zero: the fractional part is first
//! truncated to 18 decimal digits, then scaled by 2^64 and truncated again.
//! The sign is applied after scaling so positive and negative values of the
//! same magnitude encode to exact negations of each other.

use crate::error::SizingError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

const FRACTION_BITS: u32 = 64;
const FRACTION_MASK: u128 = (1u128 << FRACTION_BITS) - 1;
const DECIMAL_DIGITS: u32 = 18;
const DECIMAL_SCALE: u128 = 1_000_000_000_000_000_000;
// integer part has 63 bits of magnitude
const MAX_INTEGER_PART: u64 = (1u64 << 63) - 1;
// largest mantissa a Decimal holds (2^96 - 1)
const MAX_DECIMAL_MANTISSA: u128 = (1u128 << 96) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Fixed64x64(i128);

impl Fixed64x64 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1i128 << FRACTION_BITS);

    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i128 {
        self.0
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, SizingError> {
        if value.is_zero() {
            return Ok(Self::ZERO);
        }
        let overflow = || SizingError::EncodingOverflow(value.to_string());
        let abs = value.abs();

        let integer = abs
            .trunc()
            .to_u64()
            .filter(|i| *i <= MAX_INTEGER_PART)
            .ok_or_else(overflow)?;

        let mut fraction = abs
            .fract()
            .round_dp_with_strategy(DECIMAL_DIGITS, RoundingStrategy::ToZero);
        fraction.rescale(DECIMAL_DIGITS);
        let fraction_digits = fraction.mantissa() as u128;

        let scaled = ((integer as u128) << FRACTION_BITS)
            .checked_add((fraction_digits << FRACTION_BITS) / DECIMAL_SCALE)
            .filter(|v| *v <= i128::MAX as u128)
            .ok_or_else(overflow)?;

        let raw = scaled as i128;
        Ok(Self(if value.is_sign_negative() { -raw } else { raw }))
    }

    /// UI values arrive as floats; they pass through Decimal so rounding is the same
    /// as for any other input.
    pub fn from_f64(value: f64) -> Result<Self, SizingError> {
        if !value.is_finite() {
            return Err(SizingError::EncodingOverflow(value.to_string()));
        }
        let decimal =
            Decimal::from_f64(value).ok_or_else(|| SizingError::EncodingOverflow(value.to_string()))?;
        Self::from_decimal(decimal)
    }

    /// Truncates toward zero, so the result never exceeds the encoded magnitude.
    /// Large integer parts leave fewer of the 18 fractional digits room in a Decimal;
    /// the lowest ones are dropped.
    pub fn to_decimal(&self) -> Decimal {
        let magnitude = self.0.unsigned_abs();
        let integer = magnitude >> FRACTION_BITS;
        let fraction = magnitude & FRACTION_MASK;
        let fraction_digits = (fraction * DECIMAL_SCALE) >> FRACTION_BITS;

        let mut scale = DECIMAL_DIGITS;
        let mut mantissa = integer * DECIMAL_SCALE + fraction_digits;
        while mantissa > MAX_DECIMAL_MANTISSA {
            scale -= 1;
            mantissa = integer * 10u128.pow(scale) + fraction_digits / 10u128.pow(DECIMAL_DIGITS - scale);
        }

        let value = Decimal::from_i128_with_scale(mantissa as i128, scale);
        if self.0 < 0 {
            -value
        } else {
            value
        }
    }

    pub fn to_f64(&self) -> f64 {
        let magnitude = self.0.unsigned_abs();
        let integer = (magnitude >> FRACTION_BITS) as f64;
        let fraction = (magnitude & FRACTION_MASK) as f64 / (1u128 << FRACTION_BITS) as f64;
        let value = integer + fraction;
        if self.0 < 0 {
            -value
        } else {
            value
        }
    }
}

impl fmt::Display for Fixed64x64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal().normalize())
    }
}

impl TryFrom<Decimal> for Fixed64x64 {
    type Error = SizingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TWO_POW_64: i128 = 1i128 << 64;

    #[test]
    fn integers_scale_by_two_pow_64() {
        assert_eq!(Fixed64x64::from_decimal(dec!(1)).unwrap(), Fixed64x64::ONE);
        assert_eq!(Fixed64x64::from_decimal(dec!(3)).unwrap().raw(), 3 * TWO_POW_64);
        assert_eq!(
            Fixed64x64::from_decimal(dec!(-20000)).unwrap().raw(),
            -20000 * TWO_POW_64
        );
        assert_eq!(Fixed64x64::from_decimal(Decimal::ZERO).unwrap(), Fixed64x64::ZERO);
    }

    #[test]
    fn halves_and_quarters_are_exact() {
        assert_eq!(Fixed64x64::from_decimal(dec!(0.5)).unwrap().raw(), TWO_POW_64 / 2);
        assert_eq!(
            Fixed64x64::from_decimal(dec!(-1.25)).unwrap().raw(),
            -(TWO_POW_64 + TWO_POW_64 / 4)
        );
        assert_eq!(Fixed64x64::from_raw(TWO_POW_64 / 4).to_decimal(), dec!(0.25));
    }

    #[test]
    fn rounds_toward_zero() {
        // 0.1 * 2^64 = 1844674407370955161.6 → truncated
        let pos = Fixed64x64::from_decimal(dec!(0.1)).unwrap();
        assert_eq!(pos.raw(), 1_844_674_407_370_955_161);
        let neg = Fixed64x64::from_decimal(dec!(-0.1)).unwrap();
        assert_eq!(neg.raw(), -1_844_674_407_370_955_161);
    }

    #[test]
    fn digits_beyond_18_are_dropped() {
        let a = Fixed64x64::from_decimal(dec!(0.1234567890123456789)).unwrap();
        let b = Fixed64x64::from_decimal(dec!(0.123456789012345678)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn overflow_is_rejected() {
        let too_big = Decimal::from(1u64 << 63);
        assert!(matches!(
            Fixed64x64::from_decimal(too_big),
            Err(SizingError::EncodingOverflow(_))
        ));
        assert!(Fixed64x64::from_decimal(-too_big).is_err());

        let largest = Decimal::from(MAX_INTEGER_PART);
        assert!(Fixed64x64::from_decimal(largest).is_ok());
    }

    #[test]
    fn non_finite_floats_rejected() {
        assert!(Fixed64x64::from_f64(f64::NAN).is_err());
        assert!(Fixed64x64::from_f64(f64::INFINITY).is_err());
        assert!(Fixed64x64::from_f64(1e30).is_err());
    }

    #[test]
    fn float_path_matches_decimal_path() {
        let from_float = Fixed64x64::from_f64(20100.5).unwrap();
        let from_decimal = Fixed64x64::from_decimal(dec!(20100.5)).unwrap();
        assert_eq!(from_float, from_decimal);
        assert_eq!(from_float.to_f64(), 20100.5);
    }

    #[test]
    fn decode_truncates_at_the_top_of_the_range() {
        let largest = Fixed64x64::from_raw(i128::MAX).to_decimal();
        assert_eq!(largest, dec!(9223372036854775807.999999999));
        assert!(largest < Decimal::from(1u64 << 63));
        assert!(Fixed64x64::from_decimal(largest).is_ok());

        let smallest = Fixed64x64::from_raw(-i128::MAX).to_decimal();
        assert_eq!(smallest, -largest);
    }

    #[test]
    fn decode_recovers_value() {
        let x = dec!(-12345.678901);
        let decoded = Fixed64x64::from_decimal(x).unwrap().to_decimal();
        assert!((decoded - x).abs() <= dec!(0.000000000000000001));
    }
}
