// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, addresses, prices, sizes, leverage, timestamps. each is a newtype so the compiler catches type mixups.

use crate::error::SizingError;
use ethers::types::{Address, H256};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

// 1.1: bytes32 perpetual identifier as registered with the perpetual manager contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerpetualId(pub H256);

impl PerpetualId {
    pub fn from_hex(s: &str) -> Result<Self, SizingError> {
        let bytes = decode_hex(s)?;
        if bytes.len() != 32 {
            return Err(SizingError::InvalidPerpetualId(s.to_string()));
        }
        Ok(Self(H256::from_slice(&bytes)))
    }

    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_fixed_bytes()
    }
}

impl fmt::Display for PerpetualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

/// Parse a 20-byte hex address, with or without the `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address, SizingError> {
    let bytes = decode_hex(s).map_err(|_| SizingError::InvalidAddress(s.to_string()))?;
    if bytes.len() != 20 {
        return Err(SizingError::InvalidAddress(s.to_string()));
    }
    Ok(Address::from_slice(&bytes))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, SizingError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|_| SizingError::InvalidPerpetualId(s.to_string()))
}

// Long = profit when price goes up. Short = profit when price goes down.
// doubles as trade direction: Long = buying (+1), Short = selling (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Long => dec!(1),
            Side::Short => dec!(-1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    /// Direction of a signed quantity. None for zero.
    pub fn from_sign(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Side::Long)
        } else if value < Decimal::ZERO {
            Some(Side::Short)
        } else {
            None
        }
    }
}

// 1.2: signed size in base currency: positive = long, negative = short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedSize(Decimal);

impl SignedSize {
    pub fn new(size: Decimal) -> Self {
        Self(size)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    // the trade form works with an unsigned amount plus a side
    pub fn from_side(side: Side, abs_size: Decimal) -> Self {
        Self(side.sign() * abs_size.abs())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs(&self) -> Decimal {
        self.0.abs()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn side(&self) -> Option<Side> {
        Side::from_sign(self.0)
    }

    pub fn add(&self, delta: SignedSize) -> Self {
        Self(self.0 + delta.0)
    }

    pub fn sub(&self, other: SignedSize) -> Self {
        Self(self.0 - other.0)
    }

    pub fn negate(&self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for SignedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: price in quote currency per unit of base. must be positive.
// snapshots arrive deserialized, so decoding goes through try_new as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn try_new(value: Decimal) -> Result<Self, SizingError> {
        Self::new(value).ok_or(SizingError::InvalidPrice(value))
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value > Decimal::ZERO);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = SizingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.4: amount in the collateral currency. margin, fees, balances, pnl all use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote(Decimal);

impl Quote {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn add(&self, other: Quote) -> Self {
        Self(self.0 + other.0)
    }

    pub fn sub(&self, other: Quote) -> Self {
        Self(self.0 - other.0)
    }

    /// Clamp negatives to zero.
    pub fn non_negative(&self) -> Self {
        Self(self.0.max(Decimal::ZERO))
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Quote {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quote {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

// 1.5: leverage multiplier. strictly positive; fractional leverage (0.1x) is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Leverage(Decimal);

impl Leverage {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn try_new(value: Decimal) -> Result<Self, SizingError> {
        Self::new(value).ok_or(SizingError::InvalidLeverage {
            requested: value,
            min: Decimal::ZERO,
            max: Decimal::MAX,
        })
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Leverage {
    type Error = SizingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl fmt::Display for Leverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

// 1.6: unix timestamp in seconds, matching the contract's uint256 time fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
