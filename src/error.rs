// 0.1: validation errors. every failure is a rejected computation the caller can
// surface to the trader and retry with corrected inputs.

use crate::types::{Quote, Timestamp};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizingError {
    #[error("Slippage {0}% outside [0, 100)")]
    InvalidSlippage(Decimal),

    #[error("Deadline {deadline} must be after creation time {created_at}")]
    InvalidDeadline {
        deadline: Timestamp,
        created_at: Timestamp,
    },

    #[error("Leverage {requested} outside allowed range [{min}, {max}]")]
    InvalidLeverage {
        requested: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Invalid trade amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Value {0} exceeds the signed 64.64 fixed-point range")]
    EncodingOverflow(String),

    #[error("Insufficient collateral: required {required}, available {available}")]
    InsufficientCollateral { required: Quote, available: Quote },

    #[error("Unknown perpetual pair: {0}")]
    UnknownPair(String),

    #[error("Perpetual pair {0} is deprecated")]
    PairDeprecated(String),

    #[error("Invalid perpetual id: {0}")]
    InvalidPerpetualId(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No open position to close")]
    NoPosition,
}
