//! Order records for the perpetual manager.
//!
//! `OrderParams` is what the trade form produces; `build_order` validates it and
//! encodes every real-valued field into 64.64 fixed point. The resulting `Order`
//! is immutable and goes to signing and submission as is.

use crate::error::SizingError;
use crate::fixed_point::Fixed64x64;
use crate::flags::OrderFlags;
use crate::types::{Leverage, PerpetualId, Price, SignedSize, Timestamp};
use ethers::types::Address;
use serde::Serialize;

/// Unencoded order inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParams {
    pub perpetual_id: PerpetualId,
    pub trader: Address,
    pub amount: SignedSize,
    pub limit_price: Price,
    /// Only stop-loss and take-profit orders carry a trigger.
    pub trigger_price: Option<Price>,
    pub deadline: Timestamp,
    pub referrer: Option<Address>,
    pub flags: OrderFlags,
    /// None encodes as zero: the contract keeps the current leverage.
    pub target_leverage: Option<Leverage>,
    pub created_at: Timestamp,
}

/// Encoded order, field for field what the contract's `Order` struct holds.
/// Serialize only: the one way in is `build_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    perpetual_id: PerpetualId,
    trader: Address,
    amount: Fixed64x64,
    limit_price: Fixed64x64,
    trigger_price: Fixed64x64,
    deadline: Timestamp,
    referrer: Address,
    flags: OrderFlags,
    leverage: Fixed64x64,
    created_at: Timestamp,
}

impl Order {
    pub fn perpetual_id(&self) -> PerpetualId {
        self.perpetual_id
    }

    pub fn trader(&self) -> Address {
        self.trader
    }

    pub fn amount(&self) -> Fixed64x64 {
        self.amount
    }

    pub fn limit_price(&self) -> Fixed64x64 {
        self.limit_price
    }

    pub fn trigger_price(&self) -> Fixed64x64 {
        self.trigger_price
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    /// Zero address when there is no referrer.
    pub fn referrer(&self) -> Address {
        self.referrer
    }

    pub fn flags(&self) -> OrderFlags {
        self.flags
    }

    pub fn leverage(&self) -> Fixed64x64 {
        self.leverage
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn is_close_only(&self) -> bool {
        self.flags.contains(OrderFlags::CLOSE_ONLY)
    }
}

pub fn build_order(params: &OrderParams) -> Result<Order, SizingError> {
    if params.deadline <= params.created_at {
        tracing::warn!(
            deadline = %params.deadline,
            created_at = %params.created_at,
            "rejected order deadline"
        );
        return Err(SizingError::InvalidDeadline {
            deadline: params.deadline,
            created_at: params.created_at,
        });
    }

    let amount = Fixed64x64::from_decimal(params.amount.value())?;
    let limit_price = Fixed64x64::from_decimal(params.limit_price.value())?;
    let trigger_price = match params.trigger_price {
        Some(p) => Fixed64x64::from_decimal(p.value())?,
        None => Fixed64x64::ZERO,
    };
    let leverage = match params.target_leverage {
        Some(l) => Fixed64x64::from_decimal(l.value())?,
        None => Fixed64x64::ZERO,
    };

    let order = Order {
        perpetual_id: params.perpetual_id,
        trader: params.trader,
        amount,
        limit_price,
        trigger_price,
        deadline: params.deadline,
        referrer: params.referrer.unwrap_or_else(Address::zero),
        flags: params.flags,
        leverage,
        created_at: params.created_at,
    };

    tracing::debug!(
        perpetual = %order.perpetual_id,
        amount = %params.amount,
        limit_price = %params.limit_price,
        flags = %order.flags,
        "built order"
    );
    Ok(order)
}
