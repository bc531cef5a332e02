// 8.0.2: request and result types for engine operations.

use crate::margin::MarginBreakdown;
use crate::order::Order;
use crate::pairs::PairType;
use crate::types::{Leverage, Price, Quote, Side, SignedSize, Timestamp};
use ethers::types::Address;
use rust_decimal::Decimal;

/// What the trade form submits.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub pair: PairType,
    pub trader: Address,
    pub side: Side,
    /// Unsigned size in base currency; `side` gives the sign.
    pub amount: Decimal,
    pub leverage: Leverage,
    /// None falls back to the configured default.
    pub slippage_pct: Option<Decimal>,
    pub referrer: Option<Address>,
    pub created_at: Timestamp,
}

impl TradeRequest {
    pub fn signed_amount(&self) -> SignedSize {
        SignedSize::from_side(self.side, self.amount)
    }
}

/// Resting order variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    Limit { limit_price: Price },
    StopLoss { trigger_price: Price, limit_price: Price },
    TakeProfit { trigger_price: Price, limit_price: Price },
}

#[derive(Debug, Clone)]
pub struct TradePlan {
    pub order: Order,
    pub direction: Side,
    pub limit_price: Price,
    pub target_position: SignedSize,
    pub margin: MarginBreakdown,
    /// Margin requirement plus the relay gas allowance when applicable.
    pub required_collateral: Quote,
    /// What must be deposited before submitting; zero when cash covers it.
    pub deposit_required: Quote,
}

impl TradePlan {
    pub fn is_funded(&self) -> bool {
        self.deposit_required.value().is_zero()
    }
}
