//! Order flag bitmask.
//!
//! The perpetual manager reads a `uint32` of independent order properties.
//! The bit positions below are part of the contract interface and must not move.

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use std::fmt;

bitflags! {
    #[derive(Default)]
    pub struct OrderFlags: u32 {
        /// Order may only reduce an existing position.
        const CLOSE_ONLY = 0x8000_0000;
        /// Execute immediately against the AMM.
        const MARKET_ORDER = 0x4000_0000;
        /// Execute once the mark price crosses the trigger against the position.
        const STOP_LOSS = 0x2000_0000;
        /// Execute once the mark price crosses the trigger in favour of the position.
        const TAKE_PROFIT = 0x1000_0000;
        /// Size margin so the resulting position has the order's leverage.
        const USE_TARGET_LEVERAGE = 0x0800_0000;
        /// Resting limit order held by the order book contract.
        const LIMIT_ORDER = 0x0400_0000;
    }
}

impl OrderFlags {
    pub fn builder() -> OrderFlagsBuilder {
        OrderFlagsBuilder::default()
    }
}

// the wire value, not a field map
impl Serialize for OrderFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl fmt::Display for OrderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.bits())
    }
}

/// Named boolean properties, combined into the wire bitmask by `build`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFlagsBuilder {
    pub close_only: bool,
    pub market_order: bool,
    pub stop_loss: bool,
    pub take_profit: bool,
    pub use_target_leverage: bool,
    pub limit_order: bool,
}

impl OrderFlagsBuilder {
    pub fn close_only(mut self, on: bool) -> Self {
        self.close_only = on;
        self
    }

    pub fn market_order(mut self, on: bool) -> Self {
        self.market_order = on;
        self
    }

    pub fn stop_loss(mut self, on: bool) -> Self {
        self.stop_loss = on;
        self
    }

    pub fn take_profit(mut self, on: bool) -> Self {
        self.take_profit = on;
        self
    }

    pub fn use_target_leverage(mut self, on: bool) -> Self {
        self.use_target_leverage = on;
        self
    }

    pub fn limit_order(mut self, on: bool) -> Self {
        self.limit_order = on;
        self
    }

    pub fn build(self) -> OrderFlags {
        [
            (self.close_only, OrderFlags::CLOSE_ONLY),
            (self.market_order, OrderFlags::MARKET_ORDER),
            (self.stop_loss, OrderFlags::STOP_LOSS),
            (self.take_profit, OrderFlags::TAKE_PROFIT),
            (self.use_target_leverage, OrderFlags::USE_TARGET_LEVERAGE),
            (self.limit_order, OrderFlags::LIMIT_ORDER),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(OrderFlags::empty(), |acc, (_, flag)| acc | flag)
    }
}

impl From<OrderFlags> for OrderFlagsBuilder {
    fn from(flags: OrderFlags) -> Self {
        Self {
            close_only: flags.contains(OrderFlags::CLOSE_ONLY),
            market_order: flags.contains(OrderFlags::MARKET_ORDER),
            stop_loss: flags.contains(OrderFlags::STOP_LOSS),
            take_profit: flags.contains(OrderFlags::TAKE_PROFIT),
            use_target_leverage: flags.contains(OrderFlags::USE_TARGET_LEVERAGE),
            limit_order: flags.contains(OrderFlags::LIMIT_ORDER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_positions_match_contract() {
        assert_eq!(OrderFlags::CLOSE_ONLY.bits(), 0x8000_0000);
        assert_eq!(OrderFlags::MARKET_ORDER.bits(), 0x4000_0000);
        assert_eq!(OrderFlags::STOP_LOSS.bits(), 0x2000_0000);
        assert_eq!(OrderFlags::TAKE_PROFIT.bits(), 0x1000_0000);
        assert_eq!(OrderFlags::USE_TARGET_LEVERAGE.bits(), 0x0800_0000);
        assert_eq!(OrderFlags::LIMIT_ORDER.bits(), 0x0400_0000);
    }

    #[test]
    fn flags_combine_additively() {
        let flags = OrderFlags::MARKET_ORDER | OrderFlags::CLOSE_ONLY;
        assert_eq!(flags.bits(), 0xC000_0000);
        assert!(flags.contains(OrderFlags::CLOSE_ONLY));
        assert!(flags.contains(OrderFlags::MARKET_ORDER));
        assert!(!flags.contains(OrderFlags::LIMIT_ORDER));

        let mut acc = OrderFlags::empty();
        acc |= OrderFlags::STOP_LOSS;
        acc |= OrderFlags::STOP_LOSS;
        assert_eq!(acc, OrderFlags::STOP_LOSS);
    }

    #[test]
    fn builder_matches_masks() {
        let flags = OrderFlags::builder()
            .limit_order(true)
            .take_profit(true)
            .close_only(true)
            .build();
        assert_eq!(
            flags,
            OrderFlags::LIMIT_ORDER | OrderFlags::TAKE_PROFIT | OrderFlags::CLOSE_ONLY
        );
        assert!(OrderFlags::builder().build().is_empty());
        assert_eq!(OrderFlagsBuilder::from(flags).build(), flags);
    }

    #[test]
    fn unknown_bits_rejected() {
        assert_eq!(OrderFlags::from_bits(0x4000_0000), Some(OrderFlags::MARKET_ORDER));
        assert!(OrderFlags::from_bits(0x0000_0001).is_none());
        assert_eq!(OrderFlags::from_bits(0), Some(OrderFlags::empty()));
        assert_eq!(OrderFlags::default(), OrderFlags::empty());
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(OrderFlags::MARKET_ORDER.to_string(), "0x40000000");
    }

    #[test]
    fn serializes_as_wire_integer() {
        let flags = OrderFlags::STOP_LOSS | OrderFlags::CLOSE_ONLY;
        assert_eq!(serde_json::to_string(&flags).unwrap(), "2684354560");
    }
}
