//! Reference and limit price selection.

use super::core::{MarketSnapshot, OrderEngine};
use crate::error::SizingError;
use crate::slippage::slippage_bounded_price;
use crate::types::{Price, Side};
use rust_decimal::Decimal;

impl OrderEngine<'_> {
    /// Average execution price when the depth chart has one, otherwise AMM mid.
    pub fn reference_price(&self, snapshot: &MarketSnapshot<'_>) -> Result<Price, SizingError> {
        match snapshot.average_price {
            Some(price) => Ok(price),
            None => snapshot.amm.mid_price(),
        }
    }

    pub fn slippage_or_default(&self, slippage_pct: Option<Decimal>) -> Decimal {
        slippage_pct.unwrap_or(self.config.default_slippage_pct)
    }

    /// Worst acceptable price for a market order in `direction`.
    pub fn market_limit_price(
        &self,
        snapshot: &MarketSnapshot<'_>,
        slippage_pct: Option<Decimal>,
        direction: Side,
    ) -> Result<Price, SizingError> {
        let reference = self.reference_price(snapshot)?;
        slippage_bounded_price(reference, self.slippage_or_default(slippage_pct), direction)
    }
}
