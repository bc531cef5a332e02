// 2.0: read-only snapshots of contract state. refreshed by whoever polls the chain,
// never mutated here. every derivation is a pure function of one snapshot.

use crate::error::SizingError;
use crate::types::{Leverage, PerpetualId, Price, Quote, SignedSize};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Static parameters of one perpetual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerpParameters {
    pub perpetual_id: PerpetualId,
    /// Initial margin rate; its inverse caps leverage.
    pub initial_margin_rate: Decimal,
    /// Fee rate paid to the treasury on traded notional.
    pub treasury_fee_rate: Decimal,
    /// Fee rate paid to the liquidity pool on traded notional.
    pub pnl_part_rate: Decimal,
    /// Minimal position size increment in base currency.
    pub lot_size_bc: Decimal,
}

impl PerpParameters {
    pub fn new(perpetual_id: PerpetualId) -> Self {
        Self {
            perpetual_id,
            initial_margin_rate: dec!(0.04),
            treasury_fee_rate: dec!(0.0004),
            pnl_part_rate: dec!(0.0002),
            lot_size_bc: dec!(0.0001),
        }
    }

    pub fn total_fee_rate(&self) -> Decimal {
        self.treasury_fee_rate + self.pnl_part_rate
    }

    /// 1 / initial margin rate.
    pub fn max_leverage(&self) -> Option<Leverage> {
        if self.initial_margin_rate <= Decimal::ZERO {
            return None;
        }
        Leverage::new(Decimal::ONE / self.initial_margin_rate)
    }
}

/// Pricing snapshot of the perpetual's AMM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmState {
    /// Index price, quote per base (S2).
    pub index_s2: Price,
    /// Collateral to quote conversion (S3). 1 when collateral is the quote currency.
    pub index_s3: Price,
    /// EMA premium of mark over index.
    pub mark_premium_rate: Decimal,
    /// Premium of the AMM mid price over index.
    pub mid_premium_rate: Decimal,
}

impl AmmState {
    pub fn new(index_s2: Price, index_s3: Price) -> Self {
        Self {
            index_s2,
            index_s3,
            mark_premium_rate: Decimal::ZERO,
            mid_premium_rate: Decimal::ZERO,
        }
    }

    pub fn mark_price(&self) -> Result<Price, SizingError> {
        Price::try_new(self.index_s2.value() * (Decimal::ONE + self.mark_premium_rate))
    }

    pub fn mid_price(&self) -> Result<Price, SizingError> {
        Price::try_new(self.index_s2.value() * (Decimal::ONE + self.mid_premium_rate))
    }

    /// Quote amount converted to collateral currency.
    pub fn quote_to_collateral(&self, amount_qc: Decimal) -> Decimal {
        amount_qc / self.index_s3.value()
    }
}

/// The trader's margin account for one perpetual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderState {
    /// Cash plus unrealized PnL, in collateral currency.
    pub margin_balance_cc: Quote,
    /// Cash available to back new exposure, in collateral currency.
    pub available_cash_cc: Quote,
    pub position_bc: SignedSize,
    /// Quote value locked in at entry.
    pub locked_in_value_qc: Decimal,
}

impl TraderState {
    pub fn empty() -> Self {
        Self {
            margin_balance_cc: Quote::zero(),
            available_cash_cc: Quote::zero(),
            position_bc: SignedSize::zero(),
            locked_in_value_qc: Decimal::ZERO,
        }
    }

    /// Average entry price, None when flat.
    pub fn entry_price(&self) -> Option<Price> {
        if self.position_bc.is_zero() {
            return None;
        }
        Price::new(self.locked_in_value_qc / self.position_bc.value())
    }
}

/// Unrealized PnL in quote currency: position value at mark minus locked-in value.
pub fn trader_pnl(trader: &TraderState, amm: &AmmState) -> Result<Decimal, SizingError> {
    let mark = amm.mark_price()?;
    Ok(trader.position_bc.value() * mark.value() - trader.locked_in_value_qc)
}

/// Unrealized PnL expressed in base currency.
pub fn trader_pnl_in_base(trader: &TraderState, amm: &AmmState) -> Result<Decimal, SizingError> {
    let mark = amm.mark_price()?;
    Ok(trader_pnl(trader, amm)? / mark.value())
}
