//! Collateral required to reach a target position at a requested leverage.
//!
//! Margin for the position is its value at mark price divided by leverage.
//! Opening or changing the position at a worse-than-mark price costs the
//! difference up front, and the traded notional pays treasury and pool fees.
//! All amounts are in collateral currency; the result is never negative.

use crate::config::{GasFeeConfig, TxKind};
use crate::error::SizingError;
use crate::slippage::slippage_bounded_price;
use crate::state::{AmmState, PerpParameters, TraderState};
use crate::types::{Leverage, Quote, Side, SignedSize};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarginOptions {
    /// Tolerance against mid price the trader accepts for the traded amount.
    pub slippage_pct: Decimal,
    /// Subtract the margin already in the account (clamped at zero).
    pub account_for_existing_margin: bool,
    /// Price only the change from the current position instead of the whole target.
    pub account_for_existing_position: bool,
}

/// Breakdown of a requirement, mostly useful for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginBreakdown {
    pub position_margin: Quote,
    pub entry_cost: Quote,
    pub fees: Quote,
    pub existing_margin: Quote,
    pub required: Quote,
}

pub fn margin_breakdown(
    leverage: Leverage,
    target_position: SignedSize,
    perp: &PerpParameters,
    amm: &AmmState,
    trader: &TraderState,
    options: &MarginOptions,
) -> Result<MarginBreakdown, SizingError> {
    let mark = amm.mark_price()?;

    let current = if options.account_for_existing_position {
        trader.position_bc
    } else {
        SignedSize::zero()
    };
    let trade = target_position.sub(current);

    let trade_price = match trade.side() {
        Some(direction) => slippage_bounded_price(amm.mid_price()?, options.slippage_pct, direction)?,
        None => amm.mid_price()?,
    };

    let position_value = amm.quote_to_collateral(target_position.abs() * mark.value());
    let position_margin = Quote::new(position_value / leverage.value());

    let entry_cost = Quote::new(
        amm.quote_to_collateral(trade.value() * (trade_price.value() - mark.value())),
    );

    let fees = Quote::new(amm.quote_to_collateral(
        trade.abs() * perp.total_fee_rate() * amm.index_s2.value(),
    ));

    let existing_margin = if options.account_for_existing_margin {
        trader.margin_balance_cc.non_negative()
    } else {
        Quote::zero()
    };

    let required = position_margin
        .add(entry_cost)
        .add(fees)
        .sub(existing_margin)
        .non_negative();

    tracing::debug!(
        %leverage,
        %target_position,
        %trade,
        %position_margin,
        %entry_cost,
        %fees,
        %existing_margin,
        %required,
        "required margin collateral"
    );

    Ok(MarginBreakdown {
        position_margin,
        entry_cost,
        fees,
        existing_margin,
        required,
    })
}

pub fn required_margin_collateral(
    leverage: Leverage,
    target_position: SignedSize,
    perp: &PerpParameters,
    amm: &AmmState,
    trader: &TraderState,
    options: &MarginOptions,
) -> Result<Quote, SizingError> {
    margin_breakdown(leverage, target_position, perp, amm, trader, options).map(|b| b.required)
}

/// Relayed transactions pay gas out of the margin account, so the estimated
/// relay fee is added on top of the requirement.
pub fn with_gas_fee_buffer(
    required_collateral: Quote,
    uses_meta_transactions: bool,
    gas: &GasFeeConfig,
) -> Quote {
    if !uses_meta_transactions {
        return required_collateral;
    }
    required_collateral.add(gas.fee_allowance(TxKind::PerpetualTrade))
}

/// Amount to deposit before the trade; zero when cash already covers it.
pub fn deposit_shortfall(required: Quote, available: Quote) -> Quote {
    required.sub(available).non_negative()
}

pub fn check_collateral(required: Quote, available: Quote) -> Result<(), SizingError> {
    if required > available {
        return Err(SizingError::InsufficientCollateral {
            required,
            available,
        });
    }
    Ok(())
}

/// Caps the requested leverage by the perpetual's initial margin rate.
pub fn validate_leverage(leverage: Leverage, perp: &PerpParameters) -> Result<Leverage, SizingError> {
    if let Some(max) = perp.max_leverage() {
        if leverage > max {
            return Err(SizingError::InvalidLeverage {
                requested: leverage.value(),
                min: Decimal::ZERO,
                max: max.value(),
            });
        }
    }
    Ok(leverage)
}

/// Direction of the trade that moves `current` to `target`.
pub fn trade_direction(current: SignedSize, target: SignedSize) -> Option<Side> {
    target.sub(current).side()
}
