//! Trade planning: sizing, bounding and encoding orders.

use super::core::{MarketSnapshot, OrderEngine};
use super::results::{ConditionalKind, TradePlan, TradeRequest};
use crate::error::SizingError;
use crate::flags::OrderFlags;
use crate::margin::{
    deposit_shortfall, margin_breakdown, validate_leverage, with_gas_fee_buffer, MarginOptions,
};
use crate::order::{build_order, OrderParams};
use crate::pairs::{PairType, PerpetualPair};
use crate::types::{Price, Quote, Side, SignedSize, Timestamp};
use ethers::types::Address;
use rust_decimal::Decimal;

impl OrderEngine<'_> {
    /// Market order that moves the position by `request.amount` in `request.side`.
    pub fn plan_trade(
        &self,
        request: &TradeRequest,
        snapshot: &MarketSnapshot<'_>,
    ) -> Result<TradePlan, SizingError> {
        let pair = self.checked_pair(request.pair, snapshot)?;
        self.validate_request(request, pair, snapshot)?;

        let direction = request.side;
        let slippage_pct = self.slippage_or_default(request.slippage_pct);
        let limit_price = self.market_limit_price(snapshot, Some(slippage_pct), direction)?;

        self.plan(
            request,
            pair,
            snapshot,
            limit_price,
            None,
            slippage_pct,
            OrderFlags::MARKET_ORDER,
        )
    }

    /// Close-only market order for the whole open position.
    pub fn plan_close(
        &self,
        pair_type: PairType,
        trader: Address,
        slippage_pct: Option<Decimal>,
        created_at: Timestamp,
        snapshot: &MarketSnapshot<'_>,
    ) -> Result<TradePlan, SizingError> {
        let pair = self.checked_pair(pair_type, snapshot)?;
        let position = snapshot.trader.position_bc;
        let direction = position.side().ok_or(SizingError::NoPosition)?.opposite();

        let slippage_pct = self.slippage_or_default(slippage_pct);
        let limit_price = self.market_limit_price(snapshot, Some(slippage_pct), direction)?;
        let amount = position.negate();

        // closing only needs to cover entry cost and fees out of what is already posted
        let leverage = pair
            .leverage
            .default_leverage()
            .ok_or(SizingError::InvalidLeverage {
                requested: pair.leverage.default,
                min: pair.leverage.min,
                max: pair.leverage.max,
            })?;
        let margin = margin_breakdown(
            leverage,
            SignedSize::zero(),
            snapshot.perp,
            snapshot.amm,
            snapshot.trader,
            &MarginOptions {
                slippage_pct,
                account_for_existing_margin: true,
                account_for_existing_position: true,
            },
        )?;

        let order = build_order(&OrderParams {
            perpetual_id: pair.id,
            trader,
            amount,
            limit_price,
            trigger_price: None,
            deadline: self.deadline_for(created_at),
            referrer: None,
            flags: OrderFlags::CLOSE_ONLY,
            target_leverage: None,
            created_at,
        })?;

        tracing::info!(
            pair = %pair.name,
            %amount,
            %limit_price,
            "planned close"
        );

        Ok(TradePlan {
            order,
            direction,
            limit_price,
            target_position: SignedSize::zero(),
            required_collateral: margin.required,
            margin,
            deposit_required: Quote::zero(),
        })
    }

    /// Resting limit, stop-loss or take-profit order.
    ///
    /// Stops and take-profits protect an existing position and are flagged
    /// close-only. Their trigger must sit on the correct side of mark: a stop
    /// that sells triggers below mark, a take-profit that sells triggers above.
    pub fn plan_conditional(
        &self,
        request: &TradeRequest,
        kind: ConditionalKind,
        snapshot: &MarketSnapshot<'_>,
    ) -> Result<TradePlan, SizingError> {
        let pair = self.checked_pair(request.pair, snapshot)?;
        self.validate_request(request, pair, snapshot)?;

        let mark = snapshot.amm.mark_price()?;
        let (limit_price, trigger_price, flags) = match kind {
            ConditionalKind::Limit { limit_price } => (limit_price, None, OrderFlags::LIMIT_ORDER),
            ConditionalKind::StopLoss {
                trigger_price,
                limit_price,
            } => {
                // selling stop sits below mark, buying stop above
                let valid = match request.side {
                    Side::Short => trigger_price < mark,
                    Side::Long => trigger_price > mark,
                };
                if !valid {
                    return Err(SizingError::InvalidPrice(trigger_price.value()));
                }
                (
                    limit_price,
                    Some(trigger_price),
                    OrderFlags::STOP_LOSS | OrderFlags::CLOSE_ONLY,
                )
            }
            ConditionalKind::TakeProfit {
                trigger_price,
                limit_price,
            } => {
                let valid = match request.side {
                    Side::Short => trigger_price > mark,
                    Side::Long => trigger_price < mark,
                };
                if !valid {
                    return Err(SizingError::InvalidPrice(trigger_price.value()));
                }
                (
                    limit_price,
                    Some(trigger_price),
                    OrderFlags::TAKE_PROFIT | OrderFlags::CLOSE_ONLY,
                )
            }
        };

        self.plan(
            request,
            pair,
            snapshot,
            limit_price,
            trigger_price,
            Decimal::ZERO,
            flags,
        )
    }

    fn checked_pair(
        &self,
        pair_type: PairType,
        snapshot: &MarketSnapshot<'_>,
    ) -> Result<&PerpetualPair, SizingError> {
        let pair = self.pair(pair_type)?;
        if pair.id != snapshot.perp.perpetual_id {
            tracing::warn!(
                pair = %pair.name,
                snapshot = %snapshot.perp.perpetual_id,
                "snapshot belongs to another perpetual"
            );
            return Err(SizingError::UnknownPair(snapshot.perp.perpetual_id.to_string()));
        }
        Ok(pair)
    }

    fn validate_request(
        &self,
        request: &TradeRequest,
        pair: &PerpetualPair,
        snapshot: &MarketSnapshot<'_>,
    ) -> Result<(), SizingError> {
        if request.amount <= Decimal::ZERO {
            return Err(SizingError::InvalidAmount(request.amount));
        }
        // the contract only trades whole lots
        let lot = snapshot.perp.lot_size_bc;
        if lot > Decimal::ZERO && !(request.amount % lot).is_zero() {
            tracing::warn!(amount = %request.amount, %lot, "amount is not a whole number of lots");
            return Err(SizingError::InvalidAmount(request.amount));
        }
        pair.leverage.validate(request.leverage)?;
        validate_leverage(request.leverage, snapshot.perp)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn plan(
        &self,
        request: &TradeRequest,
        pair: &PerpetualPair,
        snapshot: &MarketSnapshot<'_>,
        limit_price: Price,
        trigger_price: Option<Price>,
        slippage_pct: Decimal,
        flags: OrderFlags,
    ) -> Result<TradePlan, SizingError> {
        let amount = request.signed_amount();
        let target_position = snapshot.trader.position_bc.add(amount);

        let margin = margin_breakdown(
            request.leverage,
            target_position,
            snapshot.perp,
            snapshot.amm,
            snapshot.trader,
            &MarginOptions {
                slippage_pct,
                account_for_existing_margin: false,
                account_for_existing_position: true,
            },
        )?;
        let required_collateral = with_gas_fee_buffer(
            margin.required,
            self.config.uses_meta_transactions,
            &self.config.gas,
        );
        let deposit_required = if flags.contains(OrderFlags::CLOSE_ONLY) {
            Quote::zero()
        } else {
            deposit_shortfall(required_collateral, snapshot.trader.available_cash_cc)
        };

        let order = build_order(&OrderParams {
            perpetual_id: pair.id,
            trader: request.trader,
            amount,
            limit_price,
            trigger_price,
            deadline: self.deadline_for(request.created_at),
            referrer: request.referrer,
            flags,
            target_leverage: Some(request.leverage),
            created_at: request.created_at,
        })?;

        tracing::info!(
            pair = %pair.name,
            %amount,
            %limit_price,
            %required_collateral,
            %deposit_required,
            flags = %flags,
            "planned order"
        );

        Ok(TradePlan {
            order,
            direction: request.side,
            limit_price,
            target_position,
            margin,
            required_collateral,
            deposit_required,
        })
    }
}
