//! Order sizing simulation.
//!
//! Walks the trade form flow end to end: sizing collateral, bounding the
//! price by slippage, encoding the order and producing the digest to sign.
//! Set `RUST_LOG=debug` to see every intermediate quantity.

use perps_orders::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::error::Error;
use tracing_subscriber::EnvFilter;

type SimResult = Result<(), Box<dyn Error>>;

fn main() -> SimResult {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Perpetual Order Sizing Simulation");
    println!("BTC/USD, quote collateral, testnet domain\n");

    let manager = parse_address("0x1111111111111111111111111111111111111111")?;
    let config = Environment::Testnet.config(manager);
    config.validate()?;
    let engine = OrderEngine::new(&config);

    scenario_1_open_long(&engine)?;
    scenario_2_add_with_existing_position(&engine)?;
    scenario_3_close_position(&engine)?;
    scenario_4_stop_loss(&engine)?;
    scenario_5_relayed_trade(&config)?;
    scenario_6_rejections(&engine)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn btc_perp(config: &SizingConfig) -> Result<PerpParameters, SizingError> {
    let pair = config.pairs.tradable(PairType::BtcUsd)?;
    Ok(PerpParameters::new(pair.id))
}

fn amm_at(index: Decimal) -> Result<AmmState, SizingError> {
    Ok(AmmState::new(Price::try_new(index)?, Price::try_new(Decimal::ONE)?))
}

fn trader_address() -> Result<ethers::types::Address, SizingError> {
    parse_address("0x4242424242424242424242424242424242424242")
}

fn request(side: Side, amount: Decimal, leverage: Decimal) -> Result<TradeRequest, SizingError> {
    Ok(TradeRequest {
        pair: PairType::BtcUsd,
        trader: trader_address()?,
        side,
        amount,
        leverage: Leverage::try_new(leverage)?,
        slippage_pct: None,
        referrer: None,
        created_at: Timestamp::now(),
    })
}

fn print_plan(plan: &TradePlan) {
    println!("  Direction: {:?}, limit price: ${}", plan.direction, plan.limit_price);
    println!(
        "  Position margin: ${}, entry cost: ${}, fees: ${}",
        plan.margin.position_margin.value().round_dp(4),
        plan.margin.entry_cost.value().round_dp(4),
        plan.margin.fees.value().round_dp(4)
    );
    println!(
        "  Required collateral: ${}, deposit first: ${}",
        plan.required_collateral.value().round_dp(4),
        plan.deposit_required.value().round_dp(4)
    );
    println!(
        "  Encoded amount: {:#x}, flags: {}, deadline: {}",
        plan.order.amount().raw(),
        plan.order.flags(),
        plan.order.deadline()
    );
}

/// Open 1 BTC long at 3x from a flat account.
fn scenario_1_open_long(engine: &OrderEngine<'_>) -> SimResult {
    println!("Scenario 1: Open Long\n");

    let perp = btc_perp(engine.config())?;
    let amm = amm_at(dec!(20000))?;
    let trader = TraderState {
        available_cash_cc: Quote::new(dec!(5000)),
        margin_balance_cc: Quote::new(dec!(5000)),
        ..TraderState::empty()
    };
    let snapshot = MarketSnapshot::new(&perp, &amm, &trader);

    let plan = engine.plan_trade(&request(Side::Long, dec!(1), dec!(3))?, &snapshot)?;
    print_plan(&plan);

    let digest = engine.placement_digest(&plan.order);
    println!("  Digest to sign: {:?}\n", digest);
    Ok(())
}

/// Add 0.5 BTC to an existing 1 BTC long that is in profit.
fn scenario_2_add_with_existing_position(engine: &OrderEngine<'_>) -> SimResult {
    println!("Scenario 2: Increase Position\n");

    let perp = btc_perp(engine.config())?;
    let mut amm = amm_at(dec!(21000))?;
    amm.mark_premium_rate = dec!(0.0005);
    let trader = TraderState {
        available_cash_cc: Quote::new(dec!(2000)),
        margin_balance_cc: Quote::new(dec!(8000)),
        position_bc: SignedSize::new(dec!(1)),
        locked_in_value_qc: dec!(20000),
    };
    println!(
        "  Unrealized PnL: ${} ({} BTC)",
        trader_pnl(&trader, &amm)?.round_dp(2),
        trader_pnl_in_base(&trader, &amm)?.round_dp(6)
    );

    let snapshot = MarketSnapshot::new(&perp, &amm, &trader)
        .with_average_price(Price::try_new(dec!(21010))?);
    let plan = engine.plan_trade(&request(Side::Long, dec!(0.5), dec!(5))?, &snapshot)?;
    print_plan(&plan);
    println!("  Target position: {} BTC\n", plan.target_position);
    Ok(())
}

/// Close a 2 BTC short.
fn scenario_3_close_position(engine: &OrderEngine<'_>) -> SimResult {
    println!("Scenario 3: Close Position\n");

    let perp = btc_perp(engine.config())?;
    let amm = amm_at(dec!(19500))?;
    let trader = TraderState {
        available_cash_cc: Quote::new(dec!(1000)),
        margin_balance_cc: Quote::new(dec!(9000)),
        position_bc: SignedSize::new(dec!(-2)),
        locked_in_value_qc: dec!(-40000),
    };
    let snapshot = MarketSnapshot::new(&perp, &amm, &trader);

    let plan = engine.plan_close(
        PairType::BtcUsd,
        trader_address()?,
        Some(dec!(1)),
        Timestamp::now(),
        &snapshot,
    )?;
    print_plan(&plan);
    println!("  Close only: {}\n", plan.order.is_close_only());
    Ok(())
}

/// Protective stop for a 1 BTC long.
fn scenario_4_stop_loss(engine: &OrderEngine<'_>) -> SimResult {
    println!("Scenario 4: Stop Loss\n");

    let perp = btc_perp(engine.config())?;
    let amm = amm_at(dec!(20000))?;
    let trader = TraderState {
        available_cash_cc: Quote::new(dec!(500)),
        margin_balance_cc: Quote::new(dec!(7000)),
        position_bc: SignedSize::new(dec!(1)),
        locked_in_value_qc: dec!(20000),
    };
    let snapshot = MarketSnapshot::new(&perp, &amm, &trader);

    let kind = ConditionalKind::StopLoss {
        trigger_price: Price::try_new(dec!(18500))?,
        limit_price: Price::try_new(dec!(18400))?,
    };
    let plan = engine.plan_conditional(&request(Side::Short, dec!(1), dec!(3))?, kind, &snapshot)?;
    print_plan(&plan);
    println!("  Trigger: ${}\n", plan.order.trigger_price());
    Ok(())
}

/// Same trade as scenario 1 through the meta-transaction relay.
fn scenario_5_relayed_trade(config: &SizingConfig) -> SimResult {
    println!("Scenario 5: Relayed Trade\n");

    let relayed = config.clone().with_meta_transactions();
    relayed.validate()?;
    let engine = OrderEngine::new(&relayed);

    let perp = btc_perp(&relayed)?;
    let amm = amm_at(dec!(20000))?;
    let trader = TraderState::empty();
    let snapshot = MarketSnapshot::new(&perp, &amm, &trader);

    let plan = engine.plan_trade(&request(Side::Long, dec!(1), dec!(3))?, &snapshot)?;
    println!(
        "  Gas allowance: ${}",
        relayed.gas.fee_allowance(TxKind::PerpetualTrade)
    );
    print_plan(&plan);
    println!();
    Ok(())
}

/// Inputs the engine refuses.
fn scenario_6_rejections(engine: &OrderEngine<'_>) -> SimResult {
    println!("Scenario 6: Rejected Inputs\n");

    let perp = btc_perp(engine.config())?;
    let amm = amm_at(dec!(20000))?;
    let trader = TraderState::empty();
    let snapshot = MarketSnapshot::new(&perp, &amm, &trader);

    let mut too_much_slippage = request(Side::Long, dec!(1), dec!(3))?;
    too_much_slippage.slippage_pct = Some(dec!(100));
    if let Err(e) = engine.plan_trade(&too_much_slippage, &snapshot) {
        println!("  {}", e);
    }

    if let Err(e) = engine.plan_trade(&request(Side::Long, dec!(1), dec!(20))?, &snapshot) {
        println!("  {}", e);
    }

    if let Err(e) = engine.plan_close(
        PairType::BtcUsd,
        trader_address()?,
        None,
        Timestamp::now(),
        &snapshot,
    ) {
        println!("  {}", e);
    }

    let created = Timestamp::now();
    let stale = OrderParams {
        perpetual_id: perp.perpetual_id,
        trader: trader_address()?,
        amount: SignedSize::new(dec!(1)),
        limit_price: Price::try_new(dec!(20000))?,
        trigger_price: None,
        deadline: created,
        referrer: None,
        flags: OrderFlags::MARKET_ORDER,
        target_leverage: None,
        created_at: created,
    };
    if let Err(e) = build_order(&stale) {
        println!("  {}", e);
    }
    Ok(())
}
