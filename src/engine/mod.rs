// 8.0: order engine. turns a trade form (pair, side, amount, leverage, slippage)
// plus the latest contract snapshots into a sized, bounded, encoded order.
// stateless between calls; borrows its configuration.

mod core;
mod orders;
mod pricing;
mod results;

pub use self::core::{MarketSnapshot, OrderEngine};
pub use results::{ConditionalKind, TradePlan, TradeRequest};
