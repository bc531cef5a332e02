// perps-orders: order sizing and risk engine for a perpetual swap client.
// turns a trader's intended position change into a bounded, encoded, signable order.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   0.x  error.rs: validation errors
//   1.x  types.rs: primitives: PerpetualId, Side, Price, Quote, Leverage, Timestamp
//   1.7x fixed_point.rs: signed 64.64 codec
//   1.8x flags.rs: order flag bitmask
//   2.x  state.rs: perp parameters, AMM and trader snapshots, mark/mid price, PnL
//   3.x  slippage.rs: slippage bounded limit prices
//   4.x  margin.rs: required collateral, gas buffer, deposit shortfall
//   5.x  order.rs: order params and encoded order record
//   5.1x digest.rs: typed structured-data digest for signing
//   6.x  pairs.rs: perpetual pair registry
//   7.x  config.rs: chain, relay gas, defaults, env presets
//   8.x  engine/: trade, close and conditional order planning

pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod flags;
pub mod margin;
pub mod order;
pub mod pairs;
pub mod slippage;
pub mod state;
pub mod types;

// re exports for convenience
pub use config::{ConfigError, Environment, GasFeeConfig, SizingConfig, TxKind};
pub use digest::{cancel_order_digest, order_digest, sign_order_digest};
pub use engine::*;
pub use error::SizingError;
pub use fixed_point::Fixed64x64;
pub use flags::{OrderFlags, OrderFlagsBuilder};
pub use margin::*;
pub use order::{build_order, Order, OrderParams};
pub use pairs::{LeverageBounds, PairRegistry, PairType, PerpetualPair};
pub use slippage::{slippage_bounded_price, DEFAULT_SLIPPAGE_PCT};
pub use state::{trader_pnl, trader_pnl_in_base, AmmState, PerpParameters, TraderState};
pub use types::*;
