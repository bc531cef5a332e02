// 8.0 engine/core.rs: main engine. holds a reference to the sizing config, nothing else.

use crate::config::SizingConfig;
use crate::digest::{cancel_order_digest, sign_order_digest};
use crate::error::SizingError;
use crate::order::Order;
use crate::pairs::{PairType, PerpetualPair};
use crate::state::{AmmState, PerpParameters, TraderState};
use crate::types::{Price, Timestamp};
use ethers::types::H256;

/// Snapshots the caller fetched for one perpetual. Must be refreshed before each order.
#[derive(Debug, Clone, Copy)]
pub struct MarketSnapshot<'s> {
    pub perp: &'s PerpParameters,
    pub amm: &'s AmmState,
    pub trader: &'s TraderState,
    /// Average execution price from the depth chart, when available.
    pub average_price: Option<Price>,
}

impl<'s> MarketSnapshot<'s> {
    pub fn new(perp: &'s PerpParameters, amm: &'s AmmState, trader: &'s TraderState) -> Self {
        Self {
            perp,
            amm,
            trader,
            average_price: None,
        }
    }

    pub fn with_average_price(mut self, price: Price) -> Self {
        self.average_price = Some(price);
        self
    }
}

/** 8.1: main engine struct. all state lives in the borrowed config */
#[derive(Debug, Clone, Copy)]
pub struct OrderEngine<'c> {
    pub(super) config: &'c SizingConfig,
}

impl<'c> OrderEngine<'c> {
    pub fn new(config: &'c SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        self.config
    }

    pub fn pair(&self, pair_type: PairType) -> Result<&'c PerpetualPair, SizingError> {
        self.config.pairs.tradable(pair_type)
    }

    pub fn deadline_for(&self, created_at: Timestamp) -> Timestamp {
        created_at.plus_secs(self.config.deadline_secs)
    }

    /// Digest to sign for placing `order` on the configured chain.
    pub fn placement_digest(&self, order: &Order) -> H256 {
        sign_order_digest(
            order,
            self.config.chain.manager_address,
            self.config.chain.chain_id,
        )
    }

    pub fn cancellation_digest(&self, order: &Order) -> H256 {
        cancel_order_digest(
            order,
            self.config.chain.manager_address,
            self.config.chain.chain_id,
        )
    }
}
