//! Perpetual pair registry.
//!
//! An explicit, immutable table of tradable pairs built once at startup and
//! handed to the engine by reference. Pairs are never removed, only marked
//! deprecated, so historic orders and open positions still resolve.

use crate::error::SizingError;
use crate::types::{Leverage, PerpetualId, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PairType {
    #[serde(rename = "BTCUSD")]
    BtcUsd,
}

impl fmt::Display for PairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairType::BtcUsd => write!(f, "BTCUSD"),
        }
    }
}

/// Leverage slider bounds for a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageBounds {
    pub min: Decimal,
    pub max: Decimal,
    pub steps: Vec<Decimal>,
    pub default: Decimal,
}

impl LeverageBounds {
    pub fn validate(&self, leverage: Leverage) -> Result<Leverage, SizingError> {
        let value = leverage.value();
        if value < self.min || value > self.max {
            return Err(SizingError::InvalidLeverage {
                requested: value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(leverage)
    }

    pub fn default_leverage(&self) -> Option<Leverage> {
        Leverage::new(self.default)
    }

    pub fn is_consistent(&self) -> bool {
        self.min > Decimal::ZERO
            && self.min <= self.default
            && self.default <= self.max
            && self.steps.iter().all(|s| *s >= self.min && *s <= self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerpetualPair {
    pub id: PerpetualId,
    pub pair_type: PairType,
    pub name: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub collateral_asset: String,
    pub leverage: LeverageBounds,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairRegistry {
    pairs: Vec<PerpetualPair>,
}

impl PairRegistry {
    pub fn new(pairs: Vec<PerpetualPair>) -> Self {
        Self { pairs }
    }

    /// The pairs listed on the production deployment.
    pub fn standard() -> Self {
        let btc_usd_id = PerpetualId(ethers::types::H256([
            0xad, 0xa5, 0x01, 0x31, 0x22, 0xd3, 0x95, 0xba, 0x3c, 0x54, 0x77, 0x22, 0x83, 0xfb,
            0x06, 0x9b, 0x10, 0x42, 0x60, 0x56, 0xef, 0x8c, 0xa5, 0x47, 0x50, 0xcb, 0x9b, 0xb5,
            0x52, 0xa5, 0x9e, 0x7d,
        ]));
        Self::new(vec![PerpetualPair {
            id: btc_usd_id,
            pair_type: PairType::BtcUsd,
            name: "BTC/USD".to_string(),
            base_asset: "BTC".to_string(),
            quote_asset: "USD".to_string(),
            collateral_asset: "PERPETUALS".to_string(),
            leverage: LeverageBounds {
                min: dec!(0.1),
                max: dec!(15),
                steps: vec![dec!(1), dec!(2), dec!(3), dec!(5), dec!(10), dec!(15)],
                default: dec!(1),
            },
            deprecated: false,
        }])
    }

    pub fn get(&self, pair_type: PairType) -> Option<&PerpetualPair> {
        self.pairs.iter().find(|p| p.pair_type == pair_type)
    }

    /// Like `get`, but refuses deprecated pairs.
    pub fn tradable(&self, pair_type: PairType) -> Result<&PerpetualPair, SizingError> {
        let pair = self
            .get(pair_type)
            .ok_or_else(|| SizingError::UnknownPair(pair_type.to_string()))?;
        if pair.deprecated {
            return Err(SizingError::PairDeprecated(pair.name.clone()));
        }
        Ok(pair)
    }

    pub fn get_by_id(&self, id: &PerpetualId) -> Option<&PerpetualPair> {
        self.pairs.iter().find(|p| &p.id == id)
    }

    pub fn list(&self) -> &[PerpetualPair] {
        &self.pairs
    }

    pub fn active(&self) -> impl Iterator<Item = &PerpetualPair> {
        self.pairs.iter().filter(|p| !p.deprecated)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Finds the pair trading these two assets in either order.
    pub fn find_pair(&self, asset_a: &str, asset_b: &str) -> Option<&PerpetualPair> {
        self.pairs.iter().find(|p| {
            (p.quote_asset == asset_a && p.base_asset == asset_b)
                || (p.base_asset == asset_a && p.quote_asset == asset_b)
        })
    }

    /// Paying with the quote asset to receive base is a long, the reverse a short.
    pub fn position_for(&self, pay_asset: &str, receive_asset: &str) -> Option<Side> {
        let pair = self.find_pair(pay_asset, receive_asset)?;
        if pair.quote_asset == pay_asset {
            Some(Side::Long)
        } else {
            Some(Side::Short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn standard_registry_has_btc_usd() {
        let registry = PairRegistry::standard();
        let pair = registry.get(PairType::BtcUsd).unwrap();
        assert_eq!(
            pair.id.to_string(),
            "0xada5013122d395ba3c54772283fb069b10426056ef8ca54750cb9bb552a59e7d"
        );
        assert_eq!(registry.get_by_id(&pair.id).unwrap().name, "BTC/USD");
        assert!(pair.leverage.is_consistent());
        assert_eq!(registry.active().count(), 1);
    }

    #[test]
    fn leverage_bounds_enforced() {
        let registry = PairRegistry::standard();
        let bounds = &registry.get(PairType::BtcUsd).unwrap().leverage;
        assert!(bounds.validate(Leverage::new(dec!(0.1)).unwrap()).is_ok());
        assert!(bounds.validate(Leverage::new(dec!(15)).unwrap()).is_ok());
        assert!(bounds.validate(Leverage::new(dec!(0.05)).unwrap()).is_err());
        assert!(matches!(
            bounds.validate(Leverage::new(dec!(20)).unwrap()),
            Err(SizingError::InvalidLeverage { .. })
        ));
        assert_eq!(bounds.default_leverage().unwrap().value(), dec!(1));
    }

    #[test]
    fn position_by_asset_order() {
        let registry = PairRegistry::standard();
        assert_eq!(registry.position_for("USD", "BTC"), Some(Side::Long));
        assert_eq!(registry.position_for("BTC", "USD"), Some(Side::Short));
        assert_eq!(registry.position_for("ETH", "USD"), None);
    }

    #[test]
    fn deprecated_pairs_still_resolve_but_do_not_trade() {
        let mut pair = PairRegistry::standard().get(PairType::BtcUsd).unwrap().clone();
        pair.deprecated = true;
        let registry = PairRegistry::new(vec![pair]);

        assert!(registry.get(PairType::BtcUsd).is_some());
        assert_eq!(registry.active().count(), 0);
        assert!(matches!(
            registry.tradable(PairType::BtcUsd),
            Err(SizingError::PairDeprecated(_))
        ));
        assert!(matches!(
            PairRegistry::default().tradable(PairType::BtcUsd),
            Err(SizingError::UnknownPair(_))
        ));
    }
}
