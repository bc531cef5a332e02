// 7.0 config.rs: all settings in one place. chain, relay gas, pairs, trade defaults.
// 7.1 built once at startup and passed by reference; nothing here is global.

use crate::pairs::PairRegistry;
use crate::slippage::DEFAULT_SLIPPAGE_PCT;
use crate::types::Quote;
use ethers::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One day.
pub const DEFAULT_DEADLINE_SECS: u64 = 86_400;

const WEI_PER_UNIT: u64 = 1_000_000_000_000_000_000;

// Transaction kinds the relay keeps gas limits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    PerpetualTrade,
    OpenPerpetualTrade,
    DepositMarginToken,
    WithdrawMarginToken,
    Approve,
}

/** 7.2: relay gas table. the allowance is the gas limit read as wei and converted to
whole collateral units. with a gas price set, the limit is priced first */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasFeeConfig {
    pub gas_limits: HashMap<TxKind, u64>,
    // Gas price charged by the relay, in wei. None keeps the plain limit conversion
    #[serde(default)]
    pub gas_price_wei: Option<u64>,
}

impl Default for GasFeeConfig {
    fn default() -> Self {
        let mut gas_limits = HashMap::new();
        gas_limits.insert(TxKind::PerpetualTrade, 3_250_000);
        gas_limits.insert(TxKind::OpenPerpetualTrade, 3_250_000);
        gas_limits.insert(TxKind::DepositMarginToken, 250_000);
        gas_limits.insert(TxKind::WithdrawMarginToken, 250_000);
        gas_limits.insert(TxKind::Approve, 100_000);

        Self {
            gas_limits,
            gas_price_wei: None,
        }
    }
}

impl GasFeeConfig {
    pub fn gas_limit(&self, kind: TxKind) -> Option<u64> {
        self.gas_limits.get(&kind).copied()
    }

    /// Zero when the kind has no configured limit.
    pub fn fee_allowance(&self, kind: TxKind) -> Quote {
        let limit = self.gas_limit(kind).unwrap_or(0);
        let wei = match self.gas_price_wei {
            Some(price) => Decimal::from(limit) * Decimal::from(price),
            None => Decimal::from(limit),
        };
        Quote::new(wei / Decimal::from(WEI_PER_UNIT))
    }
}

// Chain the perpetual manager is deployed on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    // Verifying contract for order signatures
    pub manager_address: Address,
}

// The complete sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    pub chain: ChainConfig,
    pub gas: GasFeeConfig,
    pub pairs: PairRegistry,
    // Slippage offered when the trader has not picked one
    pub default_slippage_pct: Decimal,
    // Order lifetime in seconds
    pub deadline_secs: u64,
    // Trades go through the meta-transaction relay
    pub uses_meta_transactions: bool,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                chain_id: Environment::Development.chain_id(),
                manager_address: Address::zero(),
            },
            gas: GasFeeConfig::default(),
            pairs: PairRegistry::standard(),
            default_slippage_pct: DEFAULT_SLIPPAGE_PCT,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            uses_meta_transactions: false,
        }
    }
}

impl SizingConfig {
    // Preset for a deployed network
    pub fn for_network(environment: Environment, manager_address: Address) -> Self {
        let mut config = Self::default();
        config.chain = ChainConfig {
            chain_id: environment.chain_id(),
            manager_address,
        };
        config
    }

    // Relay-backed preset. gas is paid out of the margin account.
    pub fn with_meta_transactions(mut self) -> Self {
        self.uses_meta_transactions = true;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.chain_id == 0 {
            return Err(ConfigError::InvalidChain {
                reason: "chain id must be non-zero".to_string(),
            });
        }

        if self.default_slippage_pct < Decimal::ZERO
            || self.default_slippage_pct >= Decimal::ONE_HUNDRED
        {
            return Err(ConfigError::InvalidDefaults {
                reason: "default slippage must be in [0, 100)".to_string(),
            });
        }

        if self.deadline_secs == 0 {
            return Err(ConfigError::InvalidDefaults {
                reason: "deadline must be in the future".to_string(),
            });
        }

        if self.pairs.is_empty() {
            return Err(ConfigError::InvalidPairs {
                reason: "at least one pair required".to_string(),
            });
        }

        if let Some(pair) = self.pairs.list().iter().find(|p| !p.leverage.is_consistent()) {
            return Err(ConfigError::InvalidPairs {
                reason: format!("inconsistent leverage bounds for {}", pair.name),
            });
        }

        if self.uses_meta_transactions
            && self.gas.gas_limit(TxKind::PerpetualTrade).is_none()
        {
            return Err(ConfigError::InvalidGas {
                reason: "relay requires a perpetual trade gas limit".to_string(),
            });
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid chain: {reason}")]
    InvalidChain { reason: String },
    #[error("invalid defaults: {reason}")]
    InvalidDefaults { reason: String },
    #[error("invalid pairs: {reason}")]
    InvalidPairs { reason: String },
    #[error("invalid gas table: {reason}")]
    InvalidGas { reason: String },
    #[error("config parse error: {0}")]
    Parse(String),
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn chain_id(&self) -> u64 {
        match self {
            Environment::Development => 1337,
            Environment::Testnet => 31,
            Environment::Mainnet => 30,
        }
    }

    pub fn config(&self, manager_address: Address) -> SizingConfig {
        SizingConfig::for_network(*self, manager_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_valid() {
        let config = SizingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.deadline_secs, 86_400);
        assert_eq!(config.default_slippage_pct, dec!(0.5));
    }

    #[test]
    fn test_environment_presets() {
        let manager = Address::repeat_byte(0x11);
        let testnet = Environment::Testnet.config(manager);
        assert!(testnet.validate().is_ok());
        assert_eq!(testnet.chain.chain_id, 31);
        assert_eq!(testnet.chain.manager_address, manager);

        assert_eq!(Environment::Mainnet.config(manager).chain.chain_id, 30);
        assert_eq!(Environment::Development.config(manager).chain.chain_id, 1337);
    }

    #[test]
    fn test_fee_allowance() {
        // default: the trade gas limit converted from wei
        let gas = GasFeeConfig::default();
        assert_eq!(gas.gas_price_wei, None);
        assert_eq!(
            gas.fee_allowance(TxKind::PerpetualTrade).value(),
            dec!(0.00000000000325)
        );

        let priced = GasFeeConfig {
            gas_limits: HashMap::from([(TxKind::PerpetualTrade, 2_000_000)]),
            gas_price_wei: Some(1_000_000_000), // 1 gwei
        };
        assert_eq!(priced.fee_allowance(TxKind::PerpetualTrade).value(), dec!(0.002));
        assert_eq!(priced.fee_allowance(TxKind::Approve), Quote::zero());
    }

    #[test]
    fn test_gas_price_optional_in_json() {
        let gas: GasFeeConfig =
            serde_json::from_str(r#"{"gas_limits":{"perpetual_trade":3250000}}"#).unwrap();
        assert_eq!(gas.gas_price_wei, None);
        assert_eq!(gas.gas_limit(TxKind::PerpetualTrade), Some(3_250_000));
    }

    #[test]
    fn test_invalid_slippage_default() {
        let mut config = SizingConfig::default();
        config.default_slippage_pct = dec!(100);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDefaults { .. })));
    }

    #[test]
    fn test_meta_transactions_need_gas_limit() {
        let mut config = SizingConfig::default().with_meta_transactions();
        assert!(config.validate().is_ok());
        config.gas.gas_limits.clear();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGas { .. })));
    }

    #[test]
    fn test_empty_pairs_rejected() {
        let mut config = SizingConfig::default();
        config.pairs = PairRegistry::default();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPairs { .. })));
    }

    #[test]
    fn test_config_serialization() {
        let config = SizingConfig::for_network(Environment::Testnet, Address::repeat_byte(0xab));
        let json = config.to_json().unwrap();
        let back = SizingConfig::from_json(&json).unwrap();
        assert_eq!(back.chain.chain_id, 31);
        assert_eq!(back.chain.manager_address, config.chain.manager_address);
        assert_eq!(back.pairs.list().len(), 1);
        assert_eq!(back.gas.gas_limit(TxKind::PerpetualTrade), Some(3_250_000));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(SizingConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
