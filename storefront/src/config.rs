//! # Storefront Configuration
//!
//! The expected chain id and the contract address are fixed at build time
//! (`SHOP_CHAIN_ID`, `SHOP_CONTRACT_ADDRESS` read with `option_env!`). The
//! node URL and receipt poll interval are read from the environment at
//! startup, after loading `.env` if one exists.
//!
//! ## Global Config Access
//!
//! ```rust,no_run
//! use storefront::config::{init_config, shop_config};
//!
//! init_config().unwrap();
//! let config = shop_config().unwrap();
//! println!("{}", config.rpc_url);
//! ```

use std::env;
use std::sync::OnceLock;
use std::time::Duration;

use alloy_primitives::Address;
use thiserror::Error;

use crate::services::network_guard::ChainId;

/// Hardhat's default chain id (31337).
pub const DEFAULT_CHAIN_ID: &str = "0x7a69";
/// First contract deployed by Hardhat account #0 on a fresh node.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 500;
/// Human-readable name of the expected network, used in the mismatch message.
pub const NETWORK_NAME: &str = "localhost Hardhat network";

const BUILD_CHAIN_ID: Option<&str> = option_env!("SHOP_CHAIN_ID");
const BUILD_CONTRACT_ADDRESS: Option<&str> = option_env!("SHOP_CONTRACT_ADDRESS");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Config has already been initialized")]
    AlreadyInitialized,

    #[error("Config must be initialized with init_config() before use")]
    NotInitialized,
}

impl From<ConfigError> for crate::core::error::AppError {
    fn from(err: ConfigError) -> Self {
        crate::core::error::AppError::Config(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Chain the contract is deployed on
    pub expected_chain_id: ChainId,
    /// Deployed `MusicShop` address
    pub contract_address: Address,
    /// JSON-RPC endpoint of the wallet node
    pub rpc_url: String,
    /// Interval between receipt polls
    pub receipt_poll_interval: Duration,
}

impl ShopConfig {
    /// Build the config from compile-time constants and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_sources(
            BUILD_CHAIN_ID,
            BUILD_CONTRACT_ADDRESS,
            env::var("SHOP_RPC_URL").ok(),
            env::var("SHOP_RECEIPT_POLL_MS").ok(),
        )
    }

    fn from_sources(
        chain_id: Option<&str>,
        contract_address: Option<&str>,
        rpc_url: Option<String>,
        receipt_poll_ms: Option<String>,
    ) -> Result<Self, ConfigError> {
        let contract_address = contract_address
            .unwrap_or(DEFAULT_CONTRACT_ADDRESS)
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                name: "SHOP_CONTRACT_ADDRESS",
                reason: e.to_string(),
            })?;

        let receipt_poll_ms = match receipt_poll_ms {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "SHOP_RECEIPT_POLL_MS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_RECEIPT_POLL_MS,
        };

        Ok(Self {
            expected_chain_id: ChainId::new(chain_id.unwrap_or(DEFAULT_CHAIN_ID)),
            contract_address,
            rpc_url: rpc_url.unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            receipt_poll_interval: Duration::from_millis(receipt_poll_ms),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_chain_id.as_str().is_empty() {
            return Err(ConfigError::Invalid {
                name: "SHOP_CHAIN_ID",
                reason: "must not be empty".to_string(),
            });
        }

        if self.contract_address == Address::ZERO {
            return Err(ConfigError::Invalid {
                name: "SHOP_CONTRACT_ADDRESS",
                reason: "must not be the zero address".to_string(),
            });
        }

        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "SHOP_RPC_URL",
                reason: format!("expected an http(s) URL, got {}", self.rpc_url),
            });
        }

        if self.receipt_poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "SHOP_RECEIPT_POLL_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

static CONFIG: OnceLock<ShopConfig> = OnceLock::new();

/// Load, validate and install the global configuration. Call once at startup.
pub fn init_config() -> Result<&'static ShopConfig, ConfigError> {
    let config = ShopConfig::from_env()?;
    config.validate()?;

    CONFIG.set(config).map_err(|_| ConfigError::AlreadyInitialized)?;
    shop_config()
}

pub fn shop_config() -> Result<&'static ShopConfig, ConfigError> {
    CONFIG.get().ok_or(ConfigError::NotInitialized)
}
