//! # Network Guard
//!
//! Confirms the wallet is pointed at the one chain the contract is deployed on
//! before a connection is allowed to proceed. No retry: after a mismatch the
//! user switches networks and connects again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::service::WalletProvider;

/// Chain identifier as reported by a wallet (`"0x7a69"`) or configured (`"31337"`).
///
/// Two ids are equal when both parse as numbers (hex with `0x`, or decimal) and
/// the numbers match. Otherwise the raw strings must match exactly.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.0.strip_prefix("0x").or_else(|| self.0.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => self.0.parse().ok(),
        }
    }
}

impl PartialEq for ChainId {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_u64(), other.as_u64()) {
            (Some(a), Some(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a network check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Pass,
    Mismatch {
        /// Chain id the wallet reported
        actual: ChainId,
        /// What the user should do about it
        remediation: String,
    },
}

#[derive(Debug, Clone)]
pub struct NetworkGuard {
    expected: ChainId,
    network_name: String,
}

impl NetworkGuard {
    pub fn new(expected: ChainId, network_name: impl Into<String>) -> Self {
        Self {
            expected,
            network_name: network_name.into(),
        }
    }

    /// Query the wallet's chain id and compare it with the expected one.
    pub async fn check(&self, provider: &dyn WalletProvider) -> Result<GuardOutcome> {
        let actual = ChainId::new(provider.chain_id().await?);

        if actual == self.expected {
            tracing::debug!(chain_id = %actual, "Network check passed");
            return Ok(GuardOutcome::Pass);
        }

        tracing::warn!(
            expected = %self.expected,
            actual = %actual,
            "Wallet is connected to the wrong network"
        );

        Ok(GuardOutcome::Mismatch {
            remediation: format!(
                "Please switch to the {} (chain id {}) in your wallet and try again",
                self.network_name, self.expected
            ),
            actual,
        })
    }
}
