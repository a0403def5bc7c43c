//! # Wallet Events
//!
//! Notifications pushed by the wallet provider. They are delivered in emission
//! order and consumed by the connection lifecycle's transition function.

use alloy_primitives::Address;

/// Account and chain notifications from the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// Selected account changed. `None` when the wallet exposes no account
    /// (locked, or the site was disconnected from the wallet side).
    AccountsChanged(Option<Address>),
    /// Wallet switched to another chain, carrying the new chain id as reported.
    ChainChanged(String),
}

impl WalletEvent {
    /// Short name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletEvent::AccountsChanged(Some(_)) => "accounts_changed",
            WalletEvent::AccountsChanged(None) => "accounts_removed",
            WalletEvent::ChainChanged(_) => "chain_changed",
        }
    }
}
