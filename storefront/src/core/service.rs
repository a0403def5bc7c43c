//! # Service Traits
//!
//! The wallet-provider seam. Everything the storefront needs from the outside
//! world (accounts, chain id, notifications, reads, writes, receipts) goes
//! through [`WalletProvider`], so tests can swap in a scripted provider.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::app::events::WalletEvent;
use crate::core::error::RpcError;

/// Transaction request handed to the wallet for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Account the wallet should sign with
    pub from: Address,
    /// Target contract address
    pub to: Address,
    /// Value attached, in wei
    pub value: U256,
    /// Encoded calldata
    pub data: Bytes,
}

impl TxRequest {
    pub fn new(from: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to,
            value: U256::ZERO,
            data: data.into(),
        }
    }

    /// Set transaction value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` when the transaction was mined but reverted
    pub success: bool,
}

/// Wallet provider operations.
///
/// Implemented by [`crate::services::rpc::JsonRpcWallet`] in production and by
/// a scripted mock in tests.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for access and return its accounts, selected one first.
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError>;

    /// Current chain id exactly as the wallet reports it (e.g. `"0x7a69"`).
    async fn chain_id(&self) -> Result<String, RpcError>;

    /// Subscribe to account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// Native balance of `address`, in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, RpcError>;

    /// Read-only contract call at the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError>;

    /// Sign and submit a transaction, returning its hash as soon as the wallet accepts it.
    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, RpcError>;

    /// Wait until the transaction is mined. No timeout is applied.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, RpcError>;
}
