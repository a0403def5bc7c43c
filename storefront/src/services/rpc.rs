//! # JSON-RPC Wallet
//!
//! [`WalletProvider`] over HTTP JSON-RPC, for nodes that manage their own
//! accounts (a local Hardhat or Anvil node, or a wallet bridge exposing the
//! EIP-1193 method set over HTTP).
//!
//! Account and chain notifications cannot be observed over plain HTTP, so the
//! hosting shell pushes them with [`JsonRpcWallet::emit`]. Receipts are polled
//! at the configured interval until the node reports one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::app::events::WalletEvent;
use crate::core::error::RpcError;
use crate::core::service::{TxReceipt, TxRequest, WalletProvider};

/// Default interval between `eth_getTransactionReceipt` polls.
pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_millis(500);

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    block_number: Option<U256>,
    /// `0x1` success, `0x0` revert. Pre-Byzantium receipts omit it.
    #[serde(default)]
    status: Option<U256>,
}

impl From<RawReceipt> for TxReceipt {
    fn from(raw: RawReceipt) -> Self {
        TxReceipt {
            transaction_hash: raw.transaction_hash,
            block_number: raw.block_number.and_then(|n| u64::try_from(n).ok()),
            success: raw.status.map_or(true, |s| s == U256::from(1)),
        }
    }
}

/// HTTP JSON-RPC wallet provider.
pub struct JsonRpcWallet {
    client: Client,
    url: String,
    next_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
    receipt_poll: Duration,
}

impl JsonRpcWallet {
    /// Create a provider for `url` (e.g. `http://127.0.0.1:8545`).
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
            events,
            receipt_poll: DEFAULT_RECEIPT_POLL,
        }
    }

    pub fn with_receipt_poll(mut self, interval: Duration) -> Self {
        self.receipt_poll = interval;
        self
    }

    /// Push an account or chain notification to subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&self, event: WalletEvent) -> usize {
        tracing::debug!(event = event.kind(), "Wallet event emitted");
        self.events.send(event).unwrap_or(0)
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::trace!(method, id, "JSON-RPC request");

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(RpcError::internal(format!(
                "{} failed with HTTP {}",
                method,
                response.status()
            )));
        }

        let envelope = response.json::<RpcResponse>().await?;

        if let Some(err) = envelope.error {
            tracing::debug!(method, code = err.code, error = %err.message, "JSON-RPC error");
            return Err(err);
        }

        serde_json::from_value(envelope.result.unwrap_or(Value::Null))
            .map_err(|e| RpcError::internal(format!("Unexpected {} result: {}", method, e)))
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.request("eth_requestAccounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<String, RpcError> {
        self.request("eth_chainId", json!([])).await
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        self.request("eth_getBalance", json!([address, "latest"])).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, RpcError> {
        let params = json!([{
            "from": tx.from,
            "to": tx.to,
            "value": tx.value,
            "data": tx.data,
        }]);
        self.request("eth_sendTransaction", params).await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, RpcError> {
        loop {
            let receipt: Option<RawReceipt> = self
                .request("eth_getTransactionReceipt", json!([hash]))
                .await?;

            if let Some(raw) = receipt {
                return Ok(raw.into());
            }

            tokio::time::sleep(self.receipt_poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_request_serialization() {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_chainId",
            params: json!([]),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "jsonrpc": "2.0", "id": 7, "method": "eth_chainId", "params": [] }));
    }

    #[test]
    fn test_response_with_error_payload() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "execution reverted", "data": { "message": "Album sold out" } }
        }))
        .unwrap();

        let err = response.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.surface_message(), "Album sold out");
    }

    #[test]
    fn test_raw_receipt_status() {
        let ok: RawReceipt = serde_json::from_value(json!({
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "blockNumber": "0x2",
            "status": "0x1"
        }))
        .unwrap();
        let receipt = TxReceipt::from(ok);
        assert!(receipt.success);
        assert_eq!(receipt.block_number, Some(2));

        let reverted: RawReceipt = serde_json::from_value(json!({
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000002",
            "blockNumber": "0x3",
            "status": "0x0"
        }))
        .unwrap();
        assert!(!TxReceipt::from(reverted).success);
    }

    #[test]
    fn test_send_transaction_params_are_hex() {
        let from = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let value = json!({ "from": from, "value": U256::from(255) });
        assert_eq!(
            value["from"].as_str().unwrap().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(value["value"], "0xff");
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let wallet = JsonRpcWallet::new("http://127.0.0.1:8545");
        let mut rx = wallet.subscribe();

        assert_eq!(wallet.emit(WalletEvent::ChainChanged("0x1".into())), 1);
        assert_eq!(rx.recv().await.unwrap(), WalletEvent::ChainChanged("0x1".into()));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let wallet = JsonRpcWallet::new("http://127.0.0.1:8545");
        assert_eq!(wallet.emit(WalletEvent::AccountsChanged(None)), 0);
    }
}
