//! Scripted [`WalletProvider`] for unit tests.
//!
//! Every trait method bumps a call counter so tests can assert that an action
//! never reached the network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{address, Address, Bytes, TxHash, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};

use crate::app::events::WalletEvent;
use crate::core::error::RpcError;
use crate::core::service::{TxReceipt, TxRequest, WalletProvider};
use crate::services::contract::IMusicShop;

/// Hardhat account #0, the contract owner in tests.
pub const OWNER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
/// Hardhat account #1, a regular buyer.
pub const BUYER: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
/// Default local deployment address.
pub const SHOP: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
pub const HARDHAT_CHAIN: &str = "0x7a69";

pub fn album(index: u64, title: &str, price: u64, quantity: u64) -> IMusicShop::Album {
    IMusicShop::Album {
        index: U256::from(index),
        uid: shared::item_uid(title),
        title: title.to_string(),
        price: U256::from(price),
        quantity: U256::from(quantity),
    }
}

#[derive(Default)]
struct Script {
    accounts: Vec<Address>,
    chain_id: String,
    balance: U256,
    owner: Address,
    current_index: u64,
    albums: Vec<IMusicShop::Album>,
    send_error: Option<RpcError>,
    sent: Vec<TxRequest>,
}

#[derive(Default)]
pub struct CallCounts {
    pub request_accounts: AtomicUsize,
    pub chain_id: AtomicUsize,
    pub get_balance: AtomicUsize,
    pub call: AtomicUsize,
    pub send_transaction: AtomicUsize,
    pub wait_for_receipt: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        [
            &self.request_accounts,
            &self.chain_id,
            &self.get_balance,
            &self.call,
            &self.send_transaction,
            &self.wait_for_receipt,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

pub struct MockWallet {
    script: Mutex<Script>,
    pub calls: CallCounts,
    events: broadcast::Sender<WalletEvent>,
    revert: AtomicBool,
    hold_receipts: AtomicBool,
    receipt_gate: Notify,
    next_hash: AtomicUsize,
}

impl MockWallet {
    /// Wallet on the hardhat chain, owner account selected, empty catalogue.
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            script: Mutex::new(Script {
                accounts: vec![OWNER],
                chain_id: HARDHAT_CHAIN.to_string(),
                owner: OWNER,
                ..Script::default()
            }),
            calls: CallCounts::default(),
            events,
            revert: AtomicBool::new(false),
            hold_receipts: AtomicBool::new(false),
            receipt_gate: Notify::new(),
            next_hash: AtomicUsize::new(1),
        })
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.script.lock().accounts = accounts;
    }

    pub fn set_chain_id(&self, chain_id: &str) {
        self.script.lock().chain_id = chain_id.to_string();
    }

    pub fn set_balance(&self, balance: U256) {
        self.script.lock().balance = balance;
    }

    pub fn set_current_index(&self, index: u64) {
        self.script.lock().current_index = index;
    }

    pub fn set_albums(&self, albums: Vec<IMusicShop::Album>) {
        self.script.lock().albums = albums;
    }

    pub fn fail_next_send(&self, err: RpcError) {
        self.script.lock().send_error = Some(err);
    }

    pub fn revert_receipts(&self, revert: bool) {
        self.revert.store(revert, Ordering::SeqCst);
    }

    /// Block `wait_for_receipt` until [`MockWallet::release_receipt`] is called.
    pub fn hold_receipts(&self) {
        self.hold_receipts.store(true, Ordering::SeqCst);
    }

    pub fn release_receipt(&self) {
        self.receipt_gate.notify_one();
    }

    pub fn sent_transactions(&self) -> Vec<TxRequest> {
        self.script.lock().sent.clone()
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.calls.request_accounts.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().accounts.clone())
    }

    async fn chain_id(&self) -> Result<String, RpcError> {
        self.calls.chain_id.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().chain_id.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    async fn get_balance(&self, _address: Address) -> Result<U256, RpcError> {
        self.calls.get_balance.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().balance)
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        self.calls.call.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock();
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| RpcError::internal("calldata shorter than a selector"))?;

        let encoded = if selector == IMusicShop::ownerCall::SELECTOR {
            IMusicShop::ownerCall::abi_encode_returns(&script.owner)
        } else if selector == IMusicShop::currentIndexCall::SELECTOR {
            IMusicShop::currentIndexCall::abi_encode_returns(&U256::from(script.current_index))
        } else if selector == IMusicShop::allAlbumsCall::SELECTOR {
            IMusicShop::allAlbumsCall::abi_encode_returns(&script.albums)
        } else {
            return Err(RpcError::new(-32601, "unknown selector"));
        };
        Ok(encoded.into())
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, RpcError> {
        self.calls.send_transaction.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock();
        if let Some(err) = script.send_error.take() {
            return Err(err);
        }
        script.sent.push(tx);
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst) as u8;
        Ok(B256::with_last_byte(n))
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, RpcError> {
        self.calls.wait_for_receipt.fetch_add(1, Ordering::SeqCst);
        if self.hold_receipts.load(Ordering::SeqCst) {
            self.receipt_gate.notified().await;
        }
        Ok(TxReceipt {
            transaction_hash: hash,
            block_number: Some(1),
            success: !self.revert.load(Ordering::SeqCst),
        })
    }
}
