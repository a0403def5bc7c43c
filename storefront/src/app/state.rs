//! # Session State
//!
//! The storefront's view of the chain for the connected account. A
//! [`SessionState`] is never mutated in place: every change builds a new value
//! and [`SessionStore`] swaps it in and notifies subscribers.
//!
//! The session is a derived cache. The contract and the node are the source
//! of truth, and the snapshot is rebuilt from them on every bind and after
//! every write resolves.

use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{Item, ItemForm};
use tokio::sync::watch;

/// Everything one refresh pass reads from the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSnapshot {
    pub items: Vec<Item>,
    pub owner: Address,
    pub balance: U256,
}

/// What a pending write is doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingKind {
    Buy { index: u64 },
    AddItem { title: String },
}

/// The single write awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub kind: PendingKind,
    pub submitted_at: DateTime<Utc>,
}

impl PendingTransaction {
    pub fn new(hash: TxHash, kind: PendingKind) -> Self {
        Self {
            hash,
            kind,
            submitted_at: Utc::now(),
        }
    }
}

/// Which error field a failure is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSlot {
    /// Connect path: provider, network and chain-state sync failures
    Network,
    /// Write path: form validation and transaction failures
    Transaction,
}

/// Immutable snapshot of the storefront session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub account: Option<Address>,
    /// Native balance of `account`, in wei
    pub balance: Option<U256>,
    pub is_owner: bool,
    pub items: Vec<Item>,
    pub network_error: Option<String>,
    pub transaction_error: Option<String>,
    pub pending_tx: Option<PendingTransaction>,
    pub form: ItemForm,
}

impl SessionState {
    /// Project a freshly read chain snapshot for `account`.
    ///
    /// Error and pending fields start empty. The form is carried over as typed.
    pub fn project(chain: &ChainSnapshot, account: Address, form: ItemForm) -> Self {
        Self {
            account: Some(account),
            balance: Some(chain.balance),
            is_owner: chain.owner == account,
            items: chain.items.clone(),
            network_error: None,
            transaction_error: None,
            pending_tx: None,
            form,
        }
    }

    /// Session bound to `account` whose chain data has not been read yet.
    pub fn for_account(account: Address, form: ItemForm) -> Self {
        Self {
            account: Some(account),
            form,
            ..Self::default()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn item(&self, index: u64) -> Option<&Item> {
        self.items.iter().find(|item| item.index == index)
    }

    /// Local patch after a confirmed purchase: one fewer copy of `index`.
    ///
    /// Saturates at zero. Every other item is left untouched.
    pub fn with_purchase(&self, index: u64) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.index == index {
                    Item {
                        quantity_available: item.quantity_available.saturating_sub(U256::from(1)),
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();

        Self {
            items,
            ..self.clone()
        }
    }

    /// Local patch after a confirmed `addAlbum`.
    pub fn with_added(&self, item: Item) -> Self {
        let mut items = self.items.clone();
        items.push(item);
        Self {
            items,
            ..self.clone()
        }
    }

    /// Replace the chain-derived fields with a new read, keeping errors,
    /// the pending write and the form.
    pub fn with_chain(&self, chain: &ChainSnapshot) -> Self {
        let account = self.account.unwrap_or_default();
        Self {
            balance: Some(chain.balance),
            is_owner: self.account.is_some() && chain.owner == account,
            items: chain.items.clone(),
            ..self.clone()
        }
    }

    pub fn with_balance(&self, balance: U256) -> Self {
        Self {
            balance: Some(balance),
            ..self.clone()
        }
    }

    pub fn with_pending(&self, pending_tx: Option<PendingTransaction>) -> Self {
        Self {
            pending_tx,
            ..self.clone()
        }
    }

    pub fn with_error(&self, slot: ErrorSlot, message: Option<String>) -> Self {
        match slot {
            ErrorSlot::Network => Self {
                network_error: message,
                ..self.clone()
            },
            ErrorSlot::Transaction => Self {
                transaction_error: message,
                ..self.clone()
            },
        }
    }

    pub fn with_form(&self, form: ItemForm) -> Self {
        Self {
            form,
            ..self.clone()
        }
    }
}

/// Holds the current snapshot and publishes every replacement.
pub struct SessionStore {
    tx: watch::Sender<Arc<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(SessionState::default()));
        Self { tx }
    }

    pub fn current(&self) -> Arc<SessionState> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.tx.subscribe()
    }

    /// Swap in a new snapshot.
    pub fn replace(&self, state: SessionState) {
        self.tx.send_replace(Arc::new(state));
    }

    /// Build the next snapshot from the current one and swap it in atomically.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        self.tx.send_modify(|current| *current = Arc::new(f(current)));
    }

    pub fn clear(&self) {
        self.replace(SessionState::default());
    }
}
