//! # Storefront Orchestrator
//!
//! [`Storefront`] turns user actions and wallet notifications into lifecycle
//! transitions, contract calls and session snapshots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Presentation (CLI, UI shell)                               │
//! │  - calls connect() / buy() / add_item() / dismiss_*()       │
//! │  - renders every snapshot from subscribe()                  │
//! └────────────┬───────────────────────────────▲────────────────┘
//!              │ actions                       │ watch<Arc<SessionState>>
//! ┌────────────▼───────────────────────────────┴────────────────┐
//! │  Storefront                                                 │
//! │  ┌────────────────────────┐   ┌──────────────────────────┐  │
//! │  │ ConnectionLifecycle    │   │ SessionStore             │  │
//! │  │ - pure transition()    │   │ - snapshot replaced      │  │
//! │  │ - current Connection   │   │   wholesale              │  │
//! │  └───────────┬────────────┘   └──────────────────────────┘  │
//! │              │        write permit: Semaphore(1)            │
//! └──────────────┼──────────────────────────────────────────────┘
//!                │ ShopContract / NetworkGuard
//! ┌──────────────▼──────────────────────────────────────────────┐
//! │  WalletProvider  ──▶ broadcast<WalletEvent> ──▶ event pump   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writes
//!
//! Only one write may be pending. The permit is held from submission until
//! the receipt (or the failure) comes back, so a second `buy` or `add_item`
//! fails fast with `TransactionPending`.
//!
//! A write captures the [`Connection`] it was submitted through. When the
//! account or chain changes before it confirms, the result is still returned
//! to the caller but never applied to the new session.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefront::app::Storefront;
//! use storefront::config::init_config;
//! use storefront::core::service::WalletProvider;
//! use storefront::services::rpc::JsonRpcWallet;
//!
//! # async fn run() -> storefront::core::error::Result<()> {
//! let config = init_config()?;
//! let provider: Arc<dyn WalletProvider> = Arc::new(JsonRpcWallet::new(config.rpc_url.clone()));
//! let storefront = Arc::new(Storefront::from_config(Some(provider), config));
//! storefront.spawn_event_pump();
//!
//! storefront.connect().await?;
//! storefront.buy(0).await?;
//! println!("{:?}", storefront.session());
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod lifecycle;
pub mod state;

use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use shared::{item_uid, Item, ItemForm};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::config::{ShopConfig, NETWORK_NAME};
use crate::core::error::{AppError, Result};
use crate::core::service::{TxReceipt, WalletProvider};
use crate::debug::task_tracker::spawn_tracked;
use crate::debug::trace_context::with_trace_id_async;
use crate::services::network_guard::NetworkGuard;
use crate::utils::validation::{parse_item_form, ParsedItemForm};

pub use events::WalletEvent;
pub use lifecycle::{Connection, ConnectionLifecycle, Phase, Update};
pub use state::{ChainSnapshot, ErrorSlot, PendingKind, PendingTransaction, SessionState, SessionStore};

pub struct Storefront {
    lifecycle: ConnectionLifecycle,
    session: SessionStore,
    write_permit: Arc<Semaphore>,
}

impl Storefront {
    /// `provider` is `None` when no wallet is available; every connect attempt
    /// then fails with `ProviderUnavailable`.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, guard: NetworkGuard, contract_address: Address) -> Self {
        Self {
            lifecycle: ConnectionLifecycle::new(provider, guard, contract_address),
            session: SessionStore::new(),
            write_permit: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn from_config(provider: Option<Arc<dyn WalletProvider>>, config: &ShopConfig) -> Self {
        let guard = NetworkGuard::new(config.expected_chain_id.clone(), NETWORK_NAME);
        Self::new(provider, guard, config.contract_address)
    }

    /// Current session snapshot.
    pub fn session(&self) -> Arc<SessionState> {
        self.session.current()
    }

    /// Receive every future session snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.session.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub async fn connect(&self) -> Result<()> {
        with_trace_id_async(|trace_id| async move {
            tracing::info!(trace_id = %trace_id, "Connecting wallet");

            match self.lifecycle.connect().await {
                Ok(update) => self.apply_update(update).await,
                Err(err) => {
                    tracing::warn!(trace_id = %trace_id, error = %err, "Wallet connection failed");
                    self.session
                        .replace(SessionState::default().with_error(ErrorSlot::Network, Some(err.user_message())));
                    Err(err)
                }
            }
        })
        .await
    }

    /// Local reset to disconnected. The wallet keeps its authorisation.
    pub fn disconnect(&self) {
        if let Update::Cleared = self.lifecycle.disconnect() {
            self.session.clear();
        }
    }

    /// Apply an account or chain notification from the wallet.
    pub async fn handle_wallet_event(&self, event: WalletEvent) -> Result<()> {
        let update = self.lifecycle.handle_event(event);
        self.apply_update(update).await
    }

    /// Re-read the catalogue, owner and balance for the connected account.
    pub async fn refresh(&self) -> Result<()> {
        let connection = self.lifecycle.current().ok_or(AppError::NotConnected)?;
        let chain = self.read_chain(&connection).await?;
        self.update_if_current(&connection, |s| s.with_chain(&chain));
        Ok(())
    }

    /// Forward wallet notifications into [`Storefront::handle_wallet_event`]
    /// in emission order. Returns `None` without a provider.
    pub fn spawn_event_pump(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut events = self.lifecycle.provider()?.subscribe();
        let storefront = Arc::clone(self);

        Some(spawn_tracked("wallet_event_pump", async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Err(err) = storefront.handle_wallet_event(event).await {
                            tracing::warn!(error = %err, "Session rebuild after wallet event failed");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Missed notifications may have included a chain change
                        tracing::warn!(skipped, "Wallet events lagged, resetting session");
                        storefront.disconnect();
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Wallet event channel closed");
                        break;
                    }
                }
            }
        }))
    }

    async fn apply_update(&self, update: Update) -> Result<()> {
        match update {
            Update::Unchanged => Ok(()),
            Update::Cleared => {
                self.session.clear();
                Ok(())
            }
            Update::Bound(connection) => {
                self.update_if_current(&connection, |s| {
                    SessionState::for_account(connection.signer, s.form.clone())
                });

                let chain = self.read_chain(&connection).await?;
                self.update_if_current(&connection, |s| {
                    SessionState::project(&chain, connection.signer, s.form.clone())
                });
                tracing::info!(
                    account = %connection.signer,
                    items = chain.items.len(),
                    is_owner = chain.owner == connection.signer,
                    "Session rebuilt"
                );
                Ok(())
            }
        }
    }

    async fn read_chain(&self, connection: &Connection) -> Result<ChainSnapshot> {
        let shop = &connection.shop;
        let read = tokio::try_join!(
            shop.list_items(),
            shop.owner_address(),
            shop.balance_of(connection.signer),
        );

        match read {
            Ok((items, owner, balance)) => Ok(ChainSnapshot { items, owner, balance }),
            Err(err) => Err(self.fail(connection, ErrorSlot::Network, err)),
        }
    }

    /// Buy one copy of the album at `index`, paying its listed price.
    pub async fn buy(&self, index: u64) -> Result<TxReceipt> {
        with_trace_id_async(|trace_id| async move {
            let connection = self.require_connection()?;
            let permit = self.acquire_write_permit(&connection)?;

            let price = self.session.current().item(index).map(|item| item.unit_price);
            let price = match price {
                Some(price) => price,
                None => {
                    let err = AppError::Validation(format!("No album with index {}", index));
                    return Err(self.fail(&connection, ErrorSlot::Transaction, err));
                }
            };

            tracing::info!(trace_id = %trace_id, index, price = %price, "Buying album");

            let write = connection
                .shop
                .buy(index, price)
                .await
                .map_err(|err| self.fail(&connection, ErrorSlot::Transaction, err))?;
            self.track_pending(&connection, write.hash, PendingKind::Buy { index });

            let result = write.confirmed().await;
            let outcome = self.settle(&connection, result, |s| s.with_purchase(index)).await;
            drop(permit);
            outcome
        })
        .await
    }

    /// Add an album from the owner form.
    ///
    /// Blank fields fail with `IncompleteForm` and unparsable ones with
    /// `Validation`, both before any provider call.
    pub async fn add_item(&self, form: ItemForm) -> Result<TxReceipt> {
        with_trace_id_async(|trace_id| async move {
            let connection = self.require_connection()?;
            let ParsedItemForm { title, price, quantity } =
                parse_item_form(&form).map_err(|err| self.fail(&connection, ErrorSlot::Transaction, err))?;
            let permit = self.acquire_write_permit(&connection)?;

            let uid = item_uid(&title);
            tracing::info!(trace_id = %trace_id, title = %title, uid = %uid, price = %price, "Adding album");

            let index = connection
                .shop
                .current_index()
                .await
                .map_err(|err| self.fail(&connection, ErrorSlot::Transaction, err))?;
            let write = connection
                .shop
                .add_item(uid, &title, price, quantity)
                .await
                .map_err(|err| self.fail(&connection, ErrorSlot::Transaction, err))?;
            self.track_pending(&connection, write.hash, PendingKind::AddItem { title: title.clone() });

            let item = Item {
                index,
                uid,
                title,
                unit_price: price,
                quantity_available: quantity,
            };
            let result = write.confirmed().await;
            let outcome = self.settle(&connection, result, |s| s.with_added(item)).await;
            drop(permit);
            outcome
        })
        .await
    }

    fn require_connection(&self) -> Result<Arc<Connection>> {
        self.lifecycle.current().ok_or_else(|| {
            let err = AppError::NotConnected;
            self.session
                .update(|s| s.with_error(ErrorSlot::Transaction, Some(err.user_message())));
            err
        })
    }

    fn acquire_write_permit(&self, connection: &Connection) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.write_permit).try_acquire_owned().map_err(|_| {
            tracing::warn!("Write rejected, another transaction is pending");
            self.fail(connection, ErrorSlot::Transaction, AppError::TransactionPending)
        })
    }

    fn track_pending(&self, connection: &Connection, hash: TxHash, kind: PendingKind) {
        self.update_if_current(connection, |s| {
            s.with_pending(Some(PendingTransaction::new(hash, kind)))
                .with_error(ErrorSlot::Transaction, None)
        });
    }

    /// Apply a confirmed write's local patch, or record its failure.
    async fn settle<F>(&self, connection: &Connection, result: Result<TxReceipt>, patch: F) -> Result<TxReceipt>
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        if !self.lifecycle.is_current(connection) {
            tracing::info!(
                generation = connection.generation,
                "Write resolved after the connection changed, not applying"
            );
            return result;
        }

        match result {
            Ok(receipt) => {
                self.update_if_current(connection, |s| patch(s).with_pending(None));

                match connection.shop.balance_of(connection.signer).await {
                    Ok(balance) => self.update_if_current(connection, |s| s.with_balance(balance)),
                    Err(err) => tracing::warn!(error = %err, "Balance refresh after write failed"),
                }
                Ok(receipt)
            }
            Err(err) => {
                self.update_if_current(connection, |s| {
                    s.with_pending(None)
                        .with_error(ErrorSlot::Transaction, Some(err.user_message()))
                });
                Err(err)
            }
        }
    }

    pub fn set_form(&self, form: ItemForm) {
        self.session.update(|s| s.with_form(form));
    }

    pub fn dismiss_network_error(&self) {
        self.session.update(|s| s.with_error(ErrorSlot::Network, None));
    }

    pub fn dismiss_transaction_error(&self) {
        self.session.update(|s| s.with_error(ErrorSlot::Transaction, None));
    }

    /// Record `err` in the session if `connection` is still bound, and hand it back.
    fn fail(&self, connection: &Connection, slot: ErrorSlot, err: AppError) -> AppError {
        let message = err.user_message();
        self.update_if_current(connection, |s| s.with_error(slot, Some(message)));
        err
    }

    fn update_if_current<F>(&self, connection: &Connection, f: F)
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        self.session.update(|s| {
            if self.lifecycle.is_current(connection) {
                f(s)
            } else {
                s.clone()
            }
        });
    }
}
