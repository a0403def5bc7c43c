//! # Connection Lifecycle
//!
//! Wallet connection as an explicit state machine.
//!
//! ```text
//!                 ConnectRequested             GuardPassed
//!  Disconnected ───────────────────▶ Connecting ──────────▶ Connecting
//!       ▲                                │                  (accounts)
//!       │  GuardFailed / ConnectFailed   │                      │
//!       ├────────────────────────────────┘                      │ AccountsResolved(Some)
//!       │                                                       ▼
//!       │  ChainChanged / AccountsChanged(None) / Disconnect   Connected{account}
//!       └──────────────────────────────────────────────────────┘   │  ▲
//!                                                                  └──┘ AccountsChanged(Some)
//! ```
//!
//! [`transition`] is pure: it maps a phase and an input to the next phase and
//! a single [`Effect`]. [`ConnectionLifecycle`] owns the phase, performs the
//! provider I/O the effects call for, and binds [`Connection`]s.
//!
//! Every bind, clear and new connect attempt advances an epoch counter.
//! Results of an attempt or a write that started under an older epoch are
//! dropped instead of applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::RwLock;

use crate::app::events::WalletEvent;
use crate::core::error::{AppError, Result};
use crate::core::service::WalletProvider;
use crate::services::contract::ShopContract;
use crate::services::network_guard::{GuardOutcome, NetworkGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected { account: Address },
}

/// Everything that can move the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    ConnectRequested,
    GuardPassed,
    GuardFailed,
    AccountsResolved(Option<Address>),
    /// Provider error while connecting
    ConnectFailed,
    Wallet(WalletEvent),
    DisconnectRequested,
}

/// Work the lifecycle must carry out after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    CheckNetwork,
    RequestAccounts,
    /// Bind a new connection for the account
    Bind(Address),
    /// Drop the connection and reset the session
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub next: Phase,
    pub effect: Effect,
}

impl Step {
    fn to(next: Phase, effect: Effect) -> Self {
        Self { next, effect }
    }

    fn stay(phase: &Phase) -> Self {
        Self::to(*phase, Effect::None)
    }
}

/// Pure transition function of the connection lifecycle.
pub fn transition(phase: &Phase, input: Input) -> Step {
    use Phase::*;

    match (phase, input) {
        // Chain changes and explicit disconnects reset from any phase
        (_, Input::Wallet(WalletEvent::ChainChanged(_))) | (_, Input::DisconnectRequested) => {
            Step::to(Disconnected, Effect::Clear)
        }
        (_, Input::Wallet(WalletEvent::AccountsChanged(None))) => Step::to(Disconnected, Effect::Clear),

        (Disconnected, Input::ConnectRequested) => Step::to(Connecting, Effect::CheckNetwork),
        (Connecting, Input::GuardPassed) => Step::to(Connecting, Effect::RequestAccounts),
        (Connecting, Input::GuardFailed) | (Connecting, Input::ConnectFailed) => {
            Step::to(Disconnected, Effect::Clear)
        }
        (Connecting, Input::AccountsResolved(Some(account))) => {
            Step::to(Connected { account }, Effect::Bind(account))
        }
        (Connecting, Input::AccountsResolved(None)) => Step::to(Disconnected, Effect::Clear),

        (Connected { account }, Input::Wallet(WalletEvent::AccountsChanged(Some(next))))
            if *account != next =>
        {
            Step::to(Connected { account: next }, Effect::Bind(next))
        }

        // Already connected, a connect in flight, or a stale result
        (phase, _) => Step::stay(phase),
    }
}

/// Signer and contract handle for one bound account.
///
/// Valid only while it is the lifecycle's current connection.
#[derive(Debug)]
pub struct Connection {
    pub generation: u64,
    pub signer: Address,
    pub shop: ShopContract,
}

/// What a lifecycle call changed.
#[derive(Debug, Clone)]
pub enum Update {
    Unchanged,
    Bound(Arc<Connection>),
    Cleared,
}

pub struct ConnectionLifecycle {
    provider: Option<Arc<dyn WalletProvider>>,
    guard: NetworkGuard,
    contract_address: Address,
    phase: RwLock<Phase>,
    current: RwLock<Option<Arc<Connection>>>,
    epoch: AtomicU64,
}

impl ConnectionLifecycle {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, guard: NetworkGuard, contract_address: Address) -> Self {
        Self {
            provider,
            guard,
            contract_address,
            phase: RwLock::new(Phase::Disconnected),
            current: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn current(&self) -> Option<Arc<Connection>> {
        self.current.read().clone()
    }

    /// Whether `connection` is still the one bound.
    pub fn is_current(&self, connection: &Connection) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|c| c.generation == connection.generation)
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Run `input` through [`transition`] and apply the synchronous part of
    /// its effect. With `attempt` set, the input is dropped if the epoch has
    /// moved on since that attempt started.
    fn apply(&self, attempt: Option<u64>, input: Input) -> (Effect, Update) {
        let mut phase = self.phase.write();

        if attempt.is_some_and(|epoch| epoch != self.epoch()) {
            tracing::debug!(?input, "Dropping result of a superseded connect attempt");
            return (Effect::None, Update::Unchanged);
        }

        let from = *phase;
        let step = transition(&from, input);
        if from != step.next {
            tracing::info!(?from, to = ?step.next, effect = ?step.effect, "Connection lifecycle transition");
        }
        *phase = step.next;

        let update = match step.effect {
            Effect::CheckNetwork => {
                self.epoch.fetch_add(1, Ordering::SeqCst);
                Update::Unchanged
            }
            Effect::Clear => {
                self.epoch.fetch_add(1, Ordering::SeqCst);
                self.current.write().take();
                Update::Cleared
            }
            Effect::Bind(account) => match self.provider.clone() {
                Some(provider) => {
                    let generation = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
                    let shop = ShopContract::new(provider, self.contract_address, account);
                    let connection = Arc::new(Connection {
                        generation,
                        signer: account,
                        shop,
                    });
                    *self.current.write() = Some(Arc::clone(&connection));
                    tracing::info!(account = %account, generation, "Wallet bound");
                    Update::Bound(connection)
                }
                None => {
                    *phase = Phase::Disconnected;
                    Update::Cleared
                }
            },
            Effect::None | Effect::RequestAccounts => Update::Unchanged,
        };

        (step.effect, update)
    }

    /// Connect to the wallet: check the network, request accounts, bind the first one.
    ///
    /// Returns `Update::Unchanged` when already connected, when another
    /// connect is in flight, or when this attempt was superseded by a wallet
    /// event.
    pub async fn connect(&self) -> Result<Update> {
        let provider = self.provider.clone().ok_or(AppError::ProviderUnavailable)?;

        let (effect, _) = self.apply(None, Input::ConnectRequested);
        if effect != Effect::CheckNetwork {
            return Ok(Update::Unchanged);
        }
        let attempt = self.epoch();

        let outcome = match self.guard.check(provider.as_ref()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                return match self.apply(Some(attempt), Input::ConnectFailed) {
                    (Effect::Clear, _) => Err(err),
                    _ => Ok(Update::Unchanged),
                };
            }
        };

        if let GuardOutcome::Mismatch { remediation, .. } = outcome {
            let (effect, _) = self.apply(Some(attempt), Input::GuardFailed);
            if effect == Effect::None {
                return Ok(Update::Unchanged);
            }
            return Err(AppError::NetworkMismatch(remediation));
        }

        let (effect, _) = self.apply(Some(attempt), Input::GuardPassed);
        if effect != Effect::RequestAccounts {
            return Ok(Update::Unchanged);
        }

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                tracing::warn!(code = err.code, error = %err.message, "Account request rejected");
                return match self.apply(Some(attempt), Input::ConnectFailed) {
                    (Effect::Clear, _) => Err(err.into()),
                    _ => Ok(Update::Unchanged),
                };
            }
        };

        let account = accounts.first().copied();
        let (effect, update) = self.apply(Some(attempt), Input::AccountsResolved(account));
        match (effect, account) {
            (Effect::Clear, None) => Err(AppError::RemoteCallFailure(
                "Wallet returned no accounts".to_string(),
            )),
            _ => Ok(update),
        }
    }

    /// Apply a wallet notification.
    pub fn handle_event(&self, event: WalletEvent) -> Update {
        tracing::debug!(event = event.kind(), "Wallet event received");
        self.apply(None, Input::Wallet(event)).1
    }

    /// Local reset. The wallet itself stays authorised.
    pub fn disconnect(&self) -> Update {
        self.apply(None, Input::DisconnectRequested).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{MockWallet, BUYER, HARDHAT_CHAIN, OWNER, SHOP};
    use crate::services::network_guard::ChainId;

    fn lifecycle(mock: &Arc<MockWallet>) -> ConnectionLifecycle {
        ConnectionLifecycle::new(
            Some(mock.clone() as Arc<dyn WalletProvider>),
            NetworkGuard::new(ChainId::new(HARDHAT_CHAIN), "localhost Hardhat network"),
            SHOP,
        )
    }

    fn connected(account: Address) -> Phase {
        Phase::Connected { account }
    }

    #[test]
    fn test_transition_connect_path() {
        let step = transition(&Phase::Disconnected, Input::ConnectRequested);
        assert_eq!(step, Step::to(Phase::Connecting, Effect::CheckNetwork));

        let step = transition(&Phase::Connecting, Input::GuardPassed);
        assert_eq!(step.effect, Effect::RequestAccounts);

        let step = transition(&Phase::Connecting, Input::AccountsResolved(Some(OWNER)));
        assert_eq!(step, Step::to(connected(OWNER), Effect::Bind(OWNER)));
    }

    #[test]
    fn test_transition_guard_failure_never_requests_accounts() {
        let step = transition(&Phase::Connecting, Input::GuardFailed);
        assert_eq!(step, Step::to(Phase::Disconnected, Effect::Clear));
    }

    #[test]
    fn test_transition_resets_from_every_phase() {
        for phase in [Phase::Disconnected, Phase::Connecting, connected(OWNER)] {
            let step = transition(&phase, Input::Wallet(WalletEvent::ChainChanged("0x1".into())));
            assert_eq!(step, Step::to(Phase::Disconnected, Effect::Clear));

            let step = transition(&phase, Input::Wallet(WalletEvent::AccountsChanged(None)));
            assert_eq!(step, Step::to(Phase::Disconnected, Effect::Clear));

            let step = transition(&phase, Input::DisconnectRequested);
            assert_eq!(step.effect, Effect::Clear);
        }
    }

    #[test]
    fn test_transition_account_switch_rebinds() {
        let step = transition(&connected(OWNER), Input::Wallet(WalletEvent::AccountsChanged(Some(BUYER))));
        assert_eq!(step, Step::to(connected(BUYER), Effect::Bind(BUYER)));

        let step = transition(&connected(OWNER), Input::Wallet(WalletEvent::AccountsChanged(Some(OWNER))));
        assert_eq!(step.effect, Effect::None);
    }

    #[test]
    fn test_transition_ignores_stale_inputs() {
        assert_eq!(transition(&Phase::Disconnected, Input::GuardPassed).effect, Effect::None);
        assert_eq!(
            transition(&Phase::Disconnected, Input::AccountsResolved(Some(OWNER))).effect,
            Effect::None
        );
        assert_eq!(transition(&connected(OWNER), Input::ConnectRequested).effect, Effect::None);
        assert_eq!(transition(&Phase::Connecting, Input::ConnectRequested).effect, Effect::None);
    }

    #[tokio::test]
    async fn test_connect_binds_first_account() {
        let mock = MockWallet::new();
        mock.set_accounts(vec![BUYER, OWNER]);
        let lifecycle = lifecycle(&mock);

        let update = lifecycle.connect().await.unwrap();

        let Update::Bound(connection) = update else {
            panic!("expected a bound connection");
        };
        assert_eq!(connection.signer, BUYER);
        assert_eq!(connection.shop.address(), SHOP);
        assert_eq!(lifecycle.phase(), connected(BUYER));
        assert!(lifecycle.is_current(&connection));
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let lifecycle = ConnectionLifecycle::new(
            None,
            NetworkGuard::new(ChainId::new(HARDHAT_CHAIN), "localhost Hardhat network"),
            SHOP,
        );
        assert_eq!(lifecycle.connect().await.unwrap_err(), AppError::ProviderUnavailable);
        assert_eq!(lifecycle.phase(), Phase::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_on_wrong_chain() {
        let mock = MockWallet::new();
        mock.set_chain_id("0x1");
        let lifecycle = lifecycle(&mock);

        let err = lifecycle.connect().await.unwrap_err();

        assert!(matches!(err, AppError::NetworkMismatch(ref msg) if !msg.is_empty()));
        assert_eq!(lifecycle.phase(), Phase::Disconnected);
        assert_eq!(MockWallet::count(&mock.calls.request_accounts), 0);
    }

    #[tokio::test]
    async fn test_connect_with_no_accounts() {
        let mock = MockWallet::new();
        mock.set_accounts(vec![]);
        let lifecycle = lifecycle(&mock);

        let err = lifecycle.connect().await.unwrap_err();
        assert!(matches!(err, AppError::RemoteCallFailure(_)));
        assert_eq!(lifecycle.phase(), Phase::Disconnected);
        assert!(lifecycle.current().is_none());
    }

    #[tokio::test]
    async fn test_account_switch_advances_generation() {
        let mock = MockWallet::new();
        let lifecycle = lifecycle(&mock);
        let Update::Bound(first) = lifecycle.connect().await.unwrap() else {
            panic!("expected a bound connection");
        };

        let Update::Bound(second) = lifecycle.handle_event(WalletEvent::AccountsChanged(Some(BUYER))) else {
            panic!("expected a rebind");
        };

        assert!(second.generation > first.generation);
        assert!(!lifecycle.is_current(&first));
        assert!(lifecycle.is_current(&second));
    }

    #[tokio::test]
    async fn test_chain_change_clears_connection() {
        let mock = MockWallet::new();
        let lifecycle = lifecycle(&mock);
        lifecycle.connect().await.unwrap();

        assert!(matches!(
            lifecycle.handle_event(WalletEvent::ChainChanged("0x1".into())),
            Update::Cleared
        ));
        assert!(lifecycle.current().is_none());
        assert_eq!(lifecycle.phase(), Phase::Disconnected);
    }

    #[tokio::test]
    async fn test_second_connect_is_a_no_op() {
        let mock = MockWallet::new();
        let lifecycle = lifecycle(&mock);
        lifecycle.connect().await.unwrap();

        assert!(matches!(lifecycle.connect().await.unwrap(), Update::Unchanged));
        assert_eq!(MockWallet::count(&mock.calls.request_accounts), 1);
    }
}
