//! # Services Module
//!
//! Integrations with the wallet provider and the `MusicShop` contract.
//!
//! ## Module Overview
//!
//! ```text
//! services/
//! ├── rpc.rs            - JsonRpcWallet: WalletProvider over HTTP JSON-RPC
//! ├── network_guard.rs  - NetworkGuard: expected-chain check before connecting
//! └── contract.rs       - ShopContract: typed MusicShop reads and writes
//! ```
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   Storefront (app)                      │
//! │                                                         │
//! │  ┌──────────────────┐       ┌──────────────────┐       │
//! │  │  NetworkGuard    │       │  ShopContract    │       │
//! │  └────────┬─────────┘       └────────┬─────────┘       │
//! │           │      dyn WalletProvider  │                 │
//! │           └────────────┬─────────────┘                 │
//! └────────────────────────┼───────────────────────────────┘
//!                          │ JSON-RPC (eth_chainId, eth_call,
//!                          │ eth_sendTransaction, ...)
//!                          ▼
//!              ┌─────────────────────────┐
//!              │  Wallet / EVM node      │
//!              │  MusicShop contract     │
//!              └─────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! The provider returns [`crate::core::RpcError`]. It is converted into
//! `AppError::RemoteCallFailure` at the contract facade, which keeps the most
//! specific message the payload carries.
//!
//! ## Thread Safety
//!
//! `JsonRpcWallet` wraps a `reqwest::Client` and is shared as
//! `Arc<dyn WalletProvider>`. `ShopContract` is a cheap clone holding that
//! `Arc`. `NetworkGuard` is plain data.

pub mod contract;
pub mod network_guard;
pub mod rpc;

pub use contract::{IMusicShop, ShopContract, SubmittedWrite};
pub use network_guard::{ChainId, GuardOutcome, NetworkGuard};
pub use rpc::JsonRpcWallet;
