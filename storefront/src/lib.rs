//! # Music Shop Storefront - Library Root
//!
//! Wallet-connected client for the `MusicShop` album contract. This library
//! crate contains all modules used by the binary crate (`main.rs`).
//!
//! ## Features
//!
//! - **Wallet connection**: network check, account request, account and chain change handling
//! - **Catalogue sync**: albums, owner and balance read from the chain into an immutable session snapshot
//! - **Purchases**: `buy(index)` paying the listed price
//! - **Catalogue admin**: `addAlbum` for the contract owner
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              storefront (this crate)                   │
//! ├────────────────────────────────────────────────────────┤
//! │  alloy         - Address/U256 types, sol! ABI          │
//! │  Tokio         - Async runtime, watch/broadcast        │
//! │  Reqwest       - JSON-RPC transport                     │
//! │  tracing       - Structured file logging                │
//! └────────────────────────────────────────────────────────┘
//!                           │
//!                           │ JSON-RPC
//!                           ▼
//!             ┌─────────────────────────────┐
//!             │  Wallet node (Hardhat)      │
//!             │  MusicShop contract         │
//!             └─────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - **app**: [`app::Storefront`] orchestrator, connection lifecycle, session snapshots
//! - **core**: error types and the [`crate::core::WalletProvider`] trait
//! - **services**: JSON-RPC wallet, network guard, `MusicShop` contract facade
//! - **config**: build-time chain and contract, runtime RPC settings
//! - **debug**: logging, trace IDs, tracked tasks
//! - **utils**: form validation
//!
//! ### Module Dependency Graph
//!
//! ```text
//! main.rs
//!   │
//!   └── app::Storefront
//!       ├── app::lifecycle (transition, Connection)
//!       │   ├── services::network_guard
//!       │   └── services::contract
//!       ├── app::state (SessionState, SessionStore)
//!       └── core::service::WalletProvider
//!           └── services::rpc::JsonRpcWallet
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test -p storefront
//! ```
//!
//! Tests drive the storefront through a scripted wallet (`core::mock`) that
//! counts every provider call.

pub mod app;
pub mod config;
pub mod core;
pub mod debug;
pub mod services;
pub mod utils;

pub use app::{SessionState, Storefront, WalletEvent};
pub use crate::core::{AppError, Result};
