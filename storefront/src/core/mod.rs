//! # Core Abstractions
//!
//! Error types and the wallet-provider trait the rest of the crate is built on.
//!
//! ## Modules
//!
//! - **[`error`]**: Application error types (`AppError`, `RpcError`, `Result<T>`)
//! - **[`service`]**: The [`WalletProvider`] seam plus transaction request/receipt types
//!
//! ## Dependency Injection
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefront::core::service::WalletProvider;
//! use storefront::services::rpc::JsonRpcWallet;
//!
//! // In production: JSON-RPC wallet
//! let provider: Arc<dyn WalletProvider> = Arc::new(JsonRpcWallet::new("http://127.0.0.1:8545"));
//!
//! // In tests: the scripted MockWallet from `core::mock`
//! ```

pub mod error;
pub mod service;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{AppError, Result, RpcError};
pub use service::{TxReceipt, TxRequest, WalletProvider};
