//! # Common Error Types
//!
//! Consolidated error handling for the storefront client.
//!
//! ## Error Categories
//!
//! - **ProviderUnavailable**: no wallet provider was injected; fatal to any connect attempt
//! - **NetworkMismatch**: the wallet points at the wrong chain; the user must switch networks
//! - **IncompleteForm**: local form validation, raised before any network call
//! - **RemoteCallFailure**: the node or contract rejected a read or write
//!
//! The remaining variants cover input parsing, the one-pending-write rule and
//! startup configuration.
//!
//! ## Usage Pattern
//!
//! ```rust,no_run
//! use storefront::core::error::{AppError, Result};
//!
//! fn require_title(title: &str) -> Result<()> {
//!     if title.is_empty() {
//!         return Err(AppError::IncompleteForm(vec!["title"]));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Conversion
//!
//! - [`RpcError`] → `AppError::RemoteCallFailure` (message taken from the structured payload)
//! - `reqwest::Error` → [`RpcError`] with the internal error code
//! - `alloy_sol_types::Error` → `AppError::RemoteCallFailure`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// JSON-RPC "internal error" code, used for transport and decoding failures
/// that never reached the node.
pub const INTERNAL_RPC_ERROR: i64 = -32603;

/// Structured error returned by the wallet provider.
///
/// Mirrors the EIP-1193 / JSON-RPC error object. Contract reverts usually carry
/// a more precise explanation in `data.message`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Error raised locally (network failure, malformed response).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_RPC_ERROR, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Message shown to the user: `data.message` when the payload has one,
    /// otherwise the generic message.
    pub fn surface_message(&self) -> String {
        self.data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.message.clone())
    }
}

/// Application-wide error type for the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// No wallet provider is available to connect through.
    #[error("Wallet provider unavailable")]
    ProviderUnavailable,

    /// The wallet is pointed at a chain other than the configured one.
    ///
    /// Carries the remediation message produced by the network guard.
    #[error("Network mismatch: {0}")]
    NetworkMismatch(String),

    /// One or more add-item form fields are blank.
    #[error("Incomplete form, missing: {}", .0.join(", "))]
    IncompleteForm(Vec<&'static str>),

    /// The node or contract rejected a read or write.
    #[error("Remote call failed: {0}")]
    RemoteCallFailure(String),

    /// A form field is present but cannot be parsed (bad price, bad quantity).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An action needs a connected wallet and there is none.
    #[error("Wallet not connected")]
    NotConnected,

    /// A write is already awaiting confirmation.
    #[error("A transaction is already pending")]
    TransactionPending,

    /// Startup configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Text placed into the session's error fields.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ProviderUnavailable => {
                "No wallet provider detected. Please install a browser wallet such as MetaMask".to_string()
            }
            AppError::NetworkMismatch(msg) => msg.clone(),
            AppError::IncompleteForm(_) => "Please fill all fields".to_string(),
            AppError::RemoteCallFailure(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotConnected => "Please connect your wallet first".to_string(),
            AppError::TransactionPending => {
                "Another transaction is still pending. Wait for it to confirm".to_string()
            }
            AppError::Config(_) => "The storefront is misconfigured".to_string(),
        }
    }
}

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<RpcError> for AppError {
    fn from(err: RpcError) -> Self {
        AppError::RemoteCallFailure(err.surface_message())
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RpcError::internal(format!("Failed to parse response: {}", err))
        } else {
            RpcError::internal(format!("Network error: {}", err))
        }
    }
}

impl From<alloy_sol_types::Error> for AppError {
    fn from(err: alloy_sol_types::Error) -> Self {
        AppError::RemoteCallFailure(format!("Failed to decode contract response: {}", err))
    }
}
