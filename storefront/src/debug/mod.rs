//! # Logging and Tracing Infrastructure
//!
//! File-based structured logging for the storefront client.
//!
//! ## Features
//!
//! - **File-based logging**: Structured logs to `logs/storefront.log` (daily rotation)
//! - **Trace IDs**: One UUID per user action, attached to its log lines
//! - **Async task tracking**: Named, timed background tasks (the wallet event pump)
//! - **Panic hook**: Panics are logged with location and trace ID
//!
//! ## Usage
//!
//! ```rust,no_run
//! use storefront::debug;
//!
//! // Initialize at startup and keep the guard alive
//! let _log_guard = debug::init();
//!
//! tracing::info!(index = 5, "Buying album");
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (e.g., `storefront=debug,info`)
//! - `STOREFRONT_LOG_DIR`: Log directory (default: `logs`)
//! - `STOREFRONT_LOG_STDERR`: Mirror logs to stderr (1=on, 0=off)

pub mod config;
pub mod logger;
pub mod task_tracker;
pub mod trace_context;

pub use config::DebugConfig;
pub use logger::init as init_logger;
pub use task_tracker::spawn_tracked;
pub use trace_context::{new_trace_id, with_trace_id_async};

/// Initialize the logging system
///
/// Returns the file writer guard; dropping it flushes and stops file logging.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    init_logger()
}
