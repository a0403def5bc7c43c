//! Trace ID system for correlating the log lines of one user action
//!
//! Each storefront action (connect, buy, add item) runs under a fresh trace
//! ID so its submission, confirmation and session updates can be found
//! together in the log file.
//!
//! The ID lives on an `action` span that wraps the action's future, so it
//! follows the future across worker threads. Any event logged while the
//! future is polled, including the panic hook's, carries it.

use std::future::Future;

use tracing::Instrument;
use uuid::Uuid;

/// Generate a new trace ID
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Execute an async closure under a new trace ID
///
/// The ID is also handed to the closure for explicit log fields.
pub async fn with_trace_id_async<F, Fut, R>(f: F) -> R
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = R>,
{
    let trace_id = new_trace_id();
    let span = tracing::info_span!("action", trace_id = %trace_id);

    let result = f(trace_id.clone()).instrument(span).await;
    tracing::debug!(trace_id = %trace_id, "Trace context completed");
    result
}
