//! Async task lifecycle tracking for long-lived background tasks

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::task::JoinHandle;

/// Number of tracked tasks currently running
static ACTIVE_TASKS: AtomicU64 = AtomicU64::new(0);
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

/// Decrements the active count even if the task is aborted.
struct ActiveTask {
    name: &'static str,
    task_id: u64,
    start: Instant,
}

impl Drop for ActiveTask {
    fn drop(&mut self) {
        let remaining = ACTIVE_TASKS.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        tracing::info!(
            task = %self.name,
            task_id = self.task_id,
            active = remaining,
            duration_ms = self.start.elapsed().as_millis(),
            "Task finished"
        );
    }
}

/// Spawn an instrumented async task with lifecycle tracking
///
/// # Example
///
/// ```rust,no_run
/// use storefront::debug::spawn_tracked;
///
/// # async fn run() {
/// spawn_tracked("wallet_event_pump", async move {
///     // consume wallet events
/// });
/// # }
/// ```
pub fn spawn_tracked<F>(name: &'static str, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let task_id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
    let active = ACTIVE_TASKS.fetch_add(1, Ordering::Relaxed) + 1;

    tracing::info!(task = %name, task_id = task_id, active, "Task spawned");

    let active = ActiveTask {
        name,
        task_id,
        start: Instant::now(),
    };

    tokio::spawn(async move {
        let _active = active;
        future.await
    })
}
