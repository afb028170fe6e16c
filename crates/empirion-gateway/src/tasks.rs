//! Tracked task set
//!
//! A [`TaskTracker`] that also keeps an [`AbortHandle`] per spawned task, so
//! whatever is still running at a shutdown deadline can be aborted.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tokio_util::task::TaskTracker;

#[derive(Debug, Clone, Default)]
pub struct TrackedTasks {
    tracker: TaskTracker,
    aborts: Arc<Mutex<Vec<AbortHandle>>>,
}

impl TrackedTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = self.tracker.spawn(future);

        let mut aborts = self.aborts.lock();
        aborts.retain(|abort| !abort.is_finished());
        aborts.push(handle.abort_handle());
        handle
    }

    /// Allow [`wait`](Self::wait) to complete once every task has finished
    pub fn close(&self) {
        self.tracker.close();
    }

    pub async fn wait(&self) {
        self.tracker.wait().await
    }

    /// Wait until every task has finished or `deadline` passes. Returns the
    /// number of tasks still running at the deadline.
    pub async fn wait_until(&self, deadline: Instant) -> usize {
        match tokio::time::timeout_at(deadline, self.tracker.wait()).await {
            Ok(()) => 0,
            Err(_) => self.len(),
        }
    }

    /// Abort every task that has not finished
    pub fn abort_all(&self) {
        for abort in self.aborts.lock().drain(..) {
            abort.abort();
        }
    }

    /// Tasks spawned and not yet finished
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_reports_stragglers() {
        let tasks = TrackedTasks::new();
        tasks.spawn(async {});
        tasks.spawn(std::future::pending::<()>());
        tasks.close();

        let pending = tasks
            .wait_until(Instant::now() + Duration::from_millis(100))
            .await;
        assert_eq!(pending, 1);
    }

    #[tokio::test]
    async fn test_abort_all_ends_stuck_tasks() {
        let tasks = TrackedTasks::new();
        let handle = tasks.spawn(std::future::pending::<()>());
        tasks.close();

        tasks.abort_all();
        assert!(handle.await.unwrap_err().is_cancelled());

        tasks.wait().await;
        assert!(tasks.is_empty());
    }
}
