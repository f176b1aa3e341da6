//! Deterministic in-memory status query for tests.
//!
//! Lives in the common crate rather than behind `#[cfg(test)]` so sibling
//! crates' unit and integration tests can script poll sequences without
//! network access.

use std::sync::{Arc, Mutex};

use crate::errors::QueryError;
use crate::query::PlatformStatusQuery;
use crate::types::{DeployTarget, PollSnapshot};

/// Scripted [`PlatformStatusQuery`] with FIFO results and call recording.
///
/// Clones share the same script and call log, so a test can keep a handle
/// while the scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct MockStatusQuery {
    scripted_results: Arc<Mutex<Vec<Result<Vec<PollSnapshot>, QueryError>>>>,
    recorded_calls: Arc<Mutex<Vec<DeployTarget>>>,
}

impl MockStatusQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scripted fetch result. Results are consumed FIFO.
    pub fn push_result(&self, result: Result<Vec<PollSnapshot>, QueryError>) {
        let mut guard = self
            .scripted_results
            .lock()
            .expect("scripted_results mutex poisoned");
        guard.push(result);
    }

    /// Script the same successful result for `count` consecutive fetches.
    pub fn push_repeated(&self, snapshots: Vec<PollSnapshot>, count: usize) {
        for _ in 0..count {
            self.push_result(Ok(snapshots.clone()));
        }
    }

    /// Number of fetch calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorded_calls
            .lock()
            .expect("recorded_calls mutex poisoned")
            .len()
    }

    /// Snapshot of every target the mock was queried with.
    #[must_use]
    pub fn calls(&self) -> Vec<DeployTarget> {
        self.recorded_calls
            .lock()
            .expect("recorded_calls mutex poisoned")
            .clone()
    }
}

impl PlatformStatusQuery for MockStatusQuery {
    async fn fetch(&self, target: &DeployTarget) -> Result<Vec<PollSnapshot>, QueryError> {
        self.recorded_calls
            .lock()
            .expect("recorded_calls mutex poisoned")
            .push(target.clone());

        let mut scripted = self
            .scripted_results
            .lock()
            .expect("scripted_results mutex poisoned");
        if scripted.is_empty() {
            return Err(QueryError::Transport {
                message: "mock status query has no scripted results".to_string(),
            });
        }
        scripted.remove(0)
    }
}
