//! Run settings: pipeline loop and dispatch control.
//!
//! [`Settings`] is passed explicitly into every run, so concurrent runs with
//! different settings never interfere. There is no ambient global state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider call parameters applied by the agent gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total HTTP attempts per agent call (1 = no adapter-level retry).
    pub retry_attempts: u32,
    /// Backoff before the first adapter-level retry; doubles per retry.
    pub retry_backoff: Duration,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            retry_attempts: 3,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// Pipeline control parameters.
///
/// | Field | Used by |
/// |-------|---------|
/// | `max_attempts` | conversion retry loop |
/// | `parallel_agents`, `max_parallel_workers` | gate evaluation |
/// | `max_concurrent_documents` | batch runs |
/// | `call` | agent gateway |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum Converting→Validating cycles. 0 and 1 both mean a single attempt.
    pub max_attempts: usize,
    /// Dispatch panel members concurrently.
    pub parallel_agents: bool,
    /// Panel members in flight at once when `parallel_agents` is set.
    pub max_parallel_workers: usize,
    /// Documents converted at once by a batch run.
    pub max_concurrent_documents: usize,
    pub call: CallSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            parallel_agents: false,
            max_parallel_workers: 3,
            max_concurrent_documents: 1,
            call: CallSettings::default(),
        }
    }
}

impl Settings {
    /// Attempts the controller actually performs (at least one).
    pub fn effective_max_attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    /// Panel members dispatched together, before the early-exit bound.
    pub fn dispatch_width(&self) -> usize {
        if self.parallel_agents {
            self.max_parallel_workers.max(1)
        } else {
            1
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_parallel_agents(mut self, parallel: bool) -> Self {
        self.parallel_agents = parallel;
        self
    }

    pub fn with_max_parallel_workers(mut self, workers: usize) -> Self {
        self.max_parallel_workers = workers;
        self
    }

    pub fn with_max_concurrent_documents(mut self, documents: usize) -> Self {
        self.max_concurrent_documents = documents;
        self
    }

    pub fn with_call(mut self, call: CallSettings) -> Self {
        self.call = call;
        self
    }
}
