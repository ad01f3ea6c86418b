//! Serialized appends to one run's log.
//!
//! A single mutex guards both the in-memory [`RunLog`] and the forwarding to
//! the [`RunRecorder`], so entries written together (a gate's calls and its
//! verdict) are never interleaved with anything else and reach the recorder
//! in log order.

use crate::ports::run_recorder::RunRecorder;
use std::sync::{Arc, Mutex, MutexGuard};
use udc_domain::{RunLog, RunLogEntry, RunLogEvent};

pub struct RunLogWriter {
    document: String,
    log: Mutex<RunLog>,
    recorder: Arc<dyn RunRecorder>,
}

impl RunLogWriter {
    pub fn new(document: impl Into<String>, recorder: Arc<dyn RunRecorder>) -> Self {
        Self {
            document: document.into(),
            log: Mutex::new(RunLog::new()),
            recorder,
        }
    }

    /// Append one event.
    pub fn append(&self, event: RunLogEvent) {
        self.append_all([event]);
    }

    /// Append `events` as one contiguous group.
    pub fn append_all(&self, events: impl IntoIterator<Item = RunLogEvent>) {
        let mut log = self.lock();
        for event in events {
            let entry = log.push_entry(RunLogEntry::now(event));
            self.recorder.record(&self.document, entry);
        }
    }

    /// Consume the writer and return the finished log.
    pub fn into_log(self) -> RunLog {
        self.log.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, RunLog> {
        // poisoned only if a recorder panicked mid-append
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
