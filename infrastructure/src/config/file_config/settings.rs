//! Run settings from TOML (`[settings]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use udc_application::{CallSettings, Settings};

/// Raw settings from TOML
///
/// # Example
///
/// ```toml
/// [settings]
/// max_attempts = 3
/// parallel_agents = false
/// max_parallel_workers = 3
/// max_concurrent_documents = 1
/// api_timeout_secs = 600
/// api_retry_attempts = 3
/// api_retry_backoff_secs = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub max_attempts: usize,
    pub parallel_agents: bool,
    pub max_parallel_workers: usize,
    pub max_concurrent_documents: usize,
    pub api_timeout_secs: u64,
    /// Total HTTP attempts per agent call
    pub api_retry_attempts: u32,
    pub api_retry_backoff_secs: u64,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            parallel_agents: false,
            max_parallel_workers: 3,
            max_concurrent_documents: 1,
            api_timeout_secs: 600,
            api_retry_attempts: 3,
            api_retry_backoff_secs: 2,
        }
    }
}

impl FileSettings {
    pub fn to_settings(&self) -> Settings {
        Settings {
            max_attempts: self.max_attempts,
            parallel_agents: self.parallel_agents,
            max_parallel_workers: self.max_parallel_workers,
            max_concurrent_documents: self.max_concurrent_documents,
            call: CallSettings {
                timeout: Duration::from_secs(self.api_timeout_secs),
                retry_attempts: self.api_retry_attempts,
                retry_backoff: Duration::from_secs(self.api_retry_backoff_secs),
            },
        }
    }
}
