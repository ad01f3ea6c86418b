//! Infrastructure layer for udc
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP provider adapter, configuration
//! and prompt loading, the JSONL run recorder, and file persistence.

pub mod config;
pub mod logging;
pub mod persistence;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoadError, ConfigLoader, FileAgentConfig, FileConfig, FileOutputConfig,
    FileProviderConfig, FileRunLogConfig, PromptSetLoader, RunConfig,
};
pub use logging::JsonlRunRecorder;
pub use persistence::{
    PersistenceError, discover_documents, read_input_document, save_output, save_run_log,
};
pub use providers::{HttpAgentGateway, RetryConfig, RetryPolicy};
