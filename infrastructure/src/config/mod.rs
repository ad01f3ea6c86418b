//! Configuration file loading for udc
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `UDC_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./udc.toml` or `./.udc.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/udc/config.toml`
//! 5. Default values
//!
//! Prompt templates are loaded separately from YAML by [`PromptSetLoader`].

mod error;
mod file_config;
mod loader;
mod prompts;

pub use error::ConfigLoadError;
pub use file_config::{
    FileAgentConfig, FileAgentsConfig, FileConfig, FileDefaults, FileOutputConfig,
    FileProviderConfig, FileRunLogConfig, FileSettings, RunConfig,
};
pub use loader::ConfigLoader;
pub use prompts::PromptSetLoader;
