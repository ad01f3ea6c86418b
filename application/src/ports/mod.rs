//! Ports (interfaces) for external dependencies
//!
//! Ports define the boundaries between the application and the outside
//! world. Adapters implementing them live in the infrastructure and CLI
//! layers.

pub mod agent_gateway;
pub mod progress;
pub mod run_recorder;
