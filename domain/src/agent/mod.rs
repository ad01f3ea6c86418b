//! Agent domain module
//!
//! Agent specifications and the roster the pipeline draws its panels from.

pub mod entities;
pub mod roster;

pub use entities::{AgentId, AgentRole, AgentSpec};
pub use roster::AgentRoster;
