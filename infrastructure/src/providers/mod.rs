//! Provider adapter: HTTP delivery of agent calls
//!
//! One module per request format builds the body and reads the reply
//! envelope; [`HttpAgentGateway`] picks the format from the agent's provider.

mod anthropic;
mod gateway;
mod google;
mod openai;
pub mod retry;

pub use gateway::HttpAgentGateway;
pub use retry::{RetryConfig, RetryPolicy};
