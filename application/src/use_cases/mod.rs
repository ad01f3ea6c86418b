//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod evaluate_gate;
pub mod run_batch;
pub mod run_conversion;
pub(crate) mod run_log_writer;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
