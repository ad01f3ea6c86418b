//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: load-time configuration and credential errors

pub mod error;
