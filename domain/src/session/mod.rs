//! Agent request messages

pub mod entities;

pub use entities::{Message, Role, split_system};
