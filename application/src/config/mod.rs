//! Application-level configuration.
//!
//! - [`Settings`]: retry bound, panel dispatch mode, batch width
//! - [`CallSettings`]: provider call timeout and adapter-level retry

pub mod settings;

pub use settings::{CallSettings, Settings};
