//! cadlink Command Line Interface
//!
//! Drives the import pipeline against the offline host.

pub mod actions;
pub mod cli;

// Re-exports for convenience
pub use actions::{ActionContext, dispatch_action};
pub use cli::{Cli, Command};
