//! QueryGraph CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `querygraph` binary.

pub mod cli;
pub mod input;
pub mod logging;
pub mod output;
pub mod schema;
#[cfg(feature = "serve")]
pub mod server;

// Re-export commonly used types
pub use cli::Args;
