//! Omni Console Library
//!
//! Command-line surface over the omnichannel feed. Exposed as a library so
//! argument parsing and rendering can be exercised in tests.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;

pub use cli::{Cli, Command, FilterArgs};
pub use commands::run;
