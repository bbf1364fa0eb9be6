//! CLI module
//!
//! Command-line interface for walking paged endpoints.
//!
//! # Commands
//!
//! - `list` - Print every item from a starting page onward, one JSON value per line
//! - `page` - Print a single page together with its pagination block
//! - `get` - Fetch and decode one response without pagination parameters

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, PageArgs};
pub use runner::Runner;
