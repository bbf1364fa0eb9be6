//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Walk paged REST endpoints from the command line
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL for relative paths (overrides the config file)
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Log level
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level requested on the command line
    pub fn log_level(&self) -> LogLevel {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level,
            (None, true) => LogLevel::Debug,
            (None, false) => LogLevel::Info,
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print items from the starting page onward
    List {
        /// Resource path (relative to the base URL, or absolute)
        path: String,

        /// Paging options
        #[command(flatten)]
        query: PageArgs,

        /// Stop after this many items
        #[arg(long)]
        max_items: Option<usize>,
    },

    /// Print one page and its pagination
    Page {
        /// Resource path (relative to the base URL, or absolute)
        path: String,

        /// Paging options
        #[command(flatten)]
        query: PageArgs,
    },

    /// Fetch one response and print its message and data
    Get {
        /// Resource path (relative to the base URL, or absolute)
        path: String,

        /// Query parameter (key=value, repeatable)
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
}

impl Commands {
    /// Subcommand name, for error reporting
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Page { .. } => "page",
            Self::Get { .. } => "get",
        }
    }
}

/// Paging options shared by `list` and `page`
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Page to start from
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page (1-500)
    #[arg(long)]
    pub items_per_page: Option<u32>,

    /// Query parameter (key=value, repeatable)
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `key=value` argument
fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{arg}'")),
    }
}
