//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// qs - random quotes with last-writer-wins sync
#[derive(Parser, Debug)]
#[command(name = "qs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true, alias = "machine")]
    pub robot: bool,

    /// Output format (human, json, jsonl, plain, tsv)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/qs/config.toml)
    #[arg(long, global = true, env = "QS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data root holding the quote store (default: platform data dir)
    #[arg(long, global = true, env = "QS_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_args(self.robot, self.output_format)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote
    Show(commands::show::ShowArgs),

    /// Add a quote
    Add(commands::add::AddArgs),

    /// List all quotes
    List(commands::list::ListArgs),

    /// List known categories
    Categories,

    /// Show or set the default category filter
    Filter(commands::filter::FilterArgs),

    /// Import quotes from a JSON file
    Import(commands::transfer::ImportArgs),

    /// Export quotes as JSON
    Export(commands::transfer::ExportArgs),

    /// Remove every quote
    Clear(commands::clear::ClearArgs),

    /// Run one sync cycle against the remote
    Sync,

    /// Resolve a pending sync conflict
    Resolve(commands::sync::ResolveArgs),

    /// Show sync status
    Status,

    /// Sync periodically until interrupted
    Watch(commands::watch::WatchArgs),
}
