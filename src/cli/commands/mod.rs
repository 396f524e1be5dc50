//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod add;
pub mod clear;
pub mod filter;
pub mod list;
pub mod show;
pub mod sync;
pub mod transfer;
pub mod watch;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Show(args) => show::run(ctx, args),
        Commands::Add(args) => add::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Categories => list::categories(ctx),
        Commands::Filter(args) => filter::run(ctx, args),
        Commands::Import(args) => transfer::import(ctx, args),
        Commands::Export(args) => transfer::export(ctx, args),
        Commands::Clear(args) => clear::run(ctx, args),
        Commands::Sync => sync::run(ctx),
        Commands::Resolve(args) => sync::resolve(ctx, args),
        Commands::Status => sync::status(ctx),
        Commands::Watch(args) => watch::run(ctx, args),
    }
}
