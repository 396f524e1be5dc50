//! qs show - Display a random quote

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::core::CategoryFilter;
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Category to draw from ("all" for every quote); defaults to the saved filter
    #[arg(long, short)]
    pub category: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let book = ctx.book();
    let filter = match args.category.as_deref() {
        Some(category) => CategoryFilter::from(category.to_string()),
        None => book.filter()?,
    };

    let quote = book.random_quote(&filter, &mut rand::rng())?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "filter": filter,
            "quote": quote,
        }));
    }

    match quote {
        Some(quote) => {
            println!("“{}”", quote.text.bold());
            println!("  - {}", quote.category.cyan());
        }
        None if filter == CategoryFilter::All => {
            println!("No quotes available. Add one with `qs add`.");
        }
        None => println!("No quotes in category \"{filter}\"."),
    }
    Ok(())
}
