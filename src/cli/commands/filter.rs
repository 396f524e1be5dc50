//! qs filter - Show or set the saved category filter

use clap::Args;
use tracing::warn;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::core::CategoryFilter;
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Category to select, or "all"; omit to print the current filter
    pub category: Option<CategoryFilter>,
}

pub fn run(ctx: &AppContext, args: &FilterArgs) -> Result<()> {
    let book = ctx.book();
    let filter = match &args.category {
        Some(filter) => {
            if let CategoryFilter::Category(name) = filter {
                if !book.categories()?.contains(name) {
                    warn!(category = %name, "filter names a category with no quotes");
                }
            }
            book.set_filter(filter)?;
            filter.clone()
        }
        None => book.filter()?,
    };

    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "filter": filter,
            "changed": args.category.is_some(),
        }))
    } else {
        println!("Filter: {filter}");
        Ok(())
    }
}
