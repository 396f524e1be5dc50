//! qs list / qs categories

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json, emit_jsonl, emit_tsv};
use crate::core::CategoryFilter;
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only quotes in this category
    #[arg(long, short)]
    pub category: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let filter = args
        .category
        .as_deref()
        .map(|c| CategoryFilter::from(c.to_string()))
        .unwrap_or_default();
    let quotes: Vec<_> = ctx
        .book()
        .quotes()?
        .into_iter()
        .filter(|q| q.matches(&filter))
        .collect();

    match ctx.output_format {
        OutputFormat::Json => emit_json(&serde_json::json!({
            "status": "ok",
            "count": quotes.len(),
            "quotes": quotes,
        })),
        OutputFormat::Jsonl => emit_jsonl(&quotes),
        OutputFormat::Tsv => {
            emit_tsv(&["category", "text"], &quotes, |q| {
                vec![q.category.clone(), q.text.clone()]
            });
            Ok(())
        }
        OutputFormat::Plain => {
            for quote in &quotes {
                println!("{}\t{}", quote.category, quote.text);
            }
            Ok(())
        }
        OutputFormat::Human => {
            if quotes.is_empty() {
                println!("No quotes.");
                return Ok(());
            }
            for (idx, quote) in quotes.iter().enumerate() {
                println!(
                    "{:>3}. {} {}",
                    idx + 1,
                    quote.text,
                    format!("[{}]", quote.category).dimmed()
                );
            }
            Ok(())
        }
    }
}

pub fn categories(ctx: &AppContext) -> Result<()> {
    let categories = ctx.book().categories()?;
    let names: Vec<&str> = categories.iter().collect();

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "categories": names,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Categories");
    if names.is_empty() {
        layout.push_line("(none)");
    }
    for name in names {
        layout.bullet(name);
    }
    emit_human(layout);
    Ok(())
}
