//! qs add - Add a quote

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Quote text
    pub text: String,

    /// Quote category
    #[arg(long, short)]
    pub category: String,
}

pub fn run(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let quote = ctx.book().add(&args.text, &args.category)?;

    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "added": quote,
        }))
    } else {
        println!("Added {quote}");
        Ok(())
    }
}
