//! qs clear - Remove every quote

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct ClearArgs {
    /// Confirm removal
    #[arg(long, short)]
    pub yes: bool,
}

pub fn run(ctx: &AppContext, args: &ClearArgs) -> Result<()> {
    if !args.yes {
        let count = ctx.book().quotes()?.len();
        if ctx.robot_mode {
            return emit_json(&serde_json::json!({
                "status": "ok",
                "cleared": false,
                "quotes": count,
            }));
        }
        println!("This would remove {count} quotes. Re-run with --yes to confirm.");
        return Ok(());
    }

    let removed = ctx.book().clear()?;
    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "cleared": true,
            "removed": removed,
        }))
    } else {
        println!("All quotes cleared ({removed} removed).");
        Ok(())
    }
}
