//! qs watch - Periodic sync until interrupted

use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::app::{self, AppContext};
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;
use crate::sync::SyncScheduler;

use super::sync::observer_for;

#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Seconds between sync cycles (default: sync.interval_secs)
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    pub cycles: Option<u64>,
}

pub fn run(ctx: &AppContext, args: &WatchArgs) -> Result<()> {
    let interval = args.interval.unwrap_or(ctx.config.sync.interval_secs).max(1);
    let coordinator = ctx.coordinator(observer_for(ctx))?;
    let scheduler =
        SyncScheduler::new(Duration::from_secs(interval)).with_max_cycles(args.cycles);

    let summary = app::runtime()?.block_on(scheduler.run(&coordinator, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping watch");
        } else {
            std::future::pending::<()>().await;
        }
    }));

    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "watch": summary,
        }))
    } else {
        let mut layout = HumanLayout::for_format(ctx.output_format);
        layout
            .title("Watch stopped")
            .kv("Cycles", &summary.cycles.to_string())
            .kv("Merged", &summary.merged.to_string())
            .kv("Conflicts", &summary.conflicts.to_string())
            .kv("Failures", &summary.failures.to_string());
        emit_human(layout);
        Ok(())
    }
}
