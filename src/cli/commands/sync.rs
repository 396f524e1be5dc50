//! qs sync / qs resolve / qs status

use std::sync::Arc;

use clap::Args;
use console::style;

use crate::app::{self, AppContext};
use crate::cli::output::{HumanLayout, emit_human, emit_json, format_time};
use crate::error::Result;
use crate::sync::engine::resolve_pending;
use crate::sync::{
    ConflictChoice, SyncEvent, SyncObserver, SyncOutcome, SyncReport, SyncStatus,
    TracingObserver,
};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Which side to keep
    #[arg(value_enum)]
    pub choice: ConflictChoice,
}

/// Prints sync notifications to stderr as a status line.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn on_event(&self, event: &SyncEvent) {
        let message = event.message();
        let line = match event {
            SyncEvent::ConflictDetected { .. } | SyncEvent::ConflictRefreshed { .. } => {
                style(message).yellow().bold().to_string()
            }
            SyncEvent::PushFailed { .. } | SyncEvent::CycleFailed { .. } => {
                style(message).red().to_string()
            }
            _ => style(message).dim().to_string(),
        };
        eprintln!("{line}");
    }
}

/// Console observer for humans, log-only observer for machine output.
pub fn observer_for(ctx: &AppContext) -> Arc<dyn SyncObserver> {
    if ctx.robot_mode {
        Arc::new(TracingObserver)
    } else {
        Arc::new(ConsoleObserver)
    }
}

pub fn run(ctx: &AppContext) -> Result<()> {
    let coordinator = ctx.coordinator(observer_for(ctx))?;
    let report = app::runtime()?.block_on(coordinator.run_sync_cycle())?;

    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "report": report,
        }))
    } else {
        emit_human(report_layout(ctx, &report));
        Ok(())
    }
}

pub(crate) fn report_layout(ctx: &AppContext, report: &SyncReport) -> HumanLayout {
    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout
        .title("Sync Report")
        .kv("Remote", &report.remote)
        .kv("Outcome", &report.outcome.to_string())
        .kv("Fetched", &report.fetched.to_string())
        .kv("Merged", &report.merged.to_string())
        .kv("Total", &report.total.to_string())
        .kv("Pushed", if report.pushed { "yes" } else { "no" });
    if let Some(err) = &report.push_error {
        layout.kv("Push error", err);
    }
    layout
        .kv("Last sync", &format_time(report.last_sync_time))
        .kv("Duration (ms)", &report.duration_ms.to_string());
    if matches!(
        report.outcome,
        SyncOutcome::Conflict | SyncOutcome::ConflictPending
    ) {
        layout
            .blank()
            .push_line("Local changes conflict with the server. Resolve with:")
            .bullet("qs resolve local   keep local quotes")
            .bullet("qs resolve server  replace local quotes with the server's");
    }
    layout
}

pub fn resolve(ctx: &AppContext, args: &ResolveArgs) -> Result<()> {
    let observer = observer_for(ctx);
    let resolution = resolve_pending(&*ctx.store, &*ctx.clock, &*observer, args.choice)?;

    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "resolution": resolution,
        }))
    } else {
        println!(
            "Conflict resolved using {} data; {} quotes stored.",
            resolution.choice, resolution.quotes
        );
        Ok(())
    }
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let status = SyncStatus::collect(&*ctx.store, ctx.config.remote.url.clone())?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "sync": status,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout
        .title("Sync Status")
        .kv(
            "Remote",
            status.remote.as_deref().unwrap_or("(not configured)"),
        )
        .kv("Quotes", &status.quotes.to_string())
        .kv("Categories", &status.categories.to_string())
        .kv("Last sync", &format_time(status.metadata.last_sync_time))
        .kv("Local modified", &format_time(status.metadata.local_modified_at))
        .kv("Server modified", &format_time(status.metadata.server_modified_at))
        .kv(
            "Unsynced changes",
            if status.local_changes { "yes" } else { "no" },
        );

    if let Some(pending) = &status.pending_conflict {
        layout
            .blank()
            .section("Pending conflict")
            .kv("Server quotes", &pending.server_quotes.to_string())
            .kv("Server modified", &pending.server_modified_at.to_rfc3339())
            .kv("Detected", &pending.detected_at.to_rfc3339());
        if let Some(refreshed) = pending.refreshed_at {
            layout.kv("Refreshed", &refreshed.to_rfc3339());
        }
    }

    emit_human(layout);
    Ok(())
}
