//! qs import / qs export

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file holding an array of {"text", "category"} objects
    pub file: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub fn import(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)?;
    let summary = ctx.book().import_json(&raw)?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "status": "ok",
            "file": args.file,
            "import": summary,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout
        .title("Quotes imported successfully!")
        .kv("Added", &summary.added.to_string())
        .kv("Total", &summary.total.to_string());
    if !summary.new_categories.is_empty() {
        layout.kv("New categories", &summary.new_categories.join(", "));
    }
    emit_human(layout);
    Ok(())
}

pub fn export(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let body = ctx.book().export_json()?;

    let Some(path) = &args.out else {
        println!("{body}");
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{body}\n"))?;

    if ctx.robot_mode {
        emit_json(&serde_json::json!({
            "status": "ok",
            "file": path,
        }))
    } else {
        println!("Exported quotes to {}", path.display());
        Ok(())
    }
}
