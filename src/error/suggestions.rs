//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! use the error's JSON context.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::ImportInvalid => suggest_import_invalid(context),
        ErrorCode::RemoteUnavailable => suggest_remote_unavailable(context),
        ErrorCode::ConfigMissingRequired => suggest_config_missing_required(context),
        _ => code.suggestion().to_string(),
    }
}

fn suggest_import_invalid(context: Option<&Value>) -> String {
    let reason = context
        .and_then(|c| c.get("reason"))
        .and_then(Value::as_str);

    match reason {
        Some(reason) => format!(
            "Import rejected ({reason}). Nothing was imported. The file must be a JSON array like:\n  [{{\"text\": \"...\", \"category\": \"...\"}}]"
        ),
        None => ErrorCode::ImportInvalid.suggestion().to_string(),
    }
}

fn suggest_remote_unavailable(context: Option<&Value>) -> String {
    let detail = context
        .and_then(|c| c.get("detail"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    if detail.contains("timed out") {
        return "The remote did not answer in time. Raise [remote] timeout_secs or retry later".to_string();
    }
    ErrorCode::RemoteUnavailable.suggestion().to_string()
}

fn suggest_config_missing_required(context: Option<&Value>) -> String {
    let key = context
        .and_then(|c| c.get("config_key"))
        .and_then(Value::as_str);

    match key {
        Some(key) => format!(
            "Set `{key}` in config.toml, or export the matching QS_* variable (e.g. QS_REMOTE_URL)"
        ),
        None => ErrorCode::ConfigMissingRequired.suggestion().to_string(),
    }
}
