//! Import/export file format: a pretty-printed JSON array of quotes.

use serde_json::Value;

use crate::core::quote::Quote;
use crate::error::{QsError, Result};

/// Render quotes as the export file body.
pub fn export_quotes(quotes: &[Quote]) -> Result<String> {
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// Parse an import file body.
///
/// The whole payload is rejected if the top-level value is not an array or
/// if any element is not a valid quote.
pub fn parse_import(raw: &str) -> Result<Vec<Quote>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| QsError::InvalidImportFormat(format!("not valid JSON: {err}")))?;

    let Value::Array(items) = value else {
        return Err(QsError::InvalidImportFormat(format!(
            "top-level value is {}, expected an array",
            describe(&value)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let quote: Quote = serde_json::from_value(item).map_err(|err| {
                QsError::InvalidImportFormat(format!("element {idx} is not a quote: {err}"))
            })?;
            quote.validate().map_err(|err| {
                QsError::InvalidImportFormat(format!("element {idx}: {err}"))
            })?;
            Ok(quote)
        })
        .collect()
}

const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
