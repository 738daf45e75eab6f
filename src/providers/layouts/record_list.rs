use serde_json::Value;

use crate::providers::extractor::JsonExtractor;
use crate::providers::models::AdapterError;

/// Splits a document into its station rows
///
/// With no `records_path` the document root must itself be the array.
pub fn split_records(document: &Value, records_path: Option<&str>) -> Result<Vec<Value>, AdapterError> {
    let records = match records_path {
        Some(path) => JsonExtractor::require(document, path)
            .map_err(|e| AdapterError::MalformedPayload(e.to_string()))?,
        None => document,
    };

    match records {
        Value::Array(items) => Ok(items.clone()),
        other => Err(AdapterError::MalformedPayload(format!(
            "expected an array of station records at '{}', found {}",
            records_path.unwrap_or("$"),
            json_type(other)
        ))),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
