use regex::Regex;
use serde_json::{json, Value};

use crate::providers::models::AdapterError;

/// Extracts two parallel arrays embedded as script variables in a page
///
/// The arrays use single-quoted strings, which are rewritten to double
/// quotes before JSON parsing. Row `i` of the metadata array pairs with row
/// `i` of the measurement array; a missing measurement row becomes `[]`.
pub struct ScriptArrays {
    coords: Regex,
    data: Regex,
    coords_var: String,
    data_var: String,
}

impl ScriptArrays {
    pub fn new(coords_var: &str, data_var: &str) -> Result<Self, AdapterError> {
        Ok(Self {
            coords: variable_pattern(coords_var)?,
            data: variable_pattern(data_var)?,
            coords_var: coords_var.to_string(),
            data_var: data_var.to_string(),
        })
    }

    /// Returns one `{"coords": [...], "data": [...]}` body per station
    pub fn parse(&self, page: &str) -> Result<Vec<Value>, AdapterError> {
        let coords = capture_rows(&self.coords, page, &self.coords_var)?;
        let data = capture_rows(&self.data, page, &self.data_var)?;

        Ok(coords
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let measurements = data.get(index).cloned().unwrap_or_else(|| json!([]));
                json!({ "coords": row, "data": measurements })
            })
            .collect())
    }
}

fn variable_pattern(var: &str) -> Result<Regex, AdapterError> {
    Regex::new(&format!(r"{}\s*=\s*(\[\[[\s\S]*?\]\]);", regex::escape(var)))
        .map_err(|e| AdapterError::MalformedPayload(format!("bad pattern for '{}': {}", var, e)))
}

fn capture_rows(pattern: &Regex, page: &str, var: &str) -> Result<Vec<Value>, AdapterError> {
    let literal = pattern
        .captures(page)
        .and_then(|c| c.get(1))
        .ok_or_else(|| AdapterError::MalformedPayload(format!("script variable '{}' not found", var)))?;

    let normalized = literal.as_str().replace('\'', "\"");
    serde_json::from_str::<Vec<Value>>(&normalized)
        .map_err(|e| AdapterError::MalformedPayload(format!("script variable '{}' is not an array: {}", var, e)))
}
