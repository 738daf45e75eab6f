use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::providers::extractor::JsonExtractor;
use crate::providers::models::AdapterError;

/// Indexes a sensor table's rows by station code
///
/// A table without rows yields an empty index, so its sensor is simply
/// absent for every station.
pub fn index_table(document: &Value, rows_path: &str, key_path: &str) -> HashMap<String, Value> {
    let rows = match JsonExtractor::lookup(document, rows_path) {
        Some(Value::Array(rows)) => rows,
        _ => return HashMap::new(),
    };

    rows.iter()
        .filter_map(|row| {
            let key = JsonExtractor::extract_text(row, &[key_path])?;
            Some((key, row.clone()))
        })
        .collect()
}

/// Builds one body per listed station: `{"station": {...}, "<table>": {...}, ...}`
///
/// Sensor rows are looked up by the station key resolved through `key_chain`
/// on the merged body.
pub fn merge(
    stations: &Value,
    tables: &[(String, HashMap<String, Value>)],
    key_chain: &[String],
) -> Result<Vec<Value>, AdapterError> {
    let stations = stations.as_array().ok_or_else(|| {
        AdapterError::MalformedPayload("expected an array of stations".to_string())
    })?;

    Ok(stations
        .iter()
        .map(|station| {
            let mut body = Map::new();
            body.insert("station".to_string(), station.clone());
            let key = JsonExtractor::extract_text(&Value::Object(body.clone()), key_chain);

            for (name, index) in tables {
                let row = key
                    .as_ref()
                    .and_then(|k| index.get(k))
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                body.insert(name.clone(), row);
            }
            Value::Object(body)
        })
        .collect())
}
