use anyhow::{Context, Result};
use serde_json::Value;

use crate::readings::FieldParseError;

/// Extracts values from provider payloads using dot-notation paths
///
/// Path components that parse as integers index into arrays, so
/// `"coords.3"` reads the fourth element of the `coords` array.
pub struct JsonExtractor;

impl JsonExtractor {
    /// Walks a dot-notation path, returning `None` when any component is missing
    pub fn lookup<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
        if path.is_empty() {
            return Some(json);
        }
        path.split('.')
            .try_fold(json, |current, component| Self::step(current, component))
    }

    /// Walks a path that must exist for the payload to make sense at all
    pub fn require<'a>(json: &'a Value, path: &str) -> Result<&'a Value> {
        let mut current = json;

        for (index, component) in path.split('.').enumerate() {
            current = Self::step(current, component).with_context(|| {
                format!(
                    "Failed to extract path component '{}' at position {} in path '{}'",
                    component, index, path
                )
            })?;
        }

        Ok(current)
    }

    fn step<'a>(current: &'a Value, component: &str) -> Option<&'a Value> {
        match current {
            Value::Array(items) => component.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(component),
        }
    }

    /// First value along a fallback chain that is present and not blank
    ///
    /// `null` and empty strings count as missing, so `["name", "code"]`
    /// falls through to `code` when `name` is `""`.
    pub fn first_present<'a, S: AsRef<str>>(json: &'a Value, paths: &[S]) -> Option<&'a Value> {
        paths
            .iter()
            .filter_map(|path| Self::lookup(json, path.as_ref()))
            .find(|value| !Self::is_blank(value))
    }

    /// Resolves a fallback chain to display text
    pub fn extract_text<S: AsRef<str>>(json: &Value, paths: &[S]) -> Option<String> {
        match Self::first_present(json, paths)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Resolves a fallback chain to a number
    ///
    /// `Ok(None)` means the field is absent upstream; `Err` means it is
    /// present but unusable.
    pub fn extract_number<S: AsRef<str>>(
        json: &Value,
        paths: &[S],
    ) -> Result<Option<f64>, FieldParseError> {
        match Self::first_present(json, paths) {
            None => Ok(None),
            Some(value) => Self::scalar_to_f64(value).map(Some),
        }
    }

    /// Converts a JSON scalar to a finite number
    pub fn scalar_to_f64(value: &Value) -> Result<f64, FieldParseError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FieldParseError::Invalid(n.to_string())),
            Value::String(s) => parse_decimal(s),
            Value::Null => Err(FieldParseError::Empty),
            _ => Err(FieldParseError::NotScalar),
        }
    }

    fn is_blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Parses a locale-formatted decimal such as `"12,3"` or `" 7.5 "`
///
/// The first decimal comma becomes a point; non-finite results are rejected.
pub fn parse_decimal(raw: &str) -> Result<f64, FieldParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldParseError::Empty);
    }

    let normalized = trimmed.replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldParseError::Invalid(trimmed.to_string()))
}
