use serde_json::Value;
use url::Url;

use super::record_list::json_type;
use crate::providers::models::AdapterError;

/// Placeholder replaced by the station's upstream ref
pub const REF_PLACEHOLDER: &str = "{ref}";

/// Builds the document URL for one station
pub fn station_url(template: &str, upstream_ref: &str) -> Result<Url, AdapterError> {
    let raw = template.replace(REF_PLACEHOLDER, upstream_ref);
    Url::parse(&raw).map_err(|_| AdapterError::InvalidUrl(raw))
}

/// Accepts a station document only when it is a JSON object
pub fn check_document(document: Value) -> Result<Value, AdapterError> {
    if document.is_object() {
        Ok(document)
    } else {
        Err(AdapterError::MalformedPayload(format!(
            "expected a station document object, found {}",
            json_type(&document)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_url_substitutes_ref() {
        let url = station_url(
            "https://retelimet.centrometeoligure.it/stazioni/{ref}/data/cu/realtimegauges.txt",
            "meteo-salberto",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://retelimet.centrometeoligure.it/stazioni/meteo-salberto/data/cu/realtimegauges.txt"
        );
    }

    #[test]
    fn test_station_url_invalid() {
        assert!(matches!(
            station_url("not a url/{ref}", "x"),
            Err(AdapterError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_check_document() {
        assert!(check_document(json!({"temp": "12,5"})).is_ok());
        assert!(matches!(
            check_document(json!(["temp"])),
            Err(AdapterError::MalformedPayload(_))
        ));
    }
}
