//! Per-provider extraction tables
//!
//! Every upstream network is described as data: where its payload lives,
//! how rows are keyed and named, which path feeds which canonical field,
//! where coordinates come from and when a station counts as inactive.
//! The generic adapter and the normalizer are driven entirely by these.

use super::models::FetchScope;
use crate::config::ProviderKind;
use crate::readings::Field;

/// Where a provider's payload comes from and how it splits into station rows
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// One JSON document per station; `{ref}` in the template is the upstream ref
    StationDocument { url_template: String },

    /// One JSON document holding an array of station rows
    RecordList {
        url: String,
        /// Path to the array inside the document; `None` when the root is the array
        records_path: Option<String>,
        /// Rows whose key starts with none of these prefixes are dropped
        key_prefixes: Vec<String>,
    },

    /// An HTML/JS page embedding two parallel arrays as script variables
    ScriptArrays {
        url: String,
        /// Variable holding per-station metadata rows, exposed as `coords`
        coords_var: String,
        /// Variable holding per-station measurement rows, exposed as `data`
        data_var: String,
    },

    /// A station list merged with per-sensor tables keyed by station code
    SensorTables {
        stations_url: String,
        tables: Vec<SensorTable>,
    },
}

impl Layout {
    pub fn scope(&self) -> FetchScope {
        match self {
            Layout::StationDocument { .. } => FetchScope::PerStation,
            _ => FetchScope::Network,
        }
    }
}

/// One sensor table merged into station rows under `name`
#[derive(Debug, Clone, PartialEq)]
pub struct SensorTable {
    pub name: String,
    pub url: String,
    pub rows_path: String,
    pub key_path: String,
}

/// Canonical field fed by a fallback chain of paths
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub field: Field,
    pub paths: Vec<String>,
}

/// Where a reading's coordinates come from
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateSource {
    /// Decimal degrees published upstream
    Geographic { latitude: String, longitude: String },
    /// Planar map offsets converted with the grid transform
    Planar { x: String, y: String },
    /// The configured station registry
    Registry,
}

/// Upstream value explicitly marking a row inactive
#[derive(Debug, Clone, PartialEq)]
pub struct Sentinel {
    pub path: String,
    pub inactive_value: String,
}

/// Per-provider inactivity rule
///
/// A sentinel match is inactive regardless of other fields. When
/// `activity_fields` is non-empty, a row where all of them are absent is
/// inactive too. A row with no scalar at all is always inactive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InactivityRule {
    pub sentinel: Option<Sentinel>,
    pub activity_fields: Vec<Field>,
}

/// Complete extraction table for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    pub id: String,
    pub layout: Layout,
    /// Fallback chain yielding the upstream station key of a row
    pub station_key: Vec<String>,
    /// Fallback chain yielding the upstream station name of a row
    pub name: Vec<String>,
    pub fields: Vec<FieldMapping>,
    pub coordinates: CoordinateSource,
    pub inactivity: InactivityRule,
}

const CML_URL: &str = "http://www.centrometeolombardo.com/Moduli/refx.php?t=all";
const OMIRL_URL: &str = "https://omirl.regione.liguria.it/Omirl/rest";
const TORINOMETEO_URL: &str = "https://www.torinometeo.org/api/v1/realtime/data/?format=json";
const METEO3R_URL: &str = "https://www.meteo3r.it/dati/mappe/misure.geojson";
const LIMET_URL: &str =
    "https://retelimet.centrometeoligure.it/stazioni/{ref}/data/cu/realtimegauges.txt";

/// Station-level activity set shared by the networks that publish no sentinel
const CORE_ACTIVITY_FIELDS: [Field; 4] = [Field::Temperature, Field::Humidity, Field::WindSpeed, Field::Rain];

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn map(table: &[(Field, &str)]) -> Vec<FieldMapping> {
    table
        .iter()
        .map(|(field, path)| FieldMapping {
            field: *field,
            paths: vec![path.to_string()],
        })
        .collect()
}

impl ProviderDescriptor {
    /// Built-in descriptor for a known network, optionally pointed at another URL
    pub fn builtin(id: &str, kind: ProviderKind, base_url: Option<&str>) -> Self {
        match kind {
            ProviderKind::Cml => Self::cml(id, base_url.unwrap_or(CML_URL)),
            ProviderKind::Omirl => Self::omirl(id, base_url.unwrap_or(OMIRL_URL)),
            ProviderKind::Torinometeo => Self::torinometeo(id, base_url.unwrap_or(TORINOMETEO_URL)),
            ProviderKind::Meteo3r => Self::meteo3r(id, base_url.unwrap_or(METEO3R_URL)),
            ProviderKind::Limet => Self::limet(id, base_url.unwrap_or(LIMET_URL)),
        }
    }

    pub fn scope(&self) -> FetchScope {
        self.layout.scope()
    }

    fn cml(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            layout: Layout::ScriptArrays {
                url: url.to_string(),
                coords_var: "var coords".to_string(),
                data_var: "datostazione".to_string(),
            },
            station_key: paths(&["coords.0"]),
            name: paths(&["coords.1", "coords.0"]),
            fields: map(&[
                (Field::Temperature, "data.4"),
                (Field::TemperatureHigh, "data.5"),
                (Field::TemperatureLow, "data.7"),
                (Field::DewPoint, "data.15"),
                (Field::DewPointHigh, "data.16"),
                (Field::DewPointLow, "data.18"),
                (Field::Humidity, "data.9"),
                (Field::HumidityHigh, "data.10"),
                (Field::HumidityLow, "data.12"),
                (Field::WindSpeed, "data.28"),
                (Field::WindGust, "data.25"),
                (Field::Rain, "data.37"),
                (Field::RainRate, "data.41"),
            ]),
            coordinates: CoordinateSource::Planar {
                x: "coords.3".to_string(),
                y: "coords.4".to_string(),
            },
            inactivity: InactivityRule {
                sentinel: Some(Sentinel {
                    path: "data.0".to_string(),
                    inactive_value: "1".to_string(),
                }),
                activity_fields: Vec::new(),
            },
        }
    }

    fn omirl(id: &str, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let table = |name: &str, sensor: &str| SensorTable {
            name: name.to_string(),
            url: format!("{}/stations/sensorvalues/{}", base, sensor),
            rows_path: "tableRows".to_string(),
            key_path: "code".to_string(),
        };

        Self {
            id: id.to_string(),
            layout: Layout::SensorTables {
                stations_url: format!("{}/stations/Termo", base),
                tables: vec![
                    table("termo", "Termo"),
                    table("vento", "Vento"),
                    table("igro", "Igro"),
                    table("pluvio", "Pluvio"),
                ],
            },
            station_key: paths(&["station.shortCode", "station.code"]),
            name: paths(&["station.name", "station.shortCode", "station.code"]),
            fields: map(&[
                (Field::Temperature, "termo.last"),
                (Field::TemperatureHigh, "termo.max"),
                (Field::TemperatureLow, "termo.min"),
                (Field::Humidity, "igro.last"),
                (Field::HumidityHigh, "igro.max"),
                (Field::HumidityLow, "igro.min"),
                (Field::WindSpeed, "vento.last"),
                // The network publishes no gust column; the last wind value is republished as gust
                (Field::WindGust, "vento.last"),
                (Field::Rain, "pluvio.max"),
                (Field::RainRate, "pluvio.last"),
            ]),
            coordinates: CoordinateSource::Geographic {
                latitude: "station.lat".to_string(),
                longitude: "station.lon".to_string(),
            },
            inactivity: InactivityRule {
                sentinel: None,
                activity_fields: CORE_ACTIVITY_FIELDS.to_vec(),
            },
        }
    }

    fn torinometeo(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            layout: Layout::RecordList {
                url: url.to_string(),
                records_path: None,
                key_prefixes: Vec::new(),
            },
            station_key: paths(&["station.slug"]),
            name: paths(&["station.name", "station.slug"]),
            fields: map(&[
                (Field::Temperature, "temperature"),
                (Field::TemperatureHigh, "temperature_max"),
                (Field::TemperatureLow, "temperature_min"),
                (Field::DewPoint, "dewpoint"),
                (Field::DewPointHigh, "dewpoint_max"),
                (Field::DewPointLow, "dewpoint_min"),
                (Field::Humidity, "relative_humidity"),
                (Field::HumidityHigh, "relative_humidity_max"),
                (Field::HumidityLow, "relative_humidity_min"),
                (Field::Pressure, "pressure"),
                (Field::PressureHigh, "pressure_max"),
                (Field::PressureLow, "pressure_min"),
                (Field::WindSpeed, "wind_strength"),
                (Field::WindGust, "wind_strength_max"),
                (Field::Rain, "rain"),
                (Field::RainRate, "rain_rate"),
            ]),
            coordinates: CoordinateSource::Geographic {
                latitude: "station.lat".to_string(),
                longitude: "station.lng".to_string(),
            },
            inactivity: InactivityRule {
                sentinel: None,
                activity_fields: CORE_ACTIVITY_FIELDS.to_vec(),
            },
        }
    }

    fn meteo3r(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            layout: Layout::RecordList {
                url: url.to_string(),
                records_path: Some("features".to_string()),
                key_prefixes: paths(&["PIE", "VDA"]),
            },
            station_key: paths(&["properties.IDRETE_CODSTAZ"]),
            name: paths(&["properties.STAZIONE", "properties.IDRETE_CODSTAZ"]),
            fields: map(&[
                (Field::Temperature, "properties.T"),
                (Field::TemperatureHigh, "properties.T_MAX"),
                (Field::TemperatureLow, "properties.T_MIN"),
                (Field::Humidity, "properties.U"),
                (Field::HumidityHigh, "properties.U_MAX"),
                (Field::HumidityLow, "properties.U_MIN"),
                (Field::WindSpeed, "properties.VV"),
                (Field::WindGust, "properties.VV_MAX"),
                (Field::Rain, "properties.P_24H"),
                (Field::RainRate, "properties.P"),
            ]),
            // GeoJSON positions are [lon, lat]
            coordinates: CoordinateSource::Geographic {
                latitude: "geometry.coordinates.1".to_string(),
                longitude: "geometry.coordinates.0".to_string(),
            },
            inactivity: InactivityRule {
                sentinel: None,
                activity_fields: CORE_ACTIVITY_FIELDS.to_vec(),
            },
        }
    }

    fn limet(id: &str, url_template: &str) -> Self {
        Self {
            id: id.to_string(),
            layout: Layout::StationDocument {
                url_template: url_template.to_string(),
            },
            station_key: Vec::new(),
            name: Vec::new(),
            fields: map(&[
                (Field::Temperature, "temp"),
                (Field::TemperatureHigh, "tempTH"),
                (Field::TemperatureLow, "tempTL"),
                (Field::DewPoint, "dew"),
                (Field::DewPointHigh, "dewpointTH"),
                (Field::DewPointLow, "dewpointTL"),
                (Field::Humidity, "hum"),
                (Field::HumidityHigh, "humTH"),
                (Field::HumidityLow, "humTL"),
                (Field::Pressure, "press"),
                (Field::PressureHigh, "pressTH"),
                (Field::PressureLow, "pressTL"),
                (Field::WindSpeed, "wspeed"),
                (Field::WindGust, "wgust"),
                (Field::WindGustHigh, "wgustTM"),
                (Field::Rain, "rfall"),
                (Field::RainRate, "rrate"),
                (Field::HeatIndex, "heatindex"),
                (Field::HeatIndexHigh, "heatindexTH"),
                (Field::UvIndex, "UV"),
                (Field::UvIndexHigh, "UVTH"),
            ]),
            coordinates: CoordinateSource::Registry,
            inactivity: InactivityRule {
                sentinel: Some(Sentinel {
                    path: "SensorContactLost".to_string(),
                    inactive_value: "1".to_string(),
                }),
                activity_fields: Vec::new(),
            },
        }
    }
}
