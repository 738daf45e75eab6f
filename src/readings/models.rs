use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical scalar measurements a station may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Temperature,
    TemperatureHigh,
    TemperatureLow,
    DewPoint,
    DewPointHigh,
    DewPointLow,
    Humidity,
    HumidityHigh,
    HumidityLow,
    Pressure,
    PressureHigh,
    PressureLow,
    WindSpeed,
    WindGust,
    WindGustHigh,
    Rain,
    RainRate,
    HeatIndex,
    HeatIndexHigh,
    UvIndex,
    UvIndexHigh,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Temperature,
        Field::TemperatureHigh,
        Field::TemperatureLow,
        Field::DewPoint,
        Field::DewPointHigh,
        Field::DewPointLow,
        Field::Humidity,
        Field::HumidityHigh,
        Field::HumidityLow,
        Field::Pressure,
        Field::PressureHigh,
        Field::PressureLow,
        Field::WindSpeed,
        Field::WindGust,
        Field::WindGustHigh,
        Field::Rain,
        Field::RainRate,
        Field::HeatIndex,
        Field::HeatIndexHigh,
        Field::UvIndex,
        Field::UvIndexHigh,
    ];

    /// Key used for this field on the wire
    pub fn wire_key(self) -> &'static str {
        match self {
            Field::Temperature => "T",
            Field::TemperatureHigh => "TH",
            Field::TemperatureLow => "TL",
            Field::DewPoint => "D",
            Field::DewPointHigh => "DH",
            Field::DewPointLow => "DL",
            Field::Humidity => "H",
            Field::HumidityHigh => "HH",
            Field::HumidityLow => "HL",
            Field::Pressure => "P",
            Field::PressureHigh => "PH",
            Field::PressureLow => "PL",
            Field::WindSpeed => "V",
            Field::WindGust => "G",
            Field::WindGustHigh => "GH",
            Field::Rain => "R",
            Field::RainRate => "RR",
            Field::HeatIndex => "HI",
            Field::HeatIndexHigh => "HIH",
            Field::UvIndex => "UV",
            Field::UvIndexHigh => "UVH",
        }
    }
}

/// Station classification for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationStatus {
    #[serde(rename = "0")]
    Active,
    #[serde(rename = "1")]
    Inactive,
}

/// Scalar measurements of a reading; absent upstream means `None`, never zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorValues {
    #[serde(rename = "T", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "TH", default, skip_serializing_if = "Option::is_none")]
    pub temperature_high: Option<f64>,
    #[serde(rename = "TL", default, skip_serializing_if = "Option::is_none")]
    pub temperature_low: Option<f64>,
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<f64>,
    #[serde(rename = "DH", default, skip_serializing_if = "Option::is_none")]
    pub dew_point_high: Option<f64>,
    #[serde(rename = "DL", default, skip_serializing_if = "Option::is_none")]
    pub dew_point_low: Option<f64>,
    #[serde(rename = "H", default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(rename = "HH", default, skip_serializing_if = "Option::is_none")]
    pub humidity_high: Option<f64>,
    #[serde(rename = "HL", default, skip_serializing_if = "Option::is_none")]
    pub humidity_low: Option<f64>,
    #[serde(rename = "P", default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(rename = "PH", default, skip_serializing_if = "Option::is_none")]
    pub pressure_high: Option<f64>,
    #[serde(rename = "PL", default, skip_serializing_if = "Option::is_none")]
    pub pressure_low: Option<f64>,
    #[serde(rename = "V", default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "G", default, skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<f64>,
    #[serde(rename = "GH", default, skip_serializing_if = "Option::is_none")]
    pub wind_gust_high: Option<f64>,
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    #[serde(rename = "RR", default, skip_serializing_if = "Option::is_none")]
    pub rain_rate: Option<f64>,
    #[serde(rename = "HI", default, skip_serializing_if = "Option::is_none")]
    pub heat_index: Option<f64>,
    #[serde(rename = "HIH", default, skip_serializing_if = "Option::is_none")]
    pub heat_index_high: Option<f64>,
    #[serde(rename = "UV", default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    #[serde(rename = "UVH", default, skip_serializing_if = "Option::is_none")]
    pub uv_index_high: Option<f64>,
}

impl SensorValues {
    fn slot(&mut self, field: Field) -> &mut Option<f64> {
        match field {
            Field::Temperature => &mut self.temperature,
            Field::TemperatureHigh => &mut self.temperature_high,
            Field::TemperatureLow => &mut self.temperature_low,
            Field::DewPoint => &mut self.dew_point,
            Field::DewPointHigh => &mut self.dew_point_high,
            Field::DewPointLow => &mut self.dew_point_low,
            Field::Humidity => &mut self.humidity,
            Field::HumidityHigh => &mut self.humidity_high,
            Field::HumidityLow => &mut self.humidity_low,
            Field::Pressure => &mut self.pressure,
            Field::PressureHigh => &mut self.pressure_high,
            Field::PressureLow => &mut self.pressure_low,
            Field::WindSpeed => &mut self.wind_speed,
            Field::WindGust => &mut self.wind_gust,
            Field::WindGustHigh => &mut self.wind_gust_high,
            Field::Rain => &mut self.rain,
            Field::RainRate => &mut self.rain_rate,
            Field::HeatIndex => &mut self.heat_index,
            Field::HeatIndexHigh => &mut self.heat_index_high,
            Field::UvIndex => &mut self.uv_index,
            Field::UvIndexHigh => &mut self.uv_index_high,
        }
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Temperature => self.temperature,
            Field::TemperatureHigh => self.temperature_high,
            Field::TemperatureLow => self.temperature_low,
            Field::DewPoint => self.dew_point,
            Field::DewPointHigh => self.dew_point_high,
            Field::DewPointLow => self.dew_point_low,
            Field::Humidity => self.humidity,
            Field::HumidityHigh => self.humidity_high,
            Field::HumidityLow => self.humidity_low,
            Field::Pressure => self.pressure,
            Field::PressureHigh => self.pressure_high,
            Field::PressureLow => self.pressure_low,
            Field::WindSpeed => self.wind_speed,
            Field::WindGust => self.wind_gust,
            Field::WindGustHigh => self.wind_gust_high,
            Field::Rain => self.rain,
            Field::RainRate => self.rain_rate,
            Field::HeatIndex => self.heat_index,
            Field::HeatIndexHigh => self.heat_index_high,
            Field::UvIndex => self.uv_index,
            Field::UvIndexHigh => self.uv_index_high,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        *self.slot(field) = value;
    }

    /// True when no scalar is present
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// Canonical per-station reading, the unit exchanged between components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "S")]
    status: StationStatus,

    #[serde(rename = "N")]
    name: String,

    #[serde(flatten)]
    values: SensorValues,

    #[serde(rename = "LAT", default, skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,

    #[serde(rename = "LON", default, skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
}

impl Reading {
    /// Builds an inactive reading: name only, no scalars, no coordinates
    pub fn inactive(name: impl Into<String>) -> Self {
        Self {
            status: StationStatus::Inactive,
            name: name.into(),
            values: SensorValues::default(),
            latitude: None,
            longitude: None,
        }
    }

    /// Builds an active reading. A reading with no scalar collapses to inactive.
    pub fn active(name: impl Into<String>, values: SensorValues, position: Option<GeoPoint>) -> Self {
        if values.is_empty() {
            return Self::inactive(name);
        }
        Self {
            status: StationStatus::Active,
            name: name.into(),
            values,
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
        }
    }

    pub fn status(&self) -> StationStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == StationStatus::Active
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &SensorValues {
        &self.values
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(field)
    }

    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
            _ => None,
        }
    }
}

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A reading tagged with the station it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub station_id: String,
    pub reading: Reading,
}

/// One aggregation cycle's readings for a provider, captured at a single instant
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    provider: String,
    timestamp: DateTime<Utc>,
    entries: Vec<SnapshotEntry>,
}

#[derive(Serialize)]
struct SnapshotHeader<'a> {
    timestamp: &'a str,
}

impl Snapshot {
    pub fn new(provider: impl Into<String>, timestamp: DateTime<Utc>, entries: Vec<SnapshotEntry>) -> Self {
        Self {
            provider: provider.into(),
            timestamp,
            entries,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reading(&self, station_id: &str) -> Option<&Reading> {
        self.entries
            .iter()
            .find(|e| e.station_id == station_id)
            .map(|e| &e.reading)
    }

    /// Number of readings with the given status
    pub fn count_status(&self, status: StationStatus) -> usize {
        self.entries
            .iter()
            .filter(|e| e.reading.status() == status)
            .count()
    }

    /// Wire encoding: a timestamp header line, then one reading per line
    pub fn to_ndjson(&self) -> Result<String, serde_json::Error> {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push(serde_json::to_string(&SnapshotHeader {
            timestamp: &timestamp,
        })?);
        for entry in &self.entries {
            lines.push(serde_json::to_string(&entry.reading)?);
        }
        Ok(lines.join("\n"))
    }
}

/// Why a single upstream scalar could not be turned into a number
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldParseError {
    #[error("empty value")]
    Empty,

    #[error("'{0}' is not a number")]
    Invalid(String),

    #[error("value is not a scalar")]
    NotScalar,
}
