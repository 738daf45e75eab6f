use tracing::debug;

use super::models::{GeoPoint, Reading, SensorValues};
use crate::providers::descriptor::{CoordinateSource, ProviderDescriptor};
use crate::providers::extractor::JsonExtractor;
use crate::providers::geo::planar_to_geographic;
use crate::providers::models::RawRecord;

/// Maps a raw provider record onto the canonical reading
///
/// Pure apart from debug logging: the same descriptor and record always
/// produce the same reading. Unparseable scalars are dropped one by one;
/// they never fail the record.
pub fn normalize(descriptor: &ProviderDescriptor, raw: &RawRecord) -> Reading {
    let name = resolve_name(descriptor, raw);

    if is_flagged_inactive(descriptor, raw) {
        debug!(
            "[{}] Station '{}' flagged inactive upstream",
            descriptor.id, raw.station_key
        );
        return Reading::inactive(name);
    }

    let mut values = SensorValues::default();
    for mapping in &descriptor.fields {
        match JsonExtractor::extract_number(&raw.body, &mapping.paths) {
            Ok(value) => values.set(mapping.field, value),
            Err(e) => debug!(
                "[{}] Station '{}': dropping {} ({})",
                descriptor.id,
                raw.station_key,
                mapping.field.wire_key(),
                e
            ),
        }
    }

    let activity = &descriptor.inactivity.activity_fields;
    if !activity.is_empty() && activity.iter().all(|field| values.get(*field).is_none()) {
        return Reading::inactive(name);
    }

    Reading::active(name, values, resolve_position(descriptor, raw))
}

/// Registry name first, then the upstream name chain, then the station key
pub fn resolve_name(descriptor: &ProviderDescriptor, raw: &RawRecord) -> String {
    raw.display_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| JsonExtractor::extract_text(&raw.body, &descriptor.name))
        .unwrap_or_else(|| raw.station_key.clone())
}

fn is_flagged_inactive(descriptor: &ProviderDescriptor, raw: &RawRecord) -> bool {
    match &descriptor.inactivity.sentinel {
        Some(sentinel) => {
            JsonExtractor::extract_text(&raw.body, &[sentinel.path.as_str()]).as_deref()
                == Some(sentinel.inactive_value.as_str())
        }
        None => false,
    }
}

/// Upstream coordinates when the descriptor has them, else the registry entry
fn resolve_position(descriptor: &ProviderDescriptor, raw: &RawRecord) -> Option<GeoPoint> {
    upstream_position(&descriptor.coordinates, raw).or(raw.registry_position)
}

fn upstream_position(source: &CoordinateSource, raw: &RawRecord) -> Option<GeoPoint> {
    let number = |path: &str| JsonExtractor::extract_number(&raw.body, &[path]).ok().flatten();

    match source {
        CoordinateSource::Geographic {
            latitude,
            longitude,
        } => Some(GeoPoint {
            latitude: number(latitude.as_str())?,
            longitude: number(longitude.as_str())?,
        }),
        CoordinateSource::Planar { x, y } => Some(planar_to_geographic(number(x.as_str())?, number(y.as_str())?)),
        CoordinateSource::Registry => None,
    }
}
