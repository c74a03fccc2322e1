//! # Aircraft Normalization
//!
//! Turns a loosely-typed feeder payload into the fixed dashboard schema.
//!
//! ## Rules
//! - Records without both `lat` and `lon` keys are dropped. Presence is what
//!   counts: `"lat": 0` is a position, a missing key is not.
//! - Source order is preserved.
//! - Missing attributes get a default rather than failing the record:
//!
//! | Output                | Source field(s)              | Default |
//! |-----------------------|------------------------------|---------|
//! | `hex`                 | `hex`                        | `""`    |
//! | `flight`              | `flight`, trimmed            | `""`    |
//! | `altitude`            | `alt_baro`                   | `0`     |
//! | `speed`               | `gs`                         | `0`     |
//! | `track`               | `track`                      | `0`     |
//! | `category`            | `category`                   | `""`    |
//! | `squawk`              | `squawk`                     | `""`    |
//! | `heading`             | `mag_heading`, else `track`  | `0`     |
//! | `altitude_difference` | `alt_geom - alt_baro`        | omitted |
//!
//! Normalization is a pure function of the payload and the timestamp handed
//! in; reading the clock and persisting the raw data happen in [`crate::cache`].

use crate::{NormalizedAircraft, NormalizedSnapshot, RawSnapshot};
use serde_json::{Map, Number, Value};

/// Normalize a raw feeder payload, stamping it with `timestamp`.
///
/// A payload with no `aircraft` array yields [`NormalizedSnapshot::empty`],
/// without a `count`.
///
/// # Example
/// ```
/// use flight_dash_lib::{normalize::normalize, RawSnapshot};
/// use serde_json::json;
///
/// let raw = RawSnapshot(json!({"aircraft": [
///     {"hex": "4ca1fa", "flight": "RYR12AB ", "lat": 53.4, "lon": -6.2},
///     {"hex": "no-pos"}
/// ]}));
/// let snapshot = normalize(&raw, "2025-07-24T00:00:00.000Z".to_string());
///
/// assert_eq!(snapshot.count, Some(1));
/// assert_eq!(snapshot.aircraft[0].flight, "RYR12AB");
/// ```
pub fn normalize(raw: &RawSnapshot, timestamp: String) -> NormalizedSnapshot {
    let Some(records) = raw.aircraft() else {
        return NormalizedSnapshot::empty(timestamp);
    };

    let aircraft: Vec<NormalizedAircraft> = records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_aircraft)
        .collect();
    let count = aircraft.len();

    NormalizedSnapshot {
        timestamp,
        aircraft,
        count: Some(count),
    }
}

/// Normalize one raw aircraft record. `None` when it has no position.
pub fn normalize_aircraft(record: &Map<String, Value>) -> Option<NormalizedAircraft> {
    let lat = record.get("lat")?.clone();
    let lon = record.get("lon")?.clone();

    let track = value_or_zero(record, "track");
    let heading = record
        .get("mag_heading")
        .cloned()
        .unwrap_or_else(|| track.clone());

    Some(NormalizedAircraft {
        hex: text(record, "hex"),
        flight: text(record, "flight").trim().to_string(),
        lat,
        lon,
        altitude: value_or_zero(record, "alt_baro"),
        speed: value_or_zero(record, "gs"),
        track,
        category: text(record, "category"),
        squawk: text(record, "squawk"),
        heading,
        altitude_difference: altitude_difference(record),
    })
}

/// `alt_geom - alt_baro`, only when both are present and numeric.
///
/// Integer altitudes stay integers. A barometric altitude of `"ground"`
/// produces no difference.
fn altitude_difference(record: &Map<String, Value>) -> Option<Value> {
    let geom = record.get("alt_geom")?;
    let baro = record.get("alt_baro")?;

    if let (Some(geom), Some(baro)) = (geom.as_i64(), baro.as_i64()) {
        return geom.checked_sub(baro).map(Value::from);
    }

    let diff = geom.as_f64()? - baro.as_f64()?;
    Number::from_f64(diff).map(Value::Number)
}

fn value_or_zero(record: &Map<String, Value>, key: &str) -> Value {
    record.get(key).cloned().unwrap_or_else(|| Value::from(0))
}

// Non-string values are treated like a missing field.
fn text(record: &Map<String, Value>, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
