//! # Flight Dashboard Core Library
//!
//! This library sits between a local ADS-B flight feeder (dump1090, readsb,
//! PiAware and friends) and a browser dashboard. It polls the feeder for the
//! current aircraft list, reshapes the payload into a fixed schema and keeps
//! the result in a short-lived cache so the feeder is not hammered by every
//! browser refresh.
//!
//! ## Data Flow
//! 1. **Probe**: try the usual feeder endpoints in order, first JSON response wins
//! 2. **Fallback**: no feeder reachable → local sample file → empty placeholder
//! 3. **Normalize**: drop aircraft without a position, default missing fields,
//!    derive heading and altitude difference
//! 4. **Cache**: keep the normalized snapshot for a few seconds, persist the raw
//!    payload next to it for offline inspection
//! 5. **Serve**: hand the snapshot to the HTTP layer as JSON
//!
//! ## Core Types
//!
//! - [`RawSnapshot`]: whatever the feeder returned, kept loosely typed
//! - [`NormalizedAircraft`]: one dashboard-ready aircraft record
//! - [`NormalizedSnapshot`]: the list the dashboard actually consumes

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Module declarations
pub mod cache;
pub mod config;
pub mod fallback;
pub mod feeder;
pub mod geo;
pub mod logging;
pub mod normalize;
pub mod renderer;
pub mod server;

/// One point-in-time payload exactly as the feeder (or the sample file) produced it.
///
/// Feeders disagree about their schema, so nothing beyond "a JSON document" is
/// assumed. The usual shape is
/// `{"now": 1718550000.1, "messages": 123456, "aircraft": [{...}, ...]}`
/// where each aircraft is an open map of string keys to numbers or strings.
///
/// # Example
/// ```
/// use flight_dash_lib::RawSnapshot;
/// use serde_json::json;
///
/// let raw = RawSnapshot(json!({"now": 0.0, "messages": 0, "aircraft": []}));
/// assert!(raw.is_usable());
/// assert_eq!(raw.aircraft().map(|a| a.len()), Some(0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSnapshot(pub Value);

impl RawSnapshot {
    /// The raw aircraft records, if the payload carries an `aircraft` array.
    pub fn aircraft(&self) -> Option<&[Value]> {
        self.0.get("aircraft")?.as_array().map(Vec::as_slice)
    }

    /// True when the payload has an aircraft list, even an empty one.
    pub fn is_usable(&self) -> bool {
        self.aircraft().is_some()
    }

    /// Feeder clock at the time of the snapshot, in Unix seconds.
    pub fn now(&self) -> Option<f64> {
        self.0.get("now")?.as_f64()
    }

    /// Total Mode S messages the feeder has received.
    pub fn messages(&self) -> Option<u64> {
        self.0.get("messages")?.as_u64()
    }
}

/// A single aircraft in the dashboard schema.
///
/// Position, altitude, speed, track and heading are passed through as JSON
/// values: feeders report `"ground"` for the barometric altitude of a taxiing
/// aircraft and the dashboard renders whatever it is given.
///
/// `altitude_difference` (geometric minus barometric altitude) only exists
/// when the feeder reported both altitudes; it is left out of the JSON
/// entirely otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAircraft {
    /// ICAO 24-bit address as hex
    pub hex: String,
    /// Callsign with the feeder's space padding removed
    pub flight: String,
    pub lat: Value,
    pub lon: Value,
    /// Barometric altitude in feet
    pub altitude: Value,
    /// Ground speed in knots
    pub speed: Value,
    /// Track over ground in degrees
    pub track: Value,
    /// Emitter category, e.g. "A3"
    pub category: String,
    pub squawk: String,
    /// Magnetic heading when the aircraft reports one, track otherwise
    pub heading: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_difference: Option<Value>,
}

impl NormalizedAircraft {
    /// Latitude and longitude as numbers, when both are numeric.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lat.as_f64()?, self.lon.as_f64()?))
    }
}

/// The data product served to the dashboard.
///
/// `count` mirrors `aircraft.len()`. It is omitted when the feeder payload had
/// no aircraft list at all, which lets the dashboard tell "nothing in the sky"
/// apart from "nothing usable came back".
///
/// # Example
/// ```
/// use flight_dash_lib::NormalizedSnapshot;
///
/// let snapshot = NormalizedSnapshot::empty("2025-07-24T00:00:00.000Z".to_string());
/// assert!(snapshot.aircraft.is_empty());
/// assert_eq!(snapshot.count, None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSnapshot {
    /// ISO-8601 time the snapshot was normalized
    pub timestamp: String,
    /// Aircraft with a position, in feeder order
    pub aircraft: Vec<NormalizedAircraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl NormalizedSnapshot {
    /// Snapshot with no aircraft and no count.
    pub fn empty(timestamp: String) -> Self {
        NormalizedSnapshot {
            timestamp,
            aircraft: Vec::new(),
            count: None,
        }
    }
}
