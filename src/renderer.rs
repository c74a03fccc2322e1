//! # Terminal Rendering
//!
//! Development mode output: renders a [`NormalizedSnapshot`] as a fixed-width
//! table so the pipeline can be checked from an SSH session on the Pi without
//! opening the dashboard.
//!
//! ```text
//! 3 aircraft @ 2025-07-24T12:00:00.000Z
//! HEX     FLIGHT    LAT       LON        ALT     SPD   HDG  SQWK  RANGE
//! 4ca1fa  RYR12AB   53.4213   -6.2701    3500    180   268  7000   12.4km
//! ```
//!
//! The range column is only drawn when a receiver position is configured.

use crate::{geo, NormalizedAircraft, NormalizedSnapshot};
use serde_json::Value;

const HEADER: &str = "HEX     FLIGHT    LAT       LON        ALT     SPD   HDG  SQWK";

/// Render the snapshot as a table. `receiver` adds a range column in km.
pub fn render_table(snapshot: &NormalizedSnapshot, receiver: Option<(f64, f64)>) -> String {
    let mut out = String::new();

    let title = match snapshot.count {
        Some(count) => format!("{} aircraft @ {}\n", count, snapshot.timestamp),
        None => format!("⚠ NO FEEDER DATA @ {}\n", snapshot.timestamp),
    };
    out.push_str(&title);

    if snapshot.aircraft.is_empty() {
        return out;
    }

    out.push_str(HEADER);
    if receiver.is_some() {
        out.push_str("  RANGE");
    }
    out.push('\n');

    for aircraft in &snapshot.aircraft {
        out.push_str(&render_row(aircraft, receiver));
        out.push('\n');
    }
    out
}

/// Print [`render_table`] to stdout.
pub fn draw_ascii(snapshot: &NormalizedSnapshot, receiver: Option<(f64, f64)>) {
    print!("{}", render_table(snapshot, receiver));
}

fn render_row(aircraft: &NormalizedAircraft, receiver: Option<(f64, f64)>) -> String {
    let mut row = format!(
        "{:<7} {:<9} {:<9} {:<10} {:<7} {:<5} {:<4} {:<4}",
        dash_if_empty(&aircraft.hex),
        dash_if_empty(&aircraft.flight),
        format_coord(&aircraft.lat),
        format_coord(&aircraft.lon),
        format_whole(&aircraft.altitude),
        format_whole(&aircraft.speed),
        format_whole(&aircraft.heading),
        dash_if_empty(&aircraft.squawk),
    );

    if let Some((lat, lon)) = receiver {
        let range = aircraft
            .position()
            .map(|(a_lat, a_lon)| format!("{:>6.1}km", geo::distance(lat, lon, a_lat, a_lon)))
            .unwrap_or_else(|| format!("{:>8}", "-"));
        row.push_str("  ");
        row.push_str(&range);
    }
    row.trim_end().to_string()
}

fn dash_if_empty(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn format_coord(value: &Value) -> String {
    match value.as_f64() {
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

// Altitude can be "ground"; other strings are shown as-is too.
fn format_whole(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => format!("{:.0}", v),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        _ => "-".to_string(),
    }
}
