//! # Offline Fallback
//!
//! Used when none of the feeder endpoints answer. The dashboard should keep
//! rendering something, so the fetcher falls back in two steps:
//!
//! 1. **Sample file**: a captured `aircraft.json` (by default `flight_data.json`
//!    in the working directory). Handy for developing the dashboard away from
//!    the antenna.
//! 2. **Placeholder**: an empty payload stamped with the current time, zero
//!    messages and no aircraft.
//!
//! Neither step can fail from the caller's point of view.

use crate::RawSnapshot;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::{io, path::Path};
use tokio::fs;
use thiserror::Error;
use tracing::{info, warn};

/// Reasons the sample file could not be used.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// Sample file missing or unreadable
    #[error("sample IO: {0}")]
    Io(#[from] io::Error),

    /// Sample file is not valid JSON
    #[error("sample parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read and parse the sample payload at `path`.
pub async fn load_sample(path: &Path) -> Result<RawSnapshot, FallbackError> {
    let data = fs::read(path).await?;
    let raw = serde_json::from_slice(&data)?;
    Ok(RawSnapshot(raw))
}

/// Empty payload: `{"now": <unix seconds>, "messages": 0, "aircraft": []}`.
pub fn placeholder(now: DateTime<Utc>) -> RawSnapshot {
    let now = now.timestamp_millis() as f64 / 1000.0;
    RawSnapshot(json!({ "now": now, "messages": 0, "aircraft": [] }))
}

/// The sample at `path` if it loads, the placeholder otherwise.
pub async fn sample_or_placeholder(path: &Path, now: DateTime<Utc>) -> RawSnapshot {
    match load_sample(path).await {
        Ok(raw) => {
            info!(path = %path.display(), "serving sample aircraft data");
            raw
        }
        Err(FallbackError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no sample data available, serving empty placeholder");
            placeholder(now)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "sample data unusable, serving empty placeholder");
            placeholder(now)
        }
    }
}
