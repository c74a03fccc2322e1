//! # Aircraft Snapshot Cache
//!
//! Sits in front of an [`AircraftSource`] so that a dashboard polling every
//! second does not turn into one feeder request per browser per second.
//!
//! ## Caching Strategy
//! - **Key**: feeder host. Each host has its own slot.
//! - **TTL**: 5 seconds by default. A snapshot older than the TTL (strictly)
//!   is refreshed on the next request.
//! - **Refresh**: fetch → normalize → replace the slot → persist the raw
//!   payload to `last_raw_data.json` for offline inspection.
//! - **Clock**: injected through [`Clock`] so staleness can be tested without
//!   sleeping.
//!
//! ## Concurrency
//! A slot is a `tokio::sync::Mutex` held for the whole check-and-refresh
//! sequence. At most one refresh per host is in flight; callers arriving
//! meanwhile wait and then get the freshly stored snapshot. Callers never see
//! a half-replaced snapshot.
//!
//! ## Failure Modes
//! - Feeder payload without an aircraft list: the previous snapshot keeps
//!   being served. With no previous snapshot the caller gets an empty one,
//!   which is not cached so the next request tries again.
//! - Raw payload persistence failure: logged, the snapshot is still returned.

use crate::feeder::AircraftSource;
use crate::normalize::normalize;
use crate::{NormalizedSnapshot, RawSnapshot};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};
use std::{io, sync};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default snapshot time-to-live
pub const CACHE_DURATION: Duration = Duration::from_secs(5);

/// Errors writing the raw payload dump.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("raw dump IO: {0}")]
    Io(#[from] io::Error),

    #[error("raw dump encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A normalized snapshot and when it was produced.
#[derive(Clone, Debug)]
struct CacheEntry {
    snapshot: NormalizedSnapshot,
    produced_at: DateTime<Utc>,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// TTL cache of normalized aircraft snapshots, one per feeder host.
pub struct AircraftCache<S, C = SystemClock> {
    source: S,
    clock: C,
    ttl: TimeDelta,
    raw_dump_path: Option<PathBuf>,
    slots: sync::Mutex<HashMap<String, Slot>>,
}

impl<S: AircraftSource> AircraftCache<S, SystemClock> {
    /// Cache over `source` using the system clock and the default TTL.
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S: AircraftSource, C: Clock> AircraftCache<S, C> {
    /// Cache over `source` reading time from `clock`.
    pub fn with_clock(source: S, clock: C) -> Self {
        AircraftCache {
            source,
            clock,
            ttl: ttl_delta(CACHE_DURATION),
            raw_dump_path: None,
            slots: sync::Mutex::new(HashMap::new()),
        }
    }

    /// Serve snapshots for `ttl` before refreshing.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl_delta(ttl);
        self
    }

    /// Write each refreshed raw payload to `path`, pretty-printed.
    pub fn with_raw_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_dump_path = Some(path.into());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current normalized snapshot for `host`, refreshing it when stale.
    ///
    /// Never fails: fetch problems are absorbed by the source and the
    /// previous snapshot, and persistence problems are only logged.
    pub async fn get(&self, host: &str) -> NormalizedSnapshot {
        let slot = self.slot(host);
        let mut entry = slot.lock().await;

        let now = self.clock.now();
        if let Some(cached) = entry.as_ref() {
            if !self.is_stale(cached, now) {
                return cached.snapshot.clone();
            }
        }

        let started = Instant::now();
        let raw = self.source.fetch(host).await;

        if !raw.is_usable() {
            warn!(host, "feeder payload has no aircraft list, keeping previous snapshot");
            return match entry.as_ref() {
                Some(cached) => cached.snapshot.clone(),
                None => normalize(&raw, iso_timestamp(self.clock.now())),
            };
        }

        // Stamp with post-fetch time: a slow feeder must not hand waiters an
        // entry that is already stale.
        let refreshed_at = self.clock.now();
        let snapshot = normalize(&raw, iso_timestamp(refreshed_at));
        *entry = Some(CacheEntry {
            snapshot: snapshot.clone(),
            produced_at: refreshed_at,
        });
        debug!(
            host,
            aircraft = snapshot.aircraft.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refreshed aircraft snapshot"
        );

        self.persist_raw(&raw).await;
        snapshot
    }

    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.produced_at) > self.ttl
    }

    fn slot(&self, host: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(host.to_string()).or_default())
    }

    async fn persist_raw(&self, raw: &RawSnapshot) {
        let Some(path) = &self.raw_dump_path else {
            return;
        };
        if let Err(e) = write_raw_dump(path, raw).await {
            warn!(path = %path.display(), error = %e, "could not save raw feeder data");
        }
    }
}

/// Write `raw` to `path` as pretty JSON, replacing any previous dump.
pub async fn write_raw_dump(path: &Path, raw: &RawSnapshot) -> Result<(), PersistError> {
    let data = serde_json::to_vec_pretty(raw)?;
    tokio::fs::write(path, data).await?;
    Ok(())
}

/// ISO-8601 timestamp with millisecond precision, e.g. `2025-07-24T12:00:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn ttl_delta(ttl: Duration) -> TimeDelta {
    TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
}
