//! # Flight Feeder Fetching
//!
//! This module talks to the ADS-B feeder on the local network. Feeder software
//! differs in where it publishes its aircraft list, so instead of speaking one
//! wire format the fetcher probes the usual locations in a fixed order and takes
//! the first JSON document it gets back.
//!
//! ## Probe Order
//!
//! | # | URL                                    | Typical software          |
//! |---|----------------------------------------|---------------------------|
//! | 1 | `http://<host>:8080/data/aircraft.json` | dump1090-fa / PiAware    |
//! | 2 | `http://<host>:8754/data/aircraft.json` | FlightAware FlightFeeder |
//! | 3 | `http://<host>:80/data/aircraft.json`   | tar1090 behind lighttpd  |
//! | 4 | `http://<host>:8080/api/aircraft`       | readsb API               |
//!
//! ## Error Handling
//!
//! Every probe is bounded by the client timeout (5 seconds by default). A
//! timeout, refused connection, non-2xx status or a body that is not JSON all
//! mean "try the next endpoint"; a probe is never retried. When all of them
//! fail the fetcher falls back to [`crate::fallback`], so [`AircraftSource::fetch`]
//! always produces a [`RawSnapshot`].
//!
//! [`FeederError`] describes a single failed probe and never leaves this module
//! except in logs.

use crate::config::Config;
use crate::{fallback, RawSnapshot};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from a single endpoint probe.
#[derive(Error, Debug)]
pub enum FeederError {
    /// Connection, timeout or body read failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feeder answered with a non-success status
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// Body was not JSON
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One candidate location for the feeder's aircraft list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub port: u16,
    /// Path without the leading slash
    pub path: &'static str,
}

impl Endpoint {
    pub const fn new(port: u16, path: &'static str) -> Self {
        Endpoint { port, path }
    }

    /// Full URL of this endpoint on `host`.
    ///
    /// ```
    /// use flight_dash_lib::feeder::FEEDER_ENDPOINTS;
    ///
    /// assert_eq!(
    ///     FEEDER_ENDPOINTS[0].url("192.168.1.20"),
    ///     "http://192.168.1.20:8080/data/aircraft.json"
    /// );
    /// ```
    pub fn url(&self, host: &str) -> String {
        format!("http://{}:{}/{}", host, self.port, self.path)
    }
}

/// Endpoints probed by default, highest priority first.
pub const FEEDER_ENDPOINTS: [Endpoint; 4] = [
    Endpoint::new(8080, "data/aircraft.json"),
    Endpoint::new(8754, "data/aircraft.json"),
    Endpoint::new(80, "data/aircraft.json"),
    Endpoint::new(8080, "api/aircraft"),
];

/// Per-probe timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything that can produce the current raw aircraft payload for a host.
///
/// Implementations must be total: when the data cannot be fetched they return
/// a fallback payload instead of an error.
pub trait AircraftSource: Send + Sync {
    fn fetch(&self, host: &str) -> impl Future<Output = RawSnapshot> + Send;
}

/// HTTP client for the flight feeder.
pub struct FeederClient {
    client: Client,
    endpoints: Vec<Endpoint>,
    sample_path: PathBuf,
}

impl FeederClient {
    /// Client probing [`FEEDER_ENDPOINTS`] with the given per-request timeout.
    pub fn new(timeout: Duration, sample_path: impl Into<PathBuf>) -> Result<Self, FeederError> {
        // The feeder sits on the LAN; never route it through a proxy
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(FeederClient {
            client,
            endpoints: FEEDER_ENDPOINTS.to_vec(),
            sample_path: sample_path.into(),
        })
    }

    /// Client built from the `[feeder]` and `[files]` config sections.
    pub fn from_config(config: &Config) -> Result<Self, FeederError> {
        Self::new(config.feeder.timeout(), &config.files.sample_path)
    }

    /// Probe a different endpoint list, in the given order.
    pub fn with_endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Try each endpoint in order and return the first JSON payload.
    ///
    /// `None` when every endpoint failed.
    pub async fn probe_endpoints(&self, host: &str) -> Option<RawSnapshot> {
        for endpoint in &self.endpoints {
            let url = endpoint.url(host);
            debug!(%url, "trying feeder endpoint");

            match self.probe(&url).await {
                Ok(raw) => {
                    info!(%url, "connected to flight feeder");
                    return Some(raw);
                }
                Err(e) => debug!(%url, error = %e, "feeder endpoint failed"),
            }
        }
        None
    }

    async fn probe(&self, url: &str) -> Result<RawSnapshot, FeederError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeederError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(RawSnapshot(serde_json::from_slice(&body)?))
    }
}

impl AircraftSource for FeederClient {
    async fn fetch(&self, host: &str) -> RawSnapshot {
        if let Some(raw) = self.probe_endpoints(host).await {
            return raw;
        }

        warn!(
            host,
            endpoints = self.endpoints.len(),
            "could not reach flight feeder on any known endpoint"
        );
        fallback::sample_or_placeholder(&self.sample_path, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe_order() {
        let urls: Vec<String> = FEEDER_ENDPOINTS.iter().map(|e| e.url("feeder")).collect();
        assert_eq!(
            urls,
            [
                "http://feeder:8080/data/aircraft.json",
                "http://feeder:8754/data/aircraft.json",
                "http://feeder:80/data/aircraft.json",
                "http://feeder:8080/api/aircraft",
            ]
        );
    }

    #[test]
    fn test_client_uses_default_endpoints() {
        let client = FeederClient::new(DEFAULT_TIMEOUT, "flight_data.json").unwrap();
        assert_eq!(client.endpoints(), FEEDER_ENDPOINTS.as_slice());

        let custom = vec![Endpoint::new(9000, "aircraft.json")];
        let client = client.with_endpoints(custom.clone());
        assert_eq!(client.endpoints(), custom.as_slice());
    }

    #[test]
    fn test_status_error_message() {
        let err = FeederError::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "unexpected status 404 Not Found");
    }
}
