//! Test doubles shared by the scenario tests: a hand-driven clock, a scripted
//! aircraft source and a fake flight feeder served over HTTP.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use flight_dash_lib::{cache::Clock, feeder::AircraftSource, RawSnapshot};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2025, 7, 24, 12, 0, 0).unwrap();
        ManualClock(Arc::new(Mutex::new(start)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::TimeDelta::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Source returning queued payloads in order, repeating the last one.
pub struct ScriptedSource {
    payloads: Mutex<VecDeque<RawSnapshot>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    clock_step: Option<(ManualClock, Duration)>,
}

impl ScriptedSource {
    pub fn new(payloads: Vec<RawSnapshot>) -> Self {
        assert!(!payloads.is_empty(), "script needs at least one payload");
        ScriptedSource {
            payloads: Mutex::new(payloads.into()),
            calls: AtomicUsize::new(0),
            delay: None,
            clock_step: None,
        }
    }

    /// Make every fetch take `delay`.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Move `clock` forward by `by` while each fetch is in flight.
    pub fn advancing(mut self, clock: &ManualClock, by: Duration) -> Self {
        self.clock_step = Some((clock.clone(), by));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_payload(&self) -> RawSnapshot {
        let mut payloads = self.payloads.lock().unwrap();
        if payloads.len() > 1 {
            payloads.pop_front().unwrap()
        } else {
            payloads[0].clone()
        }
    }
}

impl AircraftSource for ScriptedSource {
    async fn fetch(&self, _host: &str) -> RawSnapshot {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((clock, by)) = &self.clock_step {
            clock.advance(*by);
        }
        self.next_payload()
    }
}

/// Source that blows up mid-refresh.
pub struct PanickingSource;

impl AircraftSource for PanickingSource {
    async fn fetch(&self, _host: &str) -> RawSnapshot {
        panic!("feeder exploded")
    }
}

/// Typical dump1090 payload with `n` positioned aircraft and one without.
pub fn feeder_payload(n: usize, messages: u64) -> RawSnapshot {
    let mut aircraft: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "hex": format!("4ca{:03x}", i),
                "flight": format!("EIN{}   ", i),
                "lat": 53.0 + i as f64 / 10.0,
                "lon": -6.0,
                "alt_baro": 3000 + i * 100,
                "alt_geom": 3100 + i * 100,
                "gs": 200.5,
                "track": 90,
                "category": "A3",
                "squawk": "2000",
                "rssi": -20.1
            })
        })
        .collect();
    aircraft.push(json!({"hex": "nopos1", "alt_baro": 12000}));

    RawSnapshot(json!({ "now": 1753358400.0, "messages": messages, "aircraft": aircraft }))
}

/// A port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[derive(Default)]
struct FeederState {
    data_hits: AtomicUsize,
    api_hits: AtomicUsize,
}

/// Fake flight feeder on a random local port.
///
/// - `/data/aircraft.json`: 200, payload with `"messages": 5`
/// - `/api/aircraft`: 200, payload with `"messages": 4`
/// - `/broken/aircraft.json`: 500
/// - `/garbage/aircraft.json`: 200 with a body that is not JSON
/// - `/slow/aircraft.json`: answers after two seconds
/// - anything else: 404
pub struct FakeFeeder {
    addr: SocketAddr,
    state: Arc<FeederState>,
}

impl FakeFeeder {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(FeederState::default());

        let app = Router::new()
            .route("/data/aircraft.json", get(data_aircraft))
            .route("/api/aircraft", get(api_aircraft))
            .route("/broken/aircraft.json", get(broken))
            .route("/garbage/aircraft.json", get(garbage))
            .route("/slow/aircraft.json", get(slow))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeFeeder { addr, state }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn data_hits(&self) -> usize {
        self.state.data_hits.load(Ordering::SeqCst)
    }

    pub fn api_hits(&self) -> usize {
        self.state.api_hits.load(Ordering::SeqCst)
    }
}

async fn data_aircraft(State(state): State<Arc<FeederState>>) -> Json<RawSnapshot> {
    state.data_hits.fetch_add(1, Ordering::SeqCst);
    Json(feeder_payload(2, 5))
}

async fn api_aircraft(State(state): State<Arc<FeederState>>) -> Json<RawSnapshot> {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    Json(feeder_payload(3, 4))
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "feeder restarting")
}

async fn garbage() -> &'static str {
    "<html>PiAware status page</html>"
}

async fn slow() -> Json<RawSnapshot> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(feeder_payload(1, 1))
}
