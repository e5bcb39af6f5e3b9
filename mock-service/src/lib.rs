//! A service to point load tests at: controllable latency, status codes, error ratios and
//! rate limits, plus an orchestrator stand-in that records job callbacks.
use axum::{
    debug_handler,
    extract::{Json, Path},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use lazy_static::lazy_static;
#[allow(unused)]
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

pub fn router() -> Router {
    Router::new()
        .route("/delay/ms/:delay_ms", get(delay))
        .route("/status/:code", get(status))
        .route("/status/:code/delay/ms/:delay_ms", get(status_delay))
        .route("/flaky/:error_pct/scenario/:scenario_name", get(flaky))
        .route(
            "/max/:max_tps/delay/ms/:delay_ms/scenario/:scenario_name",
            get(max),
        )
        .route("/agents/scenario/:scenario_name", get(agents))
        .route("/seen/:scenario_name", get(seen))
        .route("/hang", get(hang))
        .route("/jobs/:job_id/:signal", post(callback))
        .route("/jobs/:job_id", get(callbacks))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => panic!("mock-service failed to bind {addr}: {err}"),
    };
    if let Err(err) = axum::serve(listener, router()).await {
        panic!("mock-service stopped: {err}");
    }
}

fn hit() {
    counter!("mock-service.requests").increment(1);
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
}

#[debug_handler]
pub async fn delay(Path(delay_ms): Path<u64>) {
    hit();
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

#[debug_handler]
pub async fn status(Path(code): Path<u16>) -> StatusCode {
    hit();
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

#[debug_handler]
pub async fn status_delay(Path((code, delay_ms)): Path<(u16, u64)>) -> StatusCode {
    hit();
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Waits longer than any sane request timeout.
#[debug_handler]
pub async fn hang() {
    hit();
    tokio::time::sleep(Duration::from_secs(3600)).await;
}

lazy_static! {
    static ref FLAKY_MAP: Arc<RwLock<HashMap<String, Arc<AtomicU64>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Deterministic error ratio: `error_pct` of every 100 requests in a scenario get a 500, spread evenly.
#[debug_handler]
pub async fn flaky(Path((error_pct, scenario_name)): Path<(u64, String)>) -> StatusCode {
    hit();

    let read = FLAKY_MAP.read().ok().and_then(|map| map.get(&scenario_name).cloned());
    let count = match read {
        Some(count) => count,
        None => {
            let mut map = match FLAKY_MAP.write() {
                Ok(map) => map,
                Err(_) => return StatusCode::INTERNAL_SERVER_ERROR,
            };
            map.entry(scenario_name).or_default().clone()
        }
    };

    if count.fetch_add(1, Ordering::Relaxed) * error_pct % 100 < error_pct {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

lazy_static! {
    static ref MAX_MAP: Arc<RwLock<HashMap<String, DefaultDirectRateLimiter>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Answers 503 once the scenario goes over `max_tps`.
#[debug_handler]
pub async fn max(
    Path((max_tps, delay_ms, scenario_name)): Path<(u32, u64, String)>,
) -> Result<(), StatusCode> {
    hit();
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    {
        let map = MAX_MAP
            .read()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if let Some(limiter) = map.get(&scenario_name) {
            return match limiter.check() {
                Ok(_) => Ok(()),
                Err(_) => {
                    debug!("Scenario {scenario_name} over {max_tps} TPS");
                    Err(StatusCode::SERVICE_UNAVAILABLE)
                }
            };
        }
    }

    let limiter = rate_limiter(max_tps).ok_or(StatusCode::BAD_REQUEST)?;
    // NOTE: The first request only installs the limiter
    let _ = limiter.check();
    MAX_MAP
        .write()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .insert(scenario_name, limiter);
    Ok(())
}

lazy_static! {
    static ref AGENTS_MAP: Arc<RwLock<HashMap<String, Vec<String>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Records the caller's User-Agent under the scenario.
#[debug_handler]
pub async fn agents(Path(scenario_name): Path<String>, headers: HeaderMap) -> StatusCode {
    hit();
    let agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    match AGENTS_MAP.write() {
        Ok(mut map) => {
            map.entry(scenario_name).or_default().push(agent);
            StatusCode::OK
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[debug_handler]
pub async fn seen(Path(scenario_name): Path<String>) -> Result<Json<Vec<String>>, StatusCode> {
    let map = AGENTS_MAP
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(map.get(&scenario_name).cloned().unwrap_or_default()))
}

/** Orchestrator stand-in **/

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedCallback {
    pub signal: String,
    pub body: serde_json::Value,
}

lazy_static! {
    static ref CALLBACKS: Arc<RwLock<HashMap<String, Vec<RecordedCallback>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

#[debug_handler]
pub async fn callback(
    Path((job_id, signal)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    debug!("Job {job_id} reported {signal}");
    match CALLBACKS.write() {
        Ok(mut map) => {
            map.entry(job_id)
                .or_default()
                .push(RecordedCallback { signal, body });
            StatusCode::OK
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[debug_handler]
pub async fn callbacks(
    Path(job_id): Path<String>,
) -> Result<Json<Vec<RecordedCallback>>, StatusCode> {
    let map = CALLBACKS
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(map.get(&job_id).cloned().unwrap_or_default()))
}

/** Utils **/

pub fn rate_limiter(tps: u32) -> Option<DefaultDirectRateLimiter> {
    NonZeroU32::new(tps).map(|tps| RateLimiter::direct(Quota::per_second(tps)))
}

/** TPS Printer **/

static TPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn tps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let transactions = TPS_MEASURE.swap(0, Ordering::Relaxed);
        if transactions > 0 {
            debug!("{transactions} TPS");
        }
        gauge!("mock-service.tps").set(transactions as f64);
    }
}
