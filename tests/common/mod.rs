//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mussel_dash::backend::{LampState, Sample, Settings, TelemetryBackend};
use mussel_dash::control::LampConfirmation;
use mussel_dash::error::{AppError, AppResult};
use mussel_dash::session::{RangeInput, SessionOptions};
use mussel_dash::timeconv::CivilZone;

pub type Bounds = (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn sample(timestamp: DateTime<Utc>, temperature: f64, od_value: f64, pump_speed: f64) -> Sample {
    Sample {
        temperature: Some(temperature),
        od_value: Some(od_value),
        pump_speed: Some(pump_speed),
        ..Sample::at(timestamp)
    }
}

pub fn copenhagen() -> CivilZone {
    CivilZone::Named(chrono_tz::Europe::Copenhagen)
}

pub fn test_options() -> SessionOptions {
    SessionOptions {
        zone: copenhagen(),
        default_from_day: NaiveDate::from_ymd_opt(2025, 6, 18),
        live_poll_interval: Duration::from_secs(3),
        status_poll_interval: Duration::from_secs(2),
        lamp_confirmation: LampConfirmation {
            attempts: 3,
            delay: Duration::from_millis(500),
        },
    }
}

pub fn range(from_time: &str) -> RangeInput {
    RangeInput {
        from_day: Some("2025-06-18".to_string()),
        from_time: Some(from_time.to_string()),
        to_day: None,
        to_time: None,
    }
}

/// In-memory backend recording every call.
#[derive(Default)]
pub struct MockBackend {
    pub samples: Mutex<Vec<Sample>>,
    pub fetch_calls: Mutex<Vec<Bounds>>,
    pub fail_fetch: AtomicBool,
    /// Never answer `/data`, like a backend that accepted the connection and went silent
    pub hang_fetch: AtomicBool,
    pub latest: Mutex<Option<Sample>>,
    pub fail_latest: AtomicBool,
    pub latest_calls: AtomicUsize,
    pub settings: Mutex<Settings>,
    pub fail_settings: AtomicBool,
    pub posted: Mutex<Vec<Settings>>,
    /// Mirror posted lamp states into the latest sample, like a live controller
    pub reflect_lamp: AtomicBool,
}

impl MockBackend {
    pub fn with_samples(samples: Vec<Sample>) -> Self {
        let backend = Self::default();
        *backend.samples.lock().unwrap() = samples;
        backend
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }

    pub fn last_fetch(&self) -> Option<Bounds> {
        self.fetch_calls.lock().unwrap().last().copied()
    }

    pub fn set_latest_lamp(&self, state: Option<LampState>) {
        let mut latest = self.latest.lock().unwrap();
        let sample = latest.get_or_insert_with(|| Sample::at(utc(2025, 6, 18, 10, 0, 0)));
        sample.lamp_state = state;
    }
}

impl TelemetryBackend for MockBackend {
    async fn fetch_samples(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Sample>> {
        self.fetch_calls.lock().unwrap().push((from, to));
        if self.hang_fetch.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::Backend("connection refused".to_string()));
        }
        Ok(self.samples.lock().unwrap().clone())
    }

    async fn latest_sample(&self) -> AppResult<Option<Sample>> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_latest.load(Ordering::SeqCst) {
            return Err(AppError::Backend("connection refused".to_string()));
        }
        Ok(self.latest.lock().unwrap().clone())
    }

    async fn settings(&self) -> AppResult<Settings> {
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(AppError::Backend("connection refused".to_string()));
        }
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn update_settings(&self, settings: &Settings) -> AppResult<()> {
        self.posted.lock().unwrap().push(settings.clone());
        *self.settings.lock().unwrap() = settings.clone();
        if self.reflect_lamp.load(Ordering::SeqCst) {
            self.set_latest_lamp(Some(settings.lamp_state));
        }
        Ok(())
    }
}

/// State behind the fake HTTP backend.
pub struct FakeBackend {
    pub data: Mutex<Value>,
    pub data_queries: Mutex<Vec<HashMap<String, String>>>,
    pub fail_data: AtomicBool,
    pub latest: Mutex<Value>,
    pub settings: Mutex<Value>,
    pub posted: Mutex<Vec<Value>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            data: Mutex::new(json!([])),
            data_queries: Mutex::new(Vec::new()),
            fail_data: AtomicBool::new(false),
            latest: Mutex::new(json!({})),
            settings: Mutex::new(json!({
                "target_temp": 25.0,
                "lamp_state": "OFF",
                "pid_p": 0.0,
                "pid_i": 0.0,
                "pid_d": 0.0,
            })),
            posted: Mutex::new(Vec::new()),
        }
    }
}

async fn fake_data(
    State(fake): State<Arc<FakeBackend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.data_queries.lock().unwrap().push(params);
    if fake.fail_data.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database locked").into_response();
    }
    let body = fake.data.lock().unwrap().clone();
    Json(body).into_response()
}

async fn fake_latest(State(fake): State<Arc<FakeBackend>>) -> Json<Value> {
    Json(fake.latest.lock().unwrap().clone())
}

async fn fake_get_settings(State(fake): State<Arc<FakeBackend>>) -> Json<Value> {
    Json(fake.settings.lock().unwrap().clone())
}

async fn fake_post_settings(
    State(fake): State<Arc<FakeBackend>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    fake.posted.lock().unwrap().push(body.clone());
    *fake.settings.lock().unwrap() = body;
    Json(json!({ "message": "Settings updated successfully" }))
}

/// Serve a fake telemetry backend on an ephemeral port.
///
/// Returns its base URL and the shared state.
pub async fn spawn_fake_backend() -> (String, Arc<FakeBackend>) {
    let fake = Arc::new(FakeBackend::default());

    let app = Router::new()
        .route("/data", get(fake_data))
        .route("/data/latest", get(fake_latest))
        .route("/settings", get(fake_get_settings).post(fake_post_settings))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), fake)
}
