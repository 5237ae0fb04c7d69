//! Tests for the HTTP backend client against a local fake backend.
//!
//! Run with: cargo test --test backend_client_test

mod common;

use common::{spawn_fake_backend, utc};
use mussel_dash::backend::{BackendClient, LampState, Settings};
use mussel_dash::config::Config;
use mussel_dash::error::AppError;
use serde_json::json;
use std::sync::atomic::Ordering;

fn client_for(base_url: &str) -> BackendClient {
    let config = Config {
        backend_base_url: base_url.to_string(),
        backend_timeout_seconds: Some(5),
        ..Config::default()
    };
    BackendClient::new(&config).unwrap()
}

#[tokio::test]
async fn data_query_carries_only_present_bounds() {
    let (url, fake) = spawn_fake_backend().await;
    let client = client_for(&url);

    client.get_data(None, None).await.unwrap();
    client
        .get_data(Some(utc(2025, 6, 18, 10, 0, 0)), None)
        .await
        .unwrap();
    client
        .get_data(
            Some(utc(2025, 6, 18, 10, 0, 0)),
            Some(utc(2025, 6, 18, 11, 30, 0)),
        )
        .await
        .unwrap();

    let queries = fake.data_queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 3);
    assert!(queries[0].is_empty());

    assert_eq!(queries[1].len(), 1);
    assert_eq!(queries[1]["from_time"], "2025-06-18T10:00:00.000Z");

    assert_eq!(queries[2]["from_time"], "2025-06-18T10:00:00.000Z");
    assert_eq!(queries[2]["to_time"], "2025-06-18T11:30:00.000Z");
}

#[tokio::test]
async fn samples_parse_naive_timestamps_as_utc() {
    let (url, fake) = spawn_fake_backend().await;
    *fake.data.lock().unwrap() = json!([
        {
            "timestamp": "2025-06-18T10:00:03",
            "temperature": 18.2,
            "od_value": 1200.0,
            "pump_speed": 45.0,
            "lamp_state": "ON"
        },
        { "timestamp": "2025-06-18T10:00:06.250", "temperature": null }
    ]);

    let samples = client_for(&url).get_data(None, None).await.unwrap();

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].timestamp, utc(2025, 6, 18, 10, 0, 3));
    assert_eq!(samples[0].temperature, Some(18.2));
    assert_eq!(samples[0].lamp_state, Some(LampState::On));
    assert_eq!(samples[1].temperature, None);
    assert_eq!(samples[1].od_value, None);
    assert_eq!(samples[1].timestamp.timestamp_subsec_millis(), 250);
}

#[tokio::test]
async fn empty_latest_means_no_sample() {
    let (url, fake) = spawn_fake_backend().await;
    let client = client_for(&url);

    assert_eq!(client.get_latest().await.unwrap(), None);

    *fake.latest.lock().unwrap() = json!({
        "timestamp": "2025-06-18T10:00:03",
        "temperature": 18.2,
        "lamp_state": "OFF"
    });
    let latest = client.get_latest().await.unwrap().unwrap();
    assert_eq!(latest.temperature, Some(18.2));
    assert_eq!(latest.lamp_state, Some(LampState::Off));
}

#[tokio::test]
async fn error_status_is_a_backend_error() {
    let (url, fake) = spawn_fake_backend().await;
    fake.fail_data.store(true, Ordering::SeqCst);

    let result = client_for(&url).get_data(None, None).await;

    assert!(matches!(result, Err(AppError::Backend(ref msg)) if msg.contains("500")));
}

#[tokio::test]
async fn malformed_body_is_a_backend_error() {
    let (url, fake) = spawn_fake_backend().await;
    *fake.data.lock().unwrap() = json!({ "detail": "not a list" });

    let result = client_for(&url).get_data(None, None).await;

    assert!(matches!(result, Err(AppError::Backend(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_backend_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client_for(&format!("http://{addr}")).get_settings().await;

    assert!(matches!(result, Err(AppError::Backend(_))));
}

#[tokio::test]
async fn settings_round_trip_as_full_object() {
    let (url, fake) = spawn_fake_backend().await;
    let client = client_for(&url);

    let mut settings = client.get_settings().await.unwrap();
    assert_eq!(settings, Settings::default());

    settings.pid_p = 1.5;
    settings.lamp_state = LampState::On;
    client.post_settings(&settings).await.unwrap();

    let posted = fake.posted.lock().unwrap().clone();
    assert_eq!(
        posted,
        vec![json!({
            "target_temp": 25.0,
            "lamp_state": "ON",
            "pid_p": 1.5,
            "pid_i": 0.0,
            "pid_d": 0.0,
        })]
    );
    assert_eq!(client.get_settings().await.unwrap(), settings);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let (url, _fake) = spawn_fake_backend().await;
    let client = client_for(&format!("{url}/"));

    assert_eq!(client.base_url(), url);
    assert!(client.get_data(None, None).await.unwrap().is_empty());
}
