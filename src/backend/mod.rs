//! Access to the rig's telemetry and settings backend.

mod client;
pub mod models;

use chrono::{DateTime, Utc};
use std::future::Future;

pub use client::BackendClient;
pub use models::{LampState, Sample, Settings};

use crate::error::AppResult;

/// Operations the dashboard needs from the backend.
///
/// [`BackendClient`] talks HTTP; tests substitute an in-memory double.
pub trait TelemetryBackend: Send + Sync + 'static {
    /// Samples between optional bounds, in backend order.
    fn fetch_samples(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> impl Future<Output = AppResult<Vec<Sample>>> + Send;

    /// Newest sample, if the backend has any.
    fn latest_sample(&self) -> impl Future<Output = AppResult<Option<Sample>>> + Send;

    fn settings(&self) -> impl Future<Output = AppResult<Settings>> + Send;

    /// Replace the full settings object. There is no partial update.
    fn update_settings(&self, settings: &Settings) -> impl Future<Output = AppResult<()>> + Send;
}
