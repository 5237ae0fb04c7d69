use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};

use crate::backend::{LampState, Sample, TelemetryBackend};
use crate::charts::Metric;
use crate::session::DashboardSession;

/// Shown in place of a reading the backend did not provide.
pub const PLACEHOLDER: &str = "--";

#[must_use]
pub fn display_value(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// The live readout: newest sample as last reported by the backend.
#[derive(Debug, Clone, Default)]
pub struct TelemetryDisplay {
    latest: Option<Sample>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl TelemetryDisplay {
    pub fn update(&mut self, sample: Sample) {
        self.latest = Some(sample);
        self.refreshed_at = Some(Utc::now());
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Sample> {
        self.latest.as_ref()
    }

    /// Authoritative lamp state, if the backend reported one
    #[must_use]
    pub fn lamp_state(&self) -> Option<LampState> {
        self.latest.as_ref().and_then(|s| s.lamp_state)
    }

    #[must_use]
    pub fn value(&self, metric: Metric) -> String {
        display_value(self.latest.as_ref().and_then(|s| metric.value_of(s)))
    }

    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

/// Keep the live readout current by polling `/data/latest`.
///
/// Runs until the task is dropped. Failed refreshes are logged and the
/// previous readout stays on display.
pub async fn run_status_monitor<B: TelemetryBackend>(session: Arc<DashboardSession<B>>) {
    let period = session.options().status_poll_interval;

    tracing::info!(
        interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        "Starting telemetry status monitor"
    );

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately
        ticker.tick().await;

        if let Err(e) = session.refresh_status().await {
            tracing::warn!(error = %e, "Telemetry status refresh failed");
        }
    }
}
