//! The dashboard session: one owner for everything an operator sees.
//!
//! Every UI action arrives as an [`Intent`] and goes through
//! [`DashboardSession::dispatch`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;

use crate::backend::{Settings, TelemetryBackend};
use crate::charts::ChartState;
use crate::config::Config;
use crate::control::{self, LampConfirmation, LampToggleOutcome, SettingField};
use crate::error::AppResult;
use crate::polling::{LivePoller, TelemetryDisplay};
use crate::timeconv::{local_input_to_utc, CivilZone};

/// Date/time range fields as the operator entered them.
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RangeInput {
    /// `YYYY-MM-DD`; defaults to the configured day, else today
    #[serde(default)]
    pub from_day: Option<String>,
    /// `HH:MM`; no lower bound when absent
    #[serde(default)]
    pub from_time: Option<String>,
    /// `YYYY-MM-DD`; defaults to `from_day`
    #[serde(default)]
    pub to_day: Option<String>,
    /// `HH:MM`; no upper bound when absent
    #[serde(default)]
    pub to_time: Option<String>,
}

/// A typed operator action
#[derive(Debug, Clone)]
pub enum Intent {
    SetLiveMode { enabled: bool, range: RangeInput },
    Fetch(RangeInput),
    EditSetting { field: SettingField, value: f64 },
    ToggleLamp,
}

#[derive(Debug, Clone)]
pub enum IntentOutcome {
    /// Chart state may have changed; `fetched` is the sample count when a
    /// fetch succeeded.
    Charts { fetched: Option<usize> },
    Settings(Settings),
    Lamp(LampToggleOutcome),
}

/// Live-mode state for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveMode {
    pub enabled: bool,
    pub from: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub zone: CivilZone,
    pub default_from_day: Option<NaiveDate>,
    pub live_poll_interval: Duration,
    pub status_poll_interval: Duration,
    pub lamp_confirmation: LampConfirmation,
}

impl SessionOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            zone: CivilZone::resolve(&config.display_timezone),
            default_from_day: config.default_from_day,
            live_poll_interval: config.live_poll_interval(),
            status_poll_interval: config.status_poll_interval(),
            lamp_confirmation: LampConfirmation {
                attempts: config.lamp_confirm_attempts,
                delay: config.lamp_confirm_delay(),
            },
        }
    }
}

pub struct DashboardSession<B> {
    backend: Arc<B>,
    options: SessionOptions,
    chart: Arc<RwLock<ChartState>>,
    poller: Mutex<LivePoller>,
    display: RwLock<TelemetryDisplay>,
    settings: RwLock<Option<Settings>>,
}

impl<B: TelemetryBackend> DashboardSession<B> {
    #[must_use]
    pub fn new(backend: B, options: SessionOptions) -> Self {
        let poller = LivePoller::new(options.live_poll_interval);
        Self {
            backend: Arc::new(backend),
            options,
            chart: Arc::new(RwLock::new(ChartState::new())),
            poller: Mutex::new(poller),
            display: RwLock::new(TelemetryDisplay::default()),
            settings: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply one operator action.
    ///
    /// # Errors
    ///
    /// Returns `AppError::TimeInput` for unparsable range fields and
    /// `AppError::Backend` when a user-triggered backend call fails. Chart
    /// state is left untouched on failure.
    pub async fn dispatch(&self, intent: Intent) -> AppResult<IntentOutcome> {
        tracing::debug!(?intent, "Dispatching intent");

        match intent {
            Intent::SetLiveMode { enabled, range } => self.set_live_mode(enabled, &range).await,
            Intent::Fetch(range) => self.fetch(&range).await,
            Intent::EditSetting { field, value } => {
                let settings = control::apply_setting(self.backend.as_ref(), field, value).await?;
                *self.settings.write().await = Some(settings.clone());
                Ok(IntentOutcome::Settings(settings))
            }
            Intent::ToggleLamp => {
                let outcome = control::toggle_lamp(
                    self.backend.as_ref(),
                    &self.display,
                    self.options.lamp_confirmation,
                )
                .await?;
                *self.settings.write().await = Some(outcome.settings.clone());
                Ok(IntentOutcome::Lamp(outcome))
            }
        }
    }

    // The poller lock is only held to start or stop the loop, never across a
    // backend call.
    async fn set_live_mode(&self, enabled: bool, range: &RangeInput) -> AppResult<IntentOutcome> {
        if !enabled {
            self.poller.lock().await.stop();
            return Ok(IntentOutcome::Charts { fetched: None });
        }

        let (from, _) = self.resolve_range(range, false)?;
        self.start_polling(&mut *self.poller.lock().await, from);

        // Show data right away instead of waiting a full period
        let fetched = match self.fetch_and_redraw(from, None).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "Initial live fetch failed");
                None
            }
        };

        Ok(IntentOutcome::Charts { fetched })
    }

    async fn fetch(&self, range: &RangeInput) -> AppResult<IntentOutcome> {
        let (from, to) = {
            let mut poller = self.poller.lock().await;
            let live = poller.is_running();

            // Live mode has no upper bound
            let bounds = self.resolve_range(range, !live)?;
            if live {
                self.start_polling(&mut poller, bounds.0);
            }
            bounds
        };

        let fetched = self.fetch_and_redraw(from, to).await?;
        Ok(IntentOutcome::Charts {
            fetched: Some(fetched),
        })
    }

    fn start_polling(&self, poller: &mut LivePoller, from: Option<DateTime<Utc>>) {
        let backend = Arc::clone(&self.backend);
        let chart = Arc::clone(&self.chart);
        let zone = self.options.zone;

        poller.start(from, move |from| {
            let backend = Arc::clone(&backend);
            let chart = Arc::clone(&chart);
            async move {
                match fetch_and_redraw(backend.as_ref(), &chart, &zone, from, None).await {
                    Ok(count) => tracing::debug!(samples = count, "Live poll tick"),
                    Err(e) => tracing::warn!(error = %e, "Live poll tick failed"),
                }
            }
        });
    }

    async fn fetch_and_redraw(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<usize> {
        fetch_and_redraw(self.backend.as_ref(), &self.chart, &self.options.zone, from, to).await
    }

    /// Turn operator range fields into query bounds.
    fn resolve_range(
        &self,
        range: &RangeInput,
        include_upper: bool,
    ) -> AppResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let zone = &self.options.zone;
        let from_day = non_empty(range.from_day.as_deref()).map_or_else(
            || self.default_day().format("%Y-%m-%d").to_string(),
            str::to_string,
        );

        let from = local_input_to_utc(zone, &from_day, range.from_time.as_deref().unwrap_or(""))?;

        let to = if include_upper {
            let to_day = non_empty(range.to_day.as_deref()).unwrap_or(&from_day);
            local_input_to_utc(zone, to_day, range.to_time.as_deref().unwrap_or(""))?
        } else {
            None
        };

        Ok((from, to))
    }

    fn default_day(&self) -> NaiveDate {
        self.options
            .default_from_day
            .unwrap_or_else(|| self.options.zone.today())
    }

    /// Copy of the current charts
    pub async fn chart(&self) -> ChartState {
        self.chart.read().await.clone()
    }

    pub async fn live_mode(&self) -> LiveMode {
        let poller = self.poller.lock().await;
        LiveMode {
            enabled: poller.is_running(),
            from: poller.from_bound(),
        }
    }

    /// Copy of the live readout
    pub async fn display(&self) -> TelemetryDisplay {
        self.display.read().await.clone()
    }

    /// Pull the newest sample into the live readout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if `/data/latest` cannot be read. The
    /// previous readout is kept.
    pub async fn refresh_status(&self) -> AppResult<()> {
        if let Some(sample) = self.backend.latest_sample().await? {
            self.display.write().await.update(sample);
        }
        Ok(())
    }

    /// Current settings from the backend.
    ///
    /// Falls back to the last known copy when the backend is unreachable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` when the backend fails and no copy exists.
    pub async fn current_settings(&self) -> AppResult<Settings> {
        match self.backend.settings().await {
            Ok(settings) => {
                *self.settings.write().await = Some(settings.clone());
                Ok(settings)
            }
            Err(e) => match self.settings.read().await.clone() {
                Some(cached) => {
                    tracing::warn!(error = %e, "Settings refresh failed, serving last known copy");
                    Ok(cached)
                }
                None => Err(e),
            },
        }
    }

    /// Stop live polling. Used on shutdown.
    pub async fn shutdown(&self) {
        self.poller.lock().await.stop();
    }
}

async fn fetch_and_redraw<B: TelemetryBackend>(
    backend: &B,
    chart: &RwLock<ChartState>,
    zone: &CivilZone,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> AppResult<usize> {
    let samples = backend.fetch_samples(from, to).await?;
    chart.write().await.replace(&samples, zone);
    Ok(samples.len())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
