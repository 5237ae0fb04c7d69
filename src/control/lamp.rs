use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::backend::{LampState, Settings, TelemetryBackend};
use crate::control::settings::read_modify_write;
use crate::error::AppResult;
use crate::polling::TelemetryDisplay;

/// How long to wait for the controller to report a requested lamp state.
#[derive(Debug, Clone, Copy)]
pub struct LampConfirmation {
    pub attempts: u32,
    pub delay: Duration,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LampToggleOutcome {
    /// Authoritative state when the toggle was requested
    pub previous: LampState,
    pub requested: LampState,
    /// Whether the backend reported `requested` within the attempt budget
    pub confirmed: bool,
    pub attempts: u32,
    /// State shown after the final refresh (null if the backend reported none)
    pub displayed: Option<LampState>,
    /// Settings object as submitted
    pub settings: Settings,
}

/// Lamp state as the backend last reported it.
///
/// Prefers the newest telemetry sample and falls back to the stored settings
/// when the sample does not carry one.
///
/// # Errors
///
/// Returns `AppError::Backend` if the backend cannot be read.
pub async fn authoritative_lamp_state<B: TelemetryBackend>(backend: &B) -> AppResult<LampState> {
    if let Some(state) = backend.latest_sample().await?.and_then(|s| s.lamp_state) {
        return Ok(state);
    }
    Ok(backend.settings().await?.lamp_state)
}

/// Invert the lamp and wait for the controller to confirm it.
///
/// The display is only ever updated from backend reports, so an unconfirmed
/// request leaves the last reported state on screen.
///
/// # Errors
///
/// Returns `AppError::Backend` if the current state cannot be read or the
/// new setting cannot be submitted. Confirmation failures are not errors.
pub async fn toggle_lamp<B: TelemetryBackend>(
    backend: &B,
    display: &RwLock<TelemetryDisplay>,
    confirmation: LampConfirmation,
) -> AppResult<LampToggleOutcome> {
    let previous = authoritative_lamp_state(backend).await?;
    let requested = previous.toggled();

    let settings = read_modify_write(backend, |s| s.lamp_state = requested).await?;
    tracing::info!(%previous, %requested, "Lamp toggle submitted");

    let mut confirmed = false;
    let mut attempts = 0;
    while attempts < confirmation.attempts {
        attempts += 1;
        tokio::time::sleep(confirmation.delay).await;

        match backend.latest_sample().await {
            Ok(Some(sample)) => {
                let reported = sample.lamp_state;
                display.write().await.update(sample);
                if reported == Some(requested) {
                    confirmed = true;
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, attempt = attempts, "Lamp confirmation poll failed");
            }
        }
    }

    // Final refresh regardless of the outcome
    match backend.latest_sample().await {
        Ok(Some(sample)) => display.write().await.update(sample),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Lamp state refresh failed"),
    }

    let displayed = display.read().await.lamp_state();
    if confirmed {
        tracing::info!(%requested, attempts, "Lamp state confirmed");
    } else {
        tracing::warn!(
            %requested,
            attempts,
            displayed = ?displayed,
            "Lamp state not confirmed by backend"
        );
    }

    Ok(LampToggleOutcome {
        previous,
        requested,
        confirmed,
        attempts,
        displayed,
        settings,
    })
}
