use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::Settings;
use crate::charts::Metric;
use crate::common::AppState;
use crate::control::{LampToggleOutcome, SettingField};
use crate::error::{AppError, AppResult};
use crate::polling::PLACEHOLDER;
use crate::session::{Intent, IntentOutcome};

/// Live readout, with `--` for anything the backend did not report
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub temperature: String,
    pub pump_speed: String,
    pub od_value: String,
    pub lamp_state: String,
    /// Timestamp of the displayed sample
    pub sample_time: Option<DateTime<Utc>>,
    /// When the readout was last refreshed from the backend
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettingValue {
    pub value: f64,
}

/// Get the live telemetry readout
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Latest reported telemetry", body = StatusResponse),
    ),
    tag = "control"
)]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let display = state.session.display().await;

    Json(StatusResponse {
        temperature: display.value(Metric::Temperature),
        pump_speed: display.value(Metric::PumpSpeed),
        od_value: display.value(Metric::OdValue),
        lamp_state: display
            .lamp_state()
            .map_or_else(|| PLACEHOLDER.to_string(), |s| s.to_string()),
        sample_time: display.latest().map(|s| s.timestamp),
        refreshed_at: display.refreshed_at(),
    })
}

/// Get the controller settings
///
/// Serves the last known copy if the backend is unreachable.
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current settings", body = Settings),
        (status = 502, description = "Backend unavailable and no cached settings"),
    ),
    tag = "control"
)]
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Settings>> {
    Ok(Json(state.session.current_settings().await?))
}

/// Change one setpoint
///
/// Reads the current settings, replaces the named field and posts the whole
/// object back.
#[utoipa::path(
    put,
    path = "/api/settings/{field}",
    params(
        ("field" = String, Path, description = "target_temp, pid_p, pid_i or pid_d"),
    ),
    request_body = SettingValue,
    responses(
        (status = 200, description = "Settings after the update", body = Settings),
        (status = 404, description = "Unknown setting"),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "control"
)]
pub async fn update_setting(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(body): Json<SettingValue>,
) -> AppResult<Json<Settings>> {
    let field: SettingField = field.parse().map_err(AppError::NotFound)?;

    match state
        .session
        .dispatch(Intent::EditSetting {
            field,
            value: body.value,
        })
        .await?
    {
        IntentOutcome::Settings(settings) => Ok(Json(settings)),
        other => Err(AppError::Internal(format!(
            "Unexpected outcome for setting edit: {other:?}"
        ))),
    }
}

/// Toggle the lamp
///
/// Requests the inverse of the backend-reported state and waits for the
/// controller to confirm it.
#[utoipa::path(
    post,
    path = "/api/lamp/toggle",
    responses(
        (status = 200, description = "Toggle submitted", body = LampToggleOutcome),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "control"
)]
pub async fn toggle_lamp(State(state): State<AppState>) -> AppResult<Json<LampToggleOutcome>> {
    match state.session.dispatch(Intent::ToggleLamp).await? {
        IntentOutcome::Lamp(outcome) => Ok(Json(outcome)),
        other => Err(AppError::Internal(format!(
            "Unexpected outcome for lamp toggle: {other:?}"
        ))),
    }
}
