use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::backend::{Settings, TelemetryBackend};
use crate::error::{AppError, AppResult};

/// A numeric setpoint the operator can edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    TargetTemp,
    PidP,
    PidI,
    PidD,
}

impl SettingField {
    pub fn apply(self, settings: &mut Settings, value: f64) {
        match self {
            Self::TargetTemp => settings.target_temp = value,
            Self::PidP => settings.pid_p = value,
            Self::PidI => settings.pid_i = value,
            Self::PidD => settings.pid_d = value,
        }
    }

    #[must_use]
    pub fn read(self, settings: &Settings) -> f64 {
        match self {
            Self::TargetTemp => settings.target_temp,
            Self::PidP => settings.pid_p,
            Self::PidI => settings.pid_i,
            Self::PidD => settings.pid_d,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TargetTemp => "target_temp",
            Self::PidP => "pid_p",
            Self::PidI => "pid_i",
            Self::PidD => "pid_d",
        }
    }
}

impl FromStr for SettingField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "target_temp" => Ok(Self::TargetTemp),
            "pid_p" => Ok(Self::PidP),
            "pid_i" => Ok(Self::PidI),
            "pid_d" => Ok(Self::PidD),
            other => Err(format!("Unknown setting '{other}'")),
        }
    }
}

/// Fetch the current settings, apply `edit`, and post the full object back.
///
/// The backend has no partial update. Two overlapping calls can clobber each
/// other's field; nothing here serializes them.
///
/// # Errors
///
/// Returns `AppError::Backend` if either round trip fails.
pub async fn read_modify_write<B, F>(backend: &B, edit: F) -> AppResult<Settings>
where
    B: TelemetryBackend,
    F: FnOnce(&mut Settings),
{
    let mut settings = backend.settings().await?;
    edit(&mut settings);
    backend.update_settings(&settings).await?;
    Ok(settings)
}

/// Change one numeric setpoint.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a non-finite value, otherwise see
/// [`read_modify_write`].
pub async fn apply_setting<B: TelemetryBackend>(
    backend: &B,
    field: SettingField,
    value: f64,
) -> AppResult<Settings> {
    if !value.is_finite() {
        return Err(AppError::BadRequest(format!(
            "{} must be a finite number",
            field.as_str()
        )));
    }

    let settings = read_modify_write(backend, |s| field.apply(s, value)).await?;
    tracing::info!(field = field.as_str(), value, "Setpoint updated");
    Ok(settings)
}
