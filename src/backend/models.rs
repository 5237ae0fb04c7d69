use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::timeconv::parse_backend_timestamp;

/// Lamp relay state as the backend reports and accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LampState {
    On,
    Off,
}

impl LampState {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for LampState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One telemetry record from `/data` or `/data/latest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sample {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub pump_speed: Option<f64>,
    #[serde(default)]
    pub od_value: Option<f64>,
    #[serde(default)]
    pub lamp_state: Option<LampState>,
    #[serde(default)]
    pub pid_p: Option<f64>,
    #[serde(default)]
    pub pid_i: Option<f64>,
    #[serde(default)]
    pub pid_d: Option<f64>,
    #[serde(default)]
    pub target_temp: Option<f64>,
}

impl Sample {
    /// Sample carrying only a timestamp
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature: None,
            pump_speed: None,
            od_value: None,
            lamp_state: None,
            pid_p: None,
            pid_i: None,
            pid_d: None,
            target_temp: None,
        }
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Desired operating point, read from and written to `/settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Settings {
    pub target_temp: f64,
    pub lamp_state: LampState,
    pub pid_p: f64,
    pub pid_i: f64,
    pub pid_d: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_temp: 25.0,
            lamp_state: LampState::Off,
            pid_p: 0.0,
            pid_i: 0.0,
            pid_d: 0.0,
        }
    }
}
