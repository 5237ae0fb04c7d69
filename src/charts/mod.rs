pub mod export;
pub mod state;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::backend::Sample;

pub use state::ChartState;

/// The three charted telemetry metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    OdValue,
    PumpSpeed,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::Temperature, Self::OdValue, Self::PumpSpeed];

    /// Series title, also the CSV value column header.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature (°C)",
            Self::OdValue => "Algae Concentration (cells/mL)",
            Self::PumpSpeed => "Pump Speed (%)",
        }
    }

    #[must_use]
    pub fn csv_filename(self) -> &'static str {
        match self {
            Self::Temperature => "temperature.csv",
            Self::OdValue => "algae_concentration.csv",
            Self::PumpSpeed => "pump_speed.csv",
        }
    }

    #[must_use]
    pub fn value_of(self, sample: &Sample) -> Option<f64> {
        match self {
            Self::Temperature => sample.temperature,
            Self::OdValue => sample.od_value,
            Self::PumpSpeed => sample.pump_speed,
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "temperature" | "temp" => Ok(Self::Temperature),
            "od_value" | "od" | "algae_concentration" => Ok(Self::OdValue),
            "pump_speed" | "pump" => Ok(Self::PumpSpeed),
            other => Err(format!("Unknown metric '{other}'")),
        }
    }
}
