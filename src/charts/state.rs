use chrono::{DateTime, Utc};

use crate::backend::Sample;
use crate::charts::Metric;
use crate::timeconv::CivilZone;

/// The dashboard's three time-series charts.
///
/// All series share one label vector and always have its length. A fetch
/// replaces everything at once; nothing is appended.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    labels: Vec<String>,
    temperature: Vec<Option<f64>>,
    od_value: Vec<Option<f64>>,
    pump_speed: Vec<Option<f64>>,
    revision: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl ChartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every series with `samples`, keeping backend order.
    ///
    /// Counts as one redraw pass.
    pub fn replace(&mut self, samples: &[Sample], zone: &CivilZone) {
        let labels = samples
            .iter()
            .map(|s| zone.format_label(&s.timestamp))
            .collect();
        let series = |metric: Metric| -> Vec<Option<f64>> {
            samples.iter().map(|s| metric.value_of(s)).collect()
        };

        *self = Self {
            labels,
            temperature: series(Metric::Temperature),
            od_value: series(Metric::OdValue),
            pump_speed: series(Metric::PumpSpeed),
            revision: self.revision + 1,
            updated_at: Some(Utc::now()),
        };
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn series(&self, metric: Metric) -> &[Option<f64>] {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::OdValue => &self.od_value,
            Metric::PumpSpeed => &self.pump_speed,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of redraw passes so far
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
