use crate::charts::{ChartState, Metric};
use crate::error::{AppError, AppResult};

/// Write a `Time,<header>` CSV with one row per label.
///
/// Missing values become empty cells. Empty input produces the header only.
///
/// # Errors
///
/// Returns `AppError::Internal` if the series lengths differ or writing fails.
pub fn series_to_csv(labels: &[String], values: &[Option<f64>], header: &str) -> AppResult<String> {
    if labels.len() != values.len() {
        return Err(AppError::Internal(format!(
            "Series length mismatch: {} labels, {} values",
            labels.len(),
            values.len()
        )));
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(["Time", header])
        .map_err(|e| AppError::Internal(e.to_string()))?;

    for (label, value) in labels.iter().zip(values) {
        let cell = value.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([label.as_str(), cell.as_str()])
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

/// CSV for one metric of the current charts.
///
/// # Errors
///
/// See [`series_to_csv`].
pub fn chart_csv(chart: &ChartState, metric: Metric) -> AppResult<String> {
    series_to_csv(chart.labels(), chart.series(metric), metric.title())
}
