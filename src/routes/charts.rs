use axum::{
    extract::{Path, State},
    http::{
        header::{self, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::charts::{export, Metric};
use crate::common::{AppState, Session};
use crate::error::{AppError, AppResult};
use crate::session::{Intent, IntentOutcome, RangeInput};

#[derive(Debug, Serialize, ToSchema)]
pub struct ChartsResponse {
    /// Redraw counter; changes whenever the series are replaced
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
    /// Localized sample times, shared by all series
    pub labels: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub od_value: Vec<Option<f64>>,
    pub pump_speed: Vec<Option<f64>>,
    pub live: LiveModeResponse,
    /// Samples received by this request's fetch, if it performed one
    pub fetched: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LiveModeResponse {
    pub enabled: bool,
    /// Fixed lower bound of the running poll
    pub from: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LiveModeRequest {
    pub enabled: bool,
    #[serde(flatten)]
    pub range: RangeInput,
}

async fn charts_response(session: &Session, fetched: Option<usize>) -> ChartsResponse {
    let chart = session.chart().await;
    let live = session.live_mode().await;

    ChartsResponse {
        revision: chart.revision(),
        updated_at: chart.updated_at(),
        labels: chart.labels().to_vec(),
        temperature: chart.series(Metric::Temperature).to_vec(),
        od_value: chart.series(Metric::OdValue).to_vec(),
        pump_speed: chart.series(Metric::PumpSpeed).to_vec(),
        live: LiveModeResponse {
            enabled: live.enabled,
            from: live.from,
        },
        fetched,
    }
}

fn fetched_count(outcome: IntentOutcome) -> AppResult<Option<usize>> {
    match outcome {
        IntentOutcome::Charts { fetched } => Ok(fetched),
        other => Err(AppError::Internal(format!(
            "Unexpected outcome for chart intent: {other:?}"
        ))),
    }
}

/// Get the current chart series
#[utoipa::path(
    get,
    path = "/api/charts",
    responses(
        (status = 200, description = "Current chart state", body = ChartsResponse),
    ),
    tag = "charts"
)]
pub async fn get_charts(State(state): State<AppState>) -> Json<ChartsResponse> {
    Json(charts_response(&state.session, None).await)
}

/// Fetch a time range and replace the charts
///
/// Times are wall-clock values in the dashboard's civil timezone. In live
/// mode the upper bound is ignored and polling restarts from the new lower
/// bound. On backend failure the previous charts stay in place.
#[utoipa::path(
    post,
    path = "/api/charts/fetch",
    request_body = RangeInput,
    responses(
        (status = 200, description = "Charts replaced", body = ChartsResponse),
        (status = 400, description = "Invalid date or time"),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "charts"
)]
pub async fn fetch_charts(
    State(state): State<AppState>,
    Json(range): Json<RangeInput>,
) -> AppResult<Json<ChartsResponse>> {
    let outcome = state.session.dispatch(Intent::Fetch(range)).await?;
    let fetched = fetched_count(outcome)?;
    Ok(Json(charts_response(&state.session, fetched).await))
}

/// Switch live mode on or off
///
/// Turning it on fetches once immediately, then polls from the entered lower
/// bound. Turning it off keeps the displayed data.
#[utoipa::path(
    put,
    path = "/api/live-mode",
    request_body = LiveModeRequest,
    responses(
        (status = 200, description = "Live mode updated", body = ChartsResponse),
        (status = 400, description = "Invalid date or time"),
    ),
    tag = "charts"
)]
pub async fn set_live_mode(
    State(state): State<AppState>,
    Json(request): Json<LiveModeRequest>,
) -> AppResult<Json<ChartsResponse>> {
    let outcome = state
        .session
        .dispatch(Intent::SetLiveMode {
            enabled: request.enabled,
            range: request.range,
        })
        .await?;
    let fetched = fetched_count(outcome)?;
    Ok(Json(charts_response(&state.session, fetched).await))
}

/// Download one chart series as CSV
#[utoipa::path(
    get,
    path = "/api/charts/{metric}/csv",
    params(
        ("metric" = String, Path, description = "temperature, od_value or pump_speed"),
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 404, description = "Unknown metric"),
    ),
    tag = "charts"
)]
pub async fn download_csv(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> AppResult<Response> {
    let metric: Metric = metric.parse().map_err(AppError::NotFound)?;

    let chart = state.session.chart().await;
    let csv = export::chart_csv(&chart, metric)?;

    tracing::debug!(?metric, rows = chart.len(), "CSV export");

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        metric.csv_filename()
    ))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
