use axum::http::StatusCode;

/// Health check endpoint
///
/// Returns 200 OK if the dashboard is running. Backend reachability is not
/// checked; see `/api/status` for the last telemetry refresh.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Dashboard is running"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
