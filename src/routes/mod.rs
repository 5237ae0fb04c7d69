pub mod charts;
pub mod control;
pub mod dashboard;
pub mod health;
mod rate_limit;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::FallbackIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        charts::get_charts,
        charts::fetch_charts,
        charts::set_live_mode,
        charts::download_csv,
        control::get_status,
        control::get_settings,
        control::update_setting,
        control::toggle_lamp,
    ),
    components(
        schemas(
            charts::ChartsResponse,
            charts::LiveModeResponse,
            charts::LiveModeRequest,
            control::StatusResponse,
            control::SettingValue,
            crate::session::RangeInput,
            crate::backend::Settings,
            crate::backend::LampState,
            crate::control::LampToggleOutcome,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "charts", description = "Historical and live telemetry charts"),
        (name = "control", description = "Live readout, setpoints and lamp"),
    ),
    info(
        title = "Mussel Dash API",
        description = "Operator dashboard for the mussel farm monitoring and control rig",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let read_routes = Router::new()
        .route("/charts", get(charts::get_charts))
        .route("/charts/fetch", post(charts::fetch_charts))
        .route("/charts/{metric}/csv", get(charts::download_csv))
        .route("/live-mode", put(charts::set_live_mode))
        .route("/status", get(control::get_status))
        .route("/settings", get(control::get_settings));

    // Commands that reach the physical controller
    let control_routes_base = Router::new()
        .route("/settings/{field}", put(control::update_setting))
        .route("/lamp/toggle", post(control::toggle_lamp));

    let control_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        control_routes_base
    } else {
        let limiter = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_second(config.rate_limit_control_per_second)
            .burst_size(config.rate_limit_control_burst)
            .finish();

        match limiter {
            Some(limiter) => {
                tracing::info!(
                    control_rate = %format!(
                        "{}/s burst {}",
                        config.rate_limit_control_per_second, config.rate_limit_control_burst
                    ),
                    "Rate limiting configured"
                );
                control_routes_base.layer(GovernorLayer {
                    config: Arc::new(limiter),
                })
            }
            None => {
                tracing::warn!("Invalid rate limit settings, control routes are not limited");
                control_routes_base
            }
        }
    };

    let api_routes = Router::new()
        .merge(read_routes)
        .merge(control_routes)
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    // Page and health check (NO rate limiting)
    let page_routes = Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
