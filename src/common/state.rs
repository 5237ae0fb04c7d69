use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::session::{DashboardSession, SessionOptions};

/// The dashboard session as served over HTTP
pub type Session = DashboardSession<BackendClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<Session>,
}

impl AppState {
    pub fn new(config: Config, backend_client: BackendClient) -> Self {
        let options = SessionOptions::from_config(&config);
        tracing::info!(
            timezone = %options.zone.name(),
            live_poll_ms = config.live_poll_interval_ms,
            status_poll_ms = config.status_poll_interval_ms,
            "Dashboard session created"
        );

        Self {
            config: Arc::new(config),
            session: Arc::new(DashboardSession::new(backend_client, options)),
        }
    }
}
