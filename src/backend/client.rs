use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::backend::models::{Sample, Settings};
use crate::backend::TelemetryBackend;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::timeconv::query_timestamp;

/// HTTP client for the rig's telemetry and settings backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for `config.backend_base_url`.
    ///
    /// No request timeout is set unless `BACKEND_TIMEOUT_SECONDS` is configured.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.backend_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get samples between optional bounds, in backend order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails, returns an error status,
    /// or the body is not a JSON array of samples.
    pub async fn get_data(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Sample>> {
        let url = format!("{}/data", self.base_url);

        let mut params: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(from) = from {
            params.push(("from_time", query_timestamp(&from)));
        }
        if let Some(to) = to {
            params.push(("to_time", query_timestamp(&to)));
        }

        tracing::debug!(url = %url, ?params, "Fetching telemetry");

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        read_json(response, "/data").await
    }

    /// Get the newest sample. The backend answers `{}` when it has none.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails or the body is malformed.
    pub async fn get_latest(&self) -> AppResult<Option<Sample>> {
        let url = format!("{}/data/latest", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        let value: serde_json::Value = read_json(response, "/data/latest").await?;
        let empty = match &value {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Backend(format!("Failed to parse latest sample: {e}")))
    }

    /// Get the controller's current settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails or the body is malformed.
    pub async fn get_settings(&self) -> AppResult<Settings> {
        let url = format!("{}/settings", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        read_json(response, "/settings").await
    }

    /// Replace the controller's settings with `settings`.
    ///
    /// The response body is only an acknowledgement and is not parsed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails or returns an error status.
    pub async fn post_settings(&self, settings: &Settings) -> AppResult<()> {
        let url = format!("{}/settings", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(settings)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        check_status(response).await.map(|_| ())
    }
}

impl TelemetryBackend for BackendClient {
    async fn fetch_samples(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Sample>> {
        self.get_data(from, to).await
    }

    async fn latest_sample(&self) -> AppResult<Option<Sample>> {
        self.get_latest().await
    }

    async fn settings(&self) -> AppResult<Settings> {
        self.get_settings().await
    }

    async fn update_settings(&self, settings: &Settings) -> AppResult<()> {
        self.post_settings(settings).await
    }
}

async fn check_status(response: Response) -> AppResult<Response> {
    if !response.status().is_success() {
        return Err(AppError::Backend(format!(
            "HTTP {}: {}",
            response.status(),
            response.text().await.unwrap_or_default()
        )));
    }
    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> AppResult<T> {
    let response = check_status(response).await?;

    let text = response
        .text()
        .await
        .map_err(|e| AppError::Backend(format!("Failed to get response text: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            endpoint,
            body_preview = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        AppError::Backend(format!("Failed to parse response: {e}"))
    })
}
