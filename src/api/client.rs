//! Monitoring Backend REST Client
//!
//! HTTP client for the patient monitoring backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;

use super::dto::{PatientInput, ServerStats, TelemetryRequest, TelemetryResponse};
use super::error::{ApiError, ApiResult};
use crate::model::{lenient, Alert, Patient};

/// Operations the dashboard needs from the backend
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// Every patient
    async fn list_patients(&self) -> ApiResult<Vec<Patient>>;

    /// Create a patient; the caller refetches afterwards
    async fn create_patient(&self, input: &PatientInput) -> ApiResult<()>;

    /// Replace a patient's editable fields
    async fn update_patient(&self, patient_id: &str, input: &PatientInput) -> ApiResult<()>;

    async fn delete_patient(&self, patient_id: &str) -> ApiResult<()>;

    /// Every alert, in backend order
    async fn list_alerts(&self) -> ApiResult<Vec<Alert>>;

    /// Backend-computed headline counters
    async fn dashboard_stats(&self) -> ApiResult<ServerStats>;

    /// Submit one reading and learn whether it raised an alert
    async fn send_telemetry(&self, request: &TelemetryRequest) -> ApiResult<TelemetryResponse>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the API prefix (e.g., "http://localhost:8000/api")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// reqwest-backed [`MonitorApi`]
#[derive(Debug, Clone)]
pub struct HttpMonitorApi {
    client: Client,
    base_url: Url,
    config: ClientConfig,
}

impl HttpMonitorApi {
    /// Create a client; fails only on an unusable base URL or TLS setup
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resource URL; each segment is percent-encoded on its own
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, turning non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(ApiError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), error = %err, "Backend request failed");
        Err(err)
    }

    async fn get_json(&self, segments: &[&str]) -> ApiResult<Value> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(url)).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MonitorApi for HttpMonitorApi {
    async fn list_patients(&self) -> ApiResult<Vec<Patient>> {
        let payload = self.get_json(&["patients"]).await?;
        Ok(lenient::collection(payload))
    }

    async fn create_patient(&self, input: &PatientInput) -> ApiResult<()> {
        let url = self.endpoint(&["patients"])?;
        tracing::info!(name = %input.name, "Creating patient");
        self.send(self.client.post(url).json(input)).await?;
        Ok(())
    }

    async fn update_patient(&self, patient_id: &str, input: &PatientInput) -> ApiResult<()> {
        let url = self.endpoint(&["patients", patient_id])?;
        tracing::info!(patient_id, "Updating patient");
        self.send(self.client.put(url).json(input)).await?;
        Ok(())
    }

    async fn delete_patient(&self, patient_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["patients", patient_id])?;
        tracing::info!(patient_id, "Deleting patient");
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn list_alerts(&self) -> ApiResult<Vec<Alert>> {
        let payload = self.get_json(&["alerts"]).await?;
        Ok(lenient::collection(payload))
    }

    async fn dashboard_stats(&self) -> ApiResult<ServerStats> {
        let payload = self.get_json(&["dashboard", "stats"]).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_telemetry(&self, request: &TelemetryRequest) -> ApiResult<TelemetryResponse> {
        let url = self.endpoint(&["telemetry"])?;
        tracing::info!(
            patient_id = %request.patient_id,
            heart_rate = request.heart_rate,
            oxygen_level = request.oxygen_level,
            "Sending telemetry"
        );

        let response = self.send(self.client.post(url).json(request)).await?;
        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = HttpMonitorApi::new(ClientConfig::default()).unwrap();
        assert_eq!(
            api.endpoint(&["patients"]).unwrap().as_str(),
            "http://localhost:8000/api/patients"
        );
        assert_eq!(
            api.endpoint(&["dashboard", "stats"]).unwrap().as_str(),
            "http://localhost:8000/api/dashboard/stats"
        );
    }

    #[test]
    fn test_endpoint_encodes_identifiers() {
        let api = HttpMonitorApi::new(ClientConfig {
            base_url: "http://monitor.local/api/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            api.endpoint(&["patients", "P 1/2"]).unwrap().as_str(),
            "http://monitor.local/api/patients/P%201%2F2"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpMonitorApi::new(ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_reported() {
        // Port 9 (discard) on localhost is essentially never listening
        let api = HttpMonitorApi::new(ClientConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            request_timeout_ms: 2_000,
        })
        .unwrap();
        let err = api.list_patients().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unavailable(_) | ApiError::Timeout | ApiError::Request(_)
        ));
    }
}
