//! The upstream station feed collaborator.

use async_trait::async_trait;
use serde_json::Value;

use skylark_core::error::CoreError;
use skylark_core::station::{resolve_units, WorkUnit};

/// Source of the authoritative work-unit list for a job.
#[async_trait]
pub trait StationSource: Send + Sync {
    async fn fetch_units(&self) -> Result<Vec<WorkUnit>, CoreError>;
}

/// HTTP station feed. Expects a JSON body with the measurement array
/// at `actual.stationmeasurements`.
pub struct HttpStationSource {
    http: reqwest::Client,
    url: String,
}

impl HttpStationSource {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        HttpStationSource {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl StationSource for HttpStationSource {
    async fn fetch_units(&self) -> Result<Vec<WorkUnit>, CoreError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| CoreError::Upstream(err.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|err| CoreError::Upstream(err.to_string()))?;

        let measurements = payload
            .get("actual")
            .and_then(|actual| actual.get("stationmeasurements"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CoreError::Upstream("feed body lacks actual.stationmeasurements".into())
            })?;

        Ok(resolve_units(measurements))
    }
}
