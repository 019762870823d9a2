//! API Client: HTTP client for desktop and integration consumers
//!
//! Wraps the calculation endpoints, decodes the response envelope and
//! sends `X-API-Key` when a key is configured. Static reference data (the
//! calculation methods) is served from a [`ResponseCache`] shared by clones.

mod cache;

pub use cache::ResponseCache;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::defaults;
use crate::trajectory::{CalculationResult, SurveyReport};
use crate::types::{CalculationMethod, SurveyStation, UnitSystem, WellpathPoint};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const METHODS_CACHE_KEY: &str = "calculation_methods";

/// API client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Outcome of a `/health` probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub response_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DoglegSeverity {
    pub dogleg_severity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Projection {
    pub projected_points: Vec<WellpathPoint>,
    pub total_projected_md: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    pub value: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationMethods {
    pub calculation_methods: Vec<MethodInfo>,
    pub unit_systems: Vec<MethodInfo>,
    pub default_method: CalculationMethod,
    pub tolerance: f64,
}

/// Survey validation answer: a report for valid surveys, the reason
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyValidation {
    Valid(SurveyReport),
    Invalid(String),
}

#[derive(Serialize)]
struct ProjectionBody {
    start_point: SurveyStation,
    build_rate: f64,
    turn_rate: f64,
    step_size: f64,
    num_steps: usize,
    unit_system: UnitSystem,
}

/// HTTP client for the WormDriller API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<Mutex<ResponseCache>>,
    cache_max_age: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(defaults::CLIENT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
            cache: Arc::new(Mutex::new(ResponseCache::new())),
            cache_max_age: ResponseCache::default_max_age(),
        })
    }

    /// How long cached reference data stays fresh.
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = ResponseCache::new();
        }
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.lock().ok()?;
        let value = cache.get_fresh(key, self.cache_max_age)?;
        serde_json::from_value(value.clone()).ok()
    }

    fn store<T: Serialize>(&self, key: &str, data: &T) {
        let Ok(value) = serde_json::to_value(data) else {
            return;
        };
        if let Ok(mut cache) = self.cache.lock() {
            cache.evict_expired(self.cache_max_age);
            cache.insert(key, value);
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header(defaults::API_KEY_HEADER, key),
            None => req,
        }
    }

    /// Decode an enveloped response. Non-2xx statuses become
    /// [`ClientError::Server`] carrying the error message when present.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Envelope<T>, ClientError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let req = self.with_key(self.http.post(self.url(path)).json(body));
        let envelope = Self::decode::<T>(req.send().await?).await?;
        match (envelope.success, envelope.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(ClientError::Decode(
                envelope.message.unwrap_or_else(|| format!("{path} returned no data")),
            )),
        }
    }

    /// Probe `/health`. Any failure counts as unhealthy.
    pub async fn check_health(&self) -> HealthStatus {
        let started = Instant::now();
        let healthy = match self.http.get(self.url("/health")).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url = %self.base_url, "Health check failed");
                false
            }
        };
        HealthStatus {
            healthy,
            response_time: started.elapsed(),
        }
    }

    pub async fn calculate_wellpath(
        &self,
        survey_points: &[SurveyStation],
        method: CalculationMethod,
        unit_system: UnitSystem,
        reference_azimuth: f64,
    ) -> Result<CalculationResult, ClientError> {
        let body = json!({
            "survey_points": survey_points,
            "method": method,
            "unit_system": unit_system,
            "reference_azimuth": reference_azimuth,
        });
        self.post("/api/v1/calculations/wellpath", &body).await
    }

    pub async fn calculate_dogleg_severity(
        &self,
        from: (f64, f64),
        to: (f64, f64),
        md_diff: f64,
        unit_system: UnitSystem,
    ) -> Result<DoglegSeverity, ClientError> {
        let body = json!({
            "inc1": from.0,
            "azi1": from.1,
            "inc2": to.0,
            "azi2": to.1,
            "md_diff": md_diff,
            "unit_system": unit_system,
        });
        self.post("/api/v1/calculations/dogleg-severity", &body).await
    }

    pub async fn project_wellpath(
        &self,
        start_point: SurveyStation,
        build_rate: f64,
        turn_rate: f64,
        step_size: f64,
        num_steps: usize,
        unit_system: UnitSystem,
    ) -> Result<Projection, ClientError> {
        let body = ProjectionBody {
            start_point,
            build_rate,
            turn_rate,
            step_size,
            num_steps,
            unit_system,
        };
        self.post("/api/v1/calculations/project-wellpath", &body).await
    }

    pub async fn validate_survey(&self, survey_points: &[SurveyStation]) -> Result<SurveyValidation, ClientError> {
        let body = json!({ "survey_points": survey_points });
        let req = self.with_key(self.http.post(self.url("/api/v1/calculations/validate-survey")).json(&body));
        let envelope = Self::decode::<serde_json::Value>(req.send().await?).await?;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::Decode("validate-survey returned no data".to_string()))?;

        if envelope.success {
            let report = serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))?;
            Ok(SurveyValidation::Valid(report))
        } else {
            let reason = data
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .or(envelope.message)
                .unwrap_or_default();
            Ok(SurveyValidation::Invalid(reason))
        }
    }

    /// Supported methods and unit systems, cached for the client's max age.
    pub async fn get_calculation_methods(&self) -> Result<CalculationMethods, ClientError> {
        if let Some(methods) = self.cached(METHODS_CACHE_KEY) {
            return Ok(methods);
        }
        let req = self.with_key(self.http.get(self.url("/api/v1/calculations/methods")));
        let envelope = Self::decode::<CalculationMethods>(req.send().await?).await?;
        let methods = envelope
            .data
            .ok_or_else(|| ClientError::Decode("methods returned no data".to_string()))?;
        self.store(METHODS_CACHE_KEY, &methods);
        Ok(methods)
    }
}
