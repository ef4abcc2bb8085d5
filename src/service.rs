use crate::config::ServiceConfig;
use crate::error::{AuditError, Result};
use crate::report::AuditReport;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("aeo-audit/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a URL into a report.
#[allow(async_fn_in_trait)]
pub trait AnalysisService {
    async fn analyze(&self, url: &str) -> Result<AuditReport>;
}

#[derive(Debug, Serialize)]
struct AuditRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
}

pub struct HttpAnalysisService {
    http_client: Client,
    endpoint: Url,
}

impl HttpAnalysisService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| AuditError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// `/health` on the same origin as the analysis endpoint.
    pub fn health_url(&self) -> Result<Url> {
        self.endpoint
            .join("/health")
            .map_err(|e| AuditError::Config(format!("cannot derive health URL: {}", e)))
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.health_url()?;
        info!(
            action = "request",
            component = "health_check",
            url = %url,
            "Checking service health"
        );

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AuditError::Transport(format!("malformed response: {}", e)))
    }
}

impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, url: &str) -> Result<AuditReport> {
        let start_time = Instant::now();
        info!(
            action = "request",
            component = "analysis_service",
            endpoint = %self.endpoint,
            audited_url = url,
            "Submitting audit request"
        );

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&AuditRequest { url })
            .send()
            .await
            .map_err(|e| {
                warn!(
                    action = "send",
                    component = "analysis_service",
                    error = %e,
                    "Audit request failed"
                );
                AuditError::from(e)
            })?;

        let status = response.status();
        let body = response.bytes().await?;
        info!(
            action = "response",
            component = "analysis_service",
            status = status.as_u16(),
            bytes = body.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Audit response received"
        );

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        serde_json::from_slice::<AuditReport>(&body).map_err(|e| {
            debug!(
                action = "parse",
                component = "analysis_service",
                error = %e,
                "Report body did not parse"
            );
            AuditError::Transport(format!("malformed response: {}", e))
        })
    }
}

/// Maps a non-2xx response to an error.
///
/// A non-empty `error` string in a JSON body is a service error; anything
/// else is reported as a transport failure carrying the status line.
pub fn error_from_body(status: StatusCode, body: &[u8]) -> AuditError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message) }) if !message.is_empty() => {
            AuditError::Service(message)
        }
        _ => AuditError::Transport(format!("server responded with status {}", status)),
    }
}
