//! HTTP client for the sentiment analysis service.
//!
//! Endpoints:
//! - `POST /analyze` with `{ "text": ... }`
//! - `POST /api/v1/reddit/analyze` with `{ "post_url": ... }`
//! - `POST /batch-analyze` with a JSON array of texts
//! - `GET /health`

use super::AnalysisService;
use crate::config::ApiConfig;
use crate::error::ServiceError;
use crate::models::{
    AnalysisRequest, AnalysisResult, BatchAnalysis, HealthStatus, PostAnalysis, TextAnalysis,
    TextScore,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Analysis service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    base_url: String,
    timeout_seconds: Option<u64>,
    http_client: reqwest::Client,
}

impl HttpAnalysisService {
    /// Create a client for the service at `base_url`.
    ///
    /// Without `timeout_seconds` the request waits as long as the transport
    /// allows.
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http_client = builder
            .build()
            .map_err(|e| ServiceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(base_url, timeout_seconds, http_client))
    }

    /// Create a client around an already configured `reqwest::Client`.
    ///
    /// `timeout_seconds` is only used for error messages here; the timeout
    /// itself must be set on `http_client`.
    pub fn with_client(
        base_url: &str,
        timeout_seconds: Option<u64>,
        http_client: reqwest::Client,
    ) -> Self {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        info!("Using analysis service at {}", base_url);

        Self {
            base_url,
            timeout_seconds,
            http_client,
        }
    }

    /// Create a client from the `[api]` config section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ServiceError> {
        Self::new(&config.base_url, config.timeout_seconds)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Query the health endpoint.
    ///
    /// A 503 carrying a health body is still a valid answer and comes back
    /// as an unhealthy status rather than an error.
    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let url = self.url("/health");
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = read_body(response).await?;

        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(health) = serde_json::from_str::<HealthStatus>(&body) {
                return Ok(health);
            }
        }

        if !status.is_success() {
            return Err(ServiceError::from_body(status.as_u16(), &body));
        }
        decode(&body)
    }

    /// Analyze several texts in one request.
    ///
    /// Inputs are expected to be validated already.
    pub async fn analyze_batch(&self, texts: &[String]) -> Result<BatchAnalysis, ServiceError> {
        info!("Sending batch of {} texts", texts.len());
        let body = self.post_json("/batch-analyze", texts).await?;
        decode(&body)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ServiceError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = read_body(response).await?;

        if !status.is_success() {
            warn!("Service responded {} for {}", status, path);
            return Err(ServiceError::from_body(status.as_u16(), &body));
        }

        Ok(body)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                seconds: self.timeout_seconds.unwrap_or_default(),
            }
        } else if e.is_connect() {
            ServiceError::Connect {
                url: self.base_url.clone(),
            }
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        let body = self.post_json(request.endpoint(), request).await?;

        match request {
            AnalysisRequest::Post { .. } => {
                let analysis: PostAnalysis = decode(&body)?;
                info!(
                    "Analyzed {} comments of '{}'",
                    analysis.summary.total_comments_analyzed, analysis.summary.post_title
                );
                Ok(AnalysisResult::PostSummary(analysis))
            }
            AnalysisRequest::Text { text } => {
                let reply: TextScore = decode(&body)?;
                info!("Analysis complete: {} (score: {:.4})", reply.label, reply.score);
                Ok(AnalysisResult::SingleText(TextAnalysis::from_score(
                    text.clone(),
                    reply,
                )?))
            }
        }
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ServiceError> {
    response
        .text()
        .await
        .map_err(|e| ServiceError::Transport(format!("Failed to read response body: {}", e)))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))
}
