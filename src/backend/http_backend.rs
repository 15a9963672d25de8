//! HTTP upstream client implementation

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::backend::traits::{ForwardRequest, ProbeOutcome, Upstream, UpstreamResponse};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::gateway::services::ServiceKind;

/// reqwest-backed upstream shared by every request
pub struct HttpUpstream {
    client: Client,
    probe_timeout: Duration,
}

impl HttpUpstream {
    /// Create a new HTTP upstream from configuration
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_timeouts(settings.proxy_timeout(), settings.health_timeout())
    }

    pub fn with_timeouts(proxy_timeout: Duration, probe_timeout: Duration) -> Result<Self> {
        // Redirects are relayed to the caller, never followed here
        let client = Client::builder()
            .timeout(proxy_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            probe_timeout,
        })
    }
}

/// Map a transport failure onto the gateway error it represents
fn classify(error: reqwest::Error, service: ServiceKind, url: &str) -> AppError {
    if error.is_timeout() {
        warn!(service = %service, url = %url, "Upstream timed out");
        AppError::UpstreamTimeout(service.to_string())
    } else if error.is_builder() {
        warn!(service = %service, url = %url, error = %error, "Upstream request could not be built");
        AppError::HttpClient(error)
    } else {
        // Refused and dropped connections both mean the backend is not serving
        warn!(service = %service, url = %url, error = %error, "Upstream unreachable");
        AppError::UpstreamUnavailable(service.to_string())
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn forward(&self, request: ForwardRequest) -> Result<UpstreamResponse> {
        let ForwardRequest {
            service,
            method,
            url,
            headers,
            body,
        } = request;

        debug!(service = %service, method = %method, url = %url, bytes = body.len(), "Forwarding request");

        let mut builder = self.client.request(method, &url).headers(headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, service, &url))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, service, &url))?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    async fn probe(&self, url: &str) -> ProbeOutcome {
        let started = Instant::now();

        match self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!(url = %url, "Health check passed");
                ProbeOutcome::Healthy {
                    elapsed: started.elapsed(),
                }
            }
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Health check failed");
                ProbeOutcome::Unhealthy {
                    status: response.status().as_u16(),
                }
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Health check failed");
                ProbeOutcome::Unreachable {
                    error: e.to_string(),
                }
            }
        }
    }
}
