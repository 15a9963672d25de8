//! Common traits and types for reaching backend services

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use std::time::Duration;

use crate::error::Result;
use crate::gateway::services::ServiceKind;

/// Request to forward to a backend
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// Service the request is routed to, used for error reporting
    pub service: ServiceKind,

    pub method: Method,

    /// Absolute upstream URL including the query string
    pub url: String,

    /// End-to-end headers only
    pub headers: HeaderMap,

    pub body: Bytes,
}

/// Response received from a backend, relayed as-is
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Result of probing a backend health endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Answered 200
    Healthy { elapsed: Duration },
    /// Answered with any other status
    Unhealthy { status: u16 },
    /// Could not be reached at all
    Unreachable { error: String },
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy { .. })
    }
}

/// Outbound HTTP seam of the gateway
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Forward a request and return the backend's response.
    ///
    /// Non-2xx answers are successful forwards; only transport failures are errors.
    async fn forward(&self, request: ForwardRequest) -> Result<UpstreamResponse>;

    /// Probe a health URL
    async fn probe(&self, url: &str) -> ProbeOutcome;
}
