//! Health check manager for monitoring backend health

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::backend::traits::{ProbeOutcome, Upstream};
use crate::gateway::services::{ServiceKind, ServiceRegistry};

/// Health state of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Unreachable,
}

/// Latest known health of a backend
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceHealth {
    pub status: HealthState,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ServiceHealth {
    fn from_probe(url: String, outcome: ProbeOutcome) -> Self {
        let (status, response_time_ms, error) = match outcome {
            ProbeOutcome::Healthy { elapsed } => {
                (HealthState::Healthy, Some(elapsed.as_millis() as u64), None)
            }
            ProbeOutcome::Unhealthy { status } => {
                (HealthState::Unhealthy, None, Some(format!("HTTP {}", status)))
            }
            ProbeOutcome::Unreachable { error } => (HealthState::Unreachable, None, Some(error)),
        };

        Self {
            status,
            url,
            response_time_ms,
            error,
            checked_at: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

type StatusMap = Arc<DashMap<ServiceKind, ServiceHealth>>;

/// Health check manager
pub struct HealthCheckManager {
    services: Arc<ServiceRegistry>,
    upstream: Arc<dyn Upstream>,
    statuses: StatusMap,
    check_task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthCheckManager {
    /// Create a new health check manager
    pub fn new(services: Arc<ServiceRegistry>, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            services,
            upstream,
            statuses: Arc::new(DashMap::new()),
            check_task: Mutex::new(None),
        }
    }

    /// Probe every backend concurrently and record the results
    pub async fn check_all(&self) -> Vec<(ServiceKind, ServiceHealth)> {
        probe_all(&self.services, self.upstream.as_ref(), &self.statuses).await
    }

    /// Start the periodic background probe
    pub fn start(&self, interval: Duration) {
        let services = self.services.clone();
        let upstream = self.upstream.clone();
        let statuses = self.statuses.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                probe_all(&services, upstream.as_ref(), &statuses).await;
            }
        });

        if let Some(previous) = self.check_task.lock().replace(handle) {
            previous.abort();
        }
        info!(interval_secs = interval.as_secs(), "Started health check background task");
    }

    /// Stop the background probe
    pub fn stop(&self) {
        if let Some(handle) = self.check_task.lock().take() {
            handle.abort();
            info!("Stopped health check background task");
        }
    }

    pub fn is_running(&self) -> bool {
        self.check_task.lock().is_some()
    }

    /// Last recorded health of a backend, if it was probed already
    pub fn last_status(&self, kind: ServiceKind) -> Option<ServiceHealth> {
        self.statuses.get(&kind).map(|s| s.clone())
    }

    /// Backends whose last probe failed
    pub fn unhealthy_services(&self) -> Vec<ServiceKind> {
        let mut kinds: Vec<ServiceKind> = self
            .statuses
            .iter()
            .filter(|entry| !entry.is_healthy())
            .map(|entry| *entry.key())
            .collect();
        kinds.sort();
        kinds
    }
}

impl Drop for HealthCheckManager {
    fn drop(&mut self) {
        if let Some(handle) = self.check_task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn probe_all(
    services: &ServiceRegistry,
    upstream: &dyn Upstream,
    statuses: &DashMap<ServiceKind, ServiceHealth>,
) -> Vec<(ServiceKind, ServiceHealth)> {
    let probes = services.iter().map(|service| async move {
        let url = service.health_url();
        let outcome = upstream.probe(&url).await;
        (service.kind, ServiceHealth::from_probe(url, outcome))
    });

    let results = join_all(probes).await;

    for (kind, health) in &results {
        let previous = statuses.insert(*kind, health.clone());
        let was_healthy = previous.map(|p| p.is_healthy());

        match (was_healthy, health.is_healthy()) {
            (Some(false), true) => info!(service = %kind, "Backend recovered"),
            (Some(true) | None, false) => warn!(
                service = %kind,
                status = ?health.status,
                error = health.error.as_deref().unwrap_or(""),
                "Backend not healthy"
            ),
            _ => {}
        }

        debug!(service = %kind, healthy = health.is_healthy(), "Health check completed");
    }

    results
}
