//! Beenaya API Gateway
//!
//! Single entry point for the Beenaya frontend. Requests are matched against a
//! static route table and forwarded to the tenant, auth, CRM, document or
//! library service, legacy French paths being rewritten on the way.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;

pub use error::{AppError, Result};

use std::sync::Arc;

use backend::{HttpUpstream, Upstream};
use gateway::{routes::default_rules, HealthCheckManager, RouteTable, ServiceRegistry};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub services: Arc<ServiceRegistry>,
    pub route_table: Arc<RouteTable>,
    pub upstream: Arc<dyn Upstream>,
    pub health_manager: Arc<HealthCheckManager>,
}

impl AppState {
    /// Build the state with the reqwest upstream
    pub fn from_settings(settings: config::Settings) -> Result<Self> {
        let upstream = Arc::new(HttpUpstream::new(&settings)?);
        Self::new(settings, upstream)
    }

    /// Build the state around any upstream implementation
    pub fn new(settings: config::Settings, upstream: Arc<dyn Upstream>) -> Result<Self> {
        let services = Arc::new(ServiceRegistry::from_settings(&settings));
        let route_table = Arc::new(RouteTable::new(default_rules(), &services)?);
        let health_manager = Arc::new(HealthCheckManager::new(services.clone(), upstream.clone()));

        Ok(Self {
            settings: Arc::new(settings),
            services,
            route_table,
            upstream,
            health_manager,
        })
    }
}
