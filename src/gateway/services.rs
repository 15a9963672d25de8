//! Backend service registry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use crate::config::Settings;

/// Health endpoint exposed by every backend service
pub const DEFAULT_HEALTH_PATH: &str = "/health/";

/// The backend services reachable through the gateway
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Tenant,
    Auth,
    Crm,
    Documents,
    Library,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Tenant,
        ServiceKind::Auth,
        ServiceKind::Crm,
        ServiceKind::Documents,
        ServiceKind::Library,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Tenant => "tenant",
            ServiceKind::Auth => "auth",
            ServiceKind::Crm => "crm",
            ServiceKind::Documents => "documents",
            ServiceKind::Library => "library",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend service and where to reach it
#[derive(Debug, Clone)]
pub struct BackendService {
    pub kind: ServiceKind,
    /// Base URL without trailing slash
    pub base_url: String,
    pub health_path: String,
}

impl BackendService {
    pub fn new(kind: ServiceKind, base_url: &str) -> Self {
        Self {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }
}

/// Immutable registry of backend services, built once at startup
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<ServiceKind, BackendService>,
}

impl ServiceRegistry {
    pub fn new(services: impl IntoIterator<Item = BackendService>) -> Self {
        Self {
            services: services.into_iter().map(|s| (s.kind, s)).collect(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new([
            BackendService::new(ServiceKind::Tenant, &settings.tenant_service_url),
            BackendService::new(ServiceKind::Auth, &settings.auth_service_url),
            BackendService::new(ServiceKind::Crm, &settings.crm_service_url),
            BackendService::new(ServiceKind::Documents, &settings.document_service_url),
            BackendService::new(ServiceKind::Library, &settings.library_service_url),
        ])
    }

    pub fn get(&self, kind: ServiceKind) -> Option<&BackendService> {
        self.services.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendService> {
        self.services.values()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.services.keys().map(|k| k.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
