//! Response models of the gateway's own endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::gateway::{RouteTableStats, ServiceHealth};

/// `GET /` payload
#[derive(Debug, Serialize, ToSchema)]
pub struct GatewayInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    /// `/docs` in debug mode, `disabled` otherwise
    pub documentation: String,
    pub legacy_compatibility: String,
    pub endpoints: EndpointSummary,
    pub services_backend: Vec<String>,
    pub routing: RouteTableStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EndpointSummary {
    pub health: String,
    pub auth: String,
    pub tenants: String,
    pub tiers: String,
    pub legacy: String,
}

/// `GET /health/` payload
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    pub gateway: GatewayHealth,
    pub services: BTreeMap<String, ServiceHealth>,
    pub legacy_compatibility: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GatewayHealth {
    /// The gateway itself answers, so this is always `healthy`
    pub status: String,
    pub version: String,
    /// `healthy` when every backend answered 200, `degraded` otherwise
    pub overall_status: String,
}

/// VAT rate served directly by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VatRate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub name: String,
    pub rate: f64,
    pub rate_display: String,
    pub description: String,
    pub is_default: bool,
    pub is_active: bool,
}

impl VatRate {
    fn new(code: &str, rate: f64, is_default: bool) -> Self {
        Self {
            id: None,
            code: code.to_string(),
            name: format!("{}%", code),
            rate,
            rate_display: format!("{}%", code),
            description: format!("Taux de TVA à {}%", code),
            is_default,
            is_active: true,
        }
    }

    /// French VAT rates: 0, 5.5, 10 and 20 %, the last being the default
    pub fn catalogue() -> Vec<VatRate> {
        vec![
            VatRate::new("0", 0.0, false),
            VatRate::new("5.5", 5.5, false),
            VatRate::new("10", 10.0, false),
            VatRate::new("20", 20.0, true),
        ]
    }

    pub fn default_rate() -> VatRate {
        VatRate {
            id: Some("default_20".to_string()),
            description: "Taux de TVA par défaut à 20%".to_string(),
            ..VatRate::new("20", 20.0, true)
        }
    }
}
