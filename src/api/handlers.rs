//! Handlers for the endpoints served by the gateway itself

use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::api::models::{EndpointSummary, GatewayHealth, GatewayInfo, HealthReport, VatRate};
use crate::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gateway information
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Gateway information", body = GatewayInfo)),
    tag = "gateway"
)]
pub async fn gateway_info(State(state): State<Arc<AppState>>) -> Json<GatewayInfo> {
    let documentation = if state.settings.docs_enabled() {
        "/docs"
    } else {
        "disabled"
    };

    Json(GatewayInfo {
        service: "api-gateway".to_string(),
        version: VERSION.to_string(),
        status: "operational".to_string(),
        documentation: documentation.to_string(),
        legacy_compatibility: "enabled".to_string(),
        endpoints: EndpointSummary {
            health: "/health/".to_string(),
            auth: "/api/auth/*".to_string(),
            tenants: "/api/tenants/*".to_string(),
            tiers: "/api/tiers/*".to_string(),
            legacy: "Legacy routes are mapped automatically".to_string(),
        },
        services_backend: state.services.names().into_iter().map(String::from).collect(),
        routing: state.route_table.stats(),
    })
}

/// Health of the gateway and of every backend.
///
/// Always answers 200: backend outages only degrade `overall_status`.
#[utoipa::path(
    get,
    path = "/health/",
    responses((status = 200, description = "Gateway is up", body = HealthReport)),
    tag = "gateway"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let results = state.health_manager.check_all().await;

    let all_healthy = results.iter().all(|(_, health)| health.is_healthy());
    let services: BTreeMap<String, _> = results
        .into_iter()
        .map(|(kind, health)| (kind.name().to_string(), health))
        .collect();

    Json(HealthReport {
        gateway: GatewayHealth {
            status: "healthy".to_string(),
            version: VERSION.to_string(),
            overall_status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        },
        services,
        legacy_compatibility: "enabled".to_string(),
    })
}

/// VAT rates, served without reaching the document service
#[utoipa::path(
    get,
    path = "/api/quotes/vat-rates/",
    responses((status = 200, description = "Available VAT rates", body = [VatRate])),
    tag = "vat"
)]
pub async fn vat_rates() -> Json<Vec<VatRate>> {
    info!("Serving VAT rates");
    Json(VatRate::catalogue())
}

/// Default VAT rate
#[utoipa::path(
    get,
    path = "/vat-rates/default/",
    responses((status = 200, description = "Default VAT rate", body = VatRate)),
    tag = "vat"
)]
pub async fn default_vat_rate() -> Json<VatRate> {
    info!("Serving default VAT rate");
    Json(VatRate::default_rate())
}
