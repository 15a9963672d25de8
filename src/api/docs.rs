//! OpenAPI document and interactive documentation, served in debug mode only.

use axum::{
    response::{Html, Json},
    routing::get,
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::api::{handlers, models};
use crate::error::ErrorResponse;
use crate::gateway::{HealthState, RouteTableStats, ServiceHealth};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Beenaya API Gateway",
        description = "Central entry point for the Beenaya services, with legacy frontend route compatibility"
    ),
    paths(
        handlers::gateway_info,
        handlers::health_check,
        handlers::vat_rates,
        handlers::default_vat_rate
    ),
    components(schemas(
        models::GatewayInfo,
        models::EndpointSummary,
        models::HealthReport,
        models::GatewayHealth,
        models::VatRate,
        RouteTableStats,
        ServiceHealth,
        HealthState,
        ErrorResponse
    )),
    tags(
        (name = "gateway", description = "Gateway status"),
        (name = "vat", description = "VAT rates served by the gateway")
    )
)]
pub struct ApiDoc;

/// Documentation routes, merged into the main router when `DEBUG` is set
pub fn docs_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_swagger_html))
        .route("/redoc", get(serve_redoc_html))
}

pub async fn serve_openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn serve_swagger_html() -> Html<&'static str> {
    Html(
        r##"<!DOCTYPE html>
<html>
<head>
    <title>Beenaya API Gateway - Swagger UI</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
        };
    </script>
</body>
</html>"##,
    )
}

pub async fn serve_redoc_html() -> Html<&'static str> {
    Html(
        r##"<!DOCTYPE html>
<html>
<head>
    <title>Beenaya API Gateway - ReDoc</title>
</head>
<body>
    <redoc spec-url="/openapi.json"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>"##,
    )
}
