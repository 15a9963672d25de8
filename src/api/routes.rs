//! Router assembly

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{docs, handlers, proxy};
use crate::error::Result;
use crate::middleware::{cors::create_cors_layer, rate_limit::RateLimitLayer};
use crate::AppState;

/// Build the gateway router: static endpoints first, the proxy as fallback
pub fn create_router(state: Arc<AppState>) -> Result<Router> {
    let settings = state.settings.clone();

    let mut router = Router::new()
        .route("/", get(handlers::gateway_info))
        .route("/health/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))
        // Only reads are answered locally; writes still reach the documents service
        .route(
            "/api/quotes/vat-rates/",
            get(handlers::vat_rates).fallback(proxy::proxy_request),
        )
        .route(
            "/vat-rates/default/",
            get(handlers::default_vat_rate).fallback(proxy::proxy_request),
        );

    if settings.docs_enabled() {
        info!("Interactive documentation enabled at /docs");
        router = router.merge(docs::docs_router());
    }

    let mut router = router
        .fallback(proxy::proxy_request)
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(create_cors_layer(&settings.cors_allowed_origins)?);

    if let Some(rate_limit) = RateLimitLayer::from_settings(&settings) {
        router = router.layer(rate_limit);
    }

    Ok(router.layer(TraceLayer::new_for_http()).with_state(state))
}
