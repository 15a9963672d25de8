//! Catch-all proxy forwarding unmatched requests to the backend services

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::backend::headers::{forwardable_request_headers, relayable_response_headers};
use crate::backend::traits::{ForwardRequest, UpstreamResponse};
use crate::error::{AppError, Result};
use crate::AppState;

/// Methods the gateway forwards
pub fn is_forwardable(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET
            | Method::POST
            | Method::PUT
            | Method::PATCH
            | Method::DELETE
            | Method::OPTIONS
            | Method::HEAD
    )
}

/// Resolve the path against the route table and relay the backend's answer
pub async fn proxy_request(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    if !is_forwardable(&method) {
        return Err(AppError::MethodNotAllowed(method.to_string()));
    }

    let path = uri.path();
    let route = state.route_table.resolve(path).map_err(|e| {
        info!(method = %method, path = %path, "No route configured");
        e
    })?;
    let url = route.url(uri.query());

    debug!(method = %method, path = %path, target = %url, "Routing request");

    let started = Instant::now();
    let response = state
        .upstream
        .forward(ForwardRequest {
            service: route.service,
            method: method.clone(),
            url,
            headers: forwardable_request_headers(&headers),
            body,
        })
        .await?;

    info!(
        method = %method,
        path = %path,
        service = %route.service,
        target = %route.target_path,
        status = response.status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request forwarded"
    );

    Ok(relay(response))
}

fn relay(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = relayable_response_headers(&upstream.headers);
    response
}
