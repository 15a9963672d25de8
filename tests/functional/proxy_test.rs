//! Functional tests for the gateway router with a recording upstream

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use beenaya_gateway::{
    api::routes::create_router,
    backend::{ForwardRequest, ProbeOutcome, Upstream, UpstreamResponse},
    config::Settings,
    gateway::ServiceKind,
    AppError, AppState,
};

#[derive(Clone, Copy)]
enum Behaviour {
    Respond,
    Unreachable,
    Timeout,
}

/// Upstream double recording every forwarded request
struct RecordingUpstream {
    behaviour: Behaviour,
    healthy: bool,
    forwarded: Mutex<Vec<ForwardRequest>>,
}

impl RecordingUpstream {
    fn new(behaviour: Behaviour, healthy: bool) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            healthy,
            forwarded: Mutex::new(Vec::new()),
        })
    }

    fn last(&self) -> ForwardRequest {
        self.forwarded.lock().last().cloned().expect("a forwarded request")
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn forward(&self, request: ForwardRequest) -> beenaya_gateway::Result<UpstreamResponse> {
        let service = request.service;
        self.forwarded.lock().push(request);

        match self.behaviour {
            Behaviour::Respond => {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert("x-upstream", HeaderValue::from_static(service.name()));
                headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
                Ok(UpstreamResponse {
                    status: StatusCode::CREATED,
                    headers,
                    body: Bytes::from_static(br#"{"ok":true}"#),
                })
            }
            Behaviour::Unreachable => Err(AppError::UpstreamUnavailable(service.to_string())),
            Behaviour::Timeout => Err(AppError::UpstreamTimeout(service.to_string())),
        }
    }

    async fn probe(&self, _url: &str) -> ProbeOutcome {
        if self.healthy {
            ProbeOutcome::Healthy {
                elapsed: Duration::from_millis(3),
            }
        } else {
            ProbeOutcome::Unreachable {
                error: "connection refused".to_string(),
            }
        }
    }
}

fn app_with(settings: Settings, upstream: Arc<RecordingUpstream>) -> Router {
    let state = Arc::new(AppState::new(settings, upstream).unwrap());
    create_router(state).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_devis_forwarded_to_quotes() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let response = app.oneshot(get("/api/devis/123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let forwarded = upstream.last();
    assert_eq!(forwarded.method, Method::GET);
    assert_eq!(forwarded.service, ServiceKind::Documents);
    assert_eq!(forwarded.url, "http://localhost:8004/api/quotes/123");
}

#[tokio::test]
async fn test_tiers_forwarded_unchanged() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    app.oneshot(get("/api/tiers/42")).await.unwrap();

    assert_eq!(upstream.last().url, "http://localhost:8003/api/tiers/42");
}

#[tokio::test]
async fn test_query_string_method_headers_and_body_forwarded() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/factures/9/?expand=items")
        .header(header::HOST, "gateway.local")
        .header(header::AUTHORIZATION, "Bearer token")
        .header("x-tenant-id", "tenant-1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"status":"paid"}"#))
        .unwrap();

    app.oneshot(request).await.unwrap();

    let forwarded = upstream.last();
    assert_eq!(forwarded.method, Method::PATCH);
    assert_eq!(
        forwarded.url,
        "http://localhost:8004/api/invoices/9/?expand=items"
    );
    assert_eq!(forwarded.body, Bytes::from_static(br#"{"status":"paid"}"#));
    assert!(forwarded.headers.get(header::HOST).is_none());
    assert_eq!(forwarded.headers.get(header::AUTHORIZATION).unwrap(), "Bearer token");
    assert_eq!(forwarded.headers.get("x-tenant-id").unwrap(), "tenant-1");
}

#[tokio::test]
async fn test_upstream_response_relayed() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream);

    let response = app.oneshot(get("/api/auth/me/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers().get("x-upstream").unwrap(), "auth");
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert!(response.headers().get(header::CONNECTION).is_none());
    assert_eq!(json_body(response).await["ok"], true);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let response = app.oneshot(get("/api/nowhere/1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], "route_not_found");
    assert!(upstream.forwarded.lock().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_service_unavailable() {
    let upstream = RecordingUpstream::new(Behaviour::Unreachable, false);
    let app = app_with(Settings::default(), upstream);

    let response = app.oneshot(get("/api/tenants/1/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["code"], "upstream_unavailable");
}

#[tokio::test]
async fn test_slow_backend_is_gateway_timeout() {
    let upstream = RecordingUpstream::new(Behaviour::Timeout, true);
    let app = app_with(Settings::default(), upstream);

    let response = app.oneshot(get("/api/quotes/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_unsupported_method_rejected() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let request = Request::builder()
        .method(Method::TRACE)
        .uri("/api/quotes/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(upstream.forwarded.lock().is_empty());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let settings = Settings {
        max_body_bytes: 16,
        ..Settings::default()
    };
    let app = app_with(settings, upstream.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/quotes/")
        .body(Body::from(vec![b'x'; 64]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(upstream.forwarded.lock().is_empty());
}

#[tokio::test]
async fn test_health_ok_when_backends_down() {
    let upstream = RecordingUpstream::new(Behaviour::Unreachable, false);
    let app = app_with(Settings::default(), upstream);

    let response = app.oneshot(get("/health/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["gateway"]["status"], "healthy");
    assert_eq!(body["gateway"]["overall_status"], "degraded");
    assert_eq!(body["services"]["crm"]["status"], "unreachable");
    assert_eq!(
        body["services"]["documents"]["url"],
        "http://localhost:8004/health/"
    );
}

#[tokio::test]
async fn test_health_reports_healthy_backends() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let state = Arc::new(AppState::new(Settings::default(), upstream).unwrap());
    let app = create_router(state.clone()).unwrap();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["gateway"]["overall_status"], "healthy");
    assert_eq!(body["services"].as_object().unwrap().len(), 5);
    assert!(state.health_manager.last_status(ServiceKind::Auth).is_some());
    assert!(state.health_manager.unhealthy_services().is_empty());
}

#[tokio::test]
async fn test_docs_hidden_without_debug() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let response = app.clone().oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(upstream.forwarded.lock().is_empty());
}

#[tokio::test]
async fn test_docs_served_in_debug() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let settings = Settings {
        debug: true,
        ..Settings::default()
    };
    let app = app_with(settings, upstream);

    let response = app.clone().oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains(r##"dom_id: "#swagger-ui""##));

    let response = app.clone().oneshot(get("/redoc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["paths"]["/health/"].is_object());
}

#[tokio::test]
async fn test_gateway_info() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream);

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["service"], "api-gateway");
    assert_eq!(body["documentation"], "disabled");
    assert_eq!(body["services_backend"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_vat_rates_served_locally() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let response = app.clone().oneshot(get("/api/quotes/vat-rates/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    let response = app.oneshot(get("/vat-rates/default/")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["id"], "default_20");
    assert_eq!(body["is_default"], true);

    assert!(upstream.forwarded.lock().is_empty());
}

#[tokio::test]
async fn test_vat_rates_writes_are_proxied() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/quotes/vat-rates/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"rate":"8.5"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let forwarded = upstream.last();
    assert_eq!(forwarded.method, Method::POST);
    assert_eq!(forwarded.service, ServiceKind::Documents);
    assert_eq!(forwarded.url, "http://localhost:8004/api/quotes/vat-rates/");
}

#[tokio::test]
async fn test_cors_preflight_for_frontend_origin() {
    let upstream = RecordingUpstream::new(Behaviour::Respond, true);
    let app = app_with(Settings::default(), upstream.clone());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/devis/")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-tenant-id")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:8080"
    );
    assert!(upstream.forwarded.lock().is_empty());
}
