//! Gateway-wide request throttling backed by governor

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    num::NonZeroU32,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::AppError;

type GatewayLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Health probes are never throttled
fn is_exempt(path: &str) -> bool {
    path == "/health" || path == "/health/"
}

/// One quota shared by every proxied and local request
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Arc<GatewayLimiter>,
    clock: DefaultClock,
}

impl RateLimitLayer {
    /// Quotas of zero are clamped to one; settings validation rejects them earlier
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        let clock = DefaultClock::default();

        Self {
            limiter: Arc::new(RateLimiter::direct_with_clock(quota, &clock)),
            clock,
        }
    }

    /// `None` unless `RATE_LIMIT_ENABLED` is set
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if !settings.rate_limit_enabled {
            return None;
        }
        info!(
            rps = settings.rate_limit_rps,
            burst = settings.rate_limit_burst,
            "Rate limiting enabled"
        );
        Some(Self::new(settings.rate_limit_rps, settings.rate_limit_burst))
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimited<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimited {
            inner,
            limiter: self.limiter.clone(),
            clock: self.clock.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimited<S> {
    inner: S,
    limiter: Arc<GatewayLimiter>,
    clock: DefaultClock,
}

/// 429 with the standard error body and a whole-second `Retry-After`
fn too_many_requests(retry_after_secs: u64) -> Response {
    let mut response = AppError::RateLimitExceeded.into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs.max(1)));
    response
}

impl<S> Service<Request<Body>> for RateLimited<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        if is_exempt(request.uri().path()) {
            return Box::pin(self.inner.call(request));
        }

        match self.limiter.check() {
            Ok(()) => Box::pin(self.inner.call(request)),
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                let retry_after = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
                warn!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    retry_after_secs = retry_after,
                    "Rate limit exceeded"
                );
                Box::pin(async move { Ok(too_many_requests(retry_after)) })
            }
        }
    }
}
