use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    future::Future,
    net::SocketAddr,
    num::NonZeroU32,
    pin::Pin,
    sync::Arc,
    time::Duration,
};
use tokio::task::JoinHandle;
use tower::{Layer, Service};

/// Per-client limiter for the credential endpoints; bounds online guessing
/// of passwords and six-digit codes.
pub type ClientRateLimiter = Arc<DefaultKeyedRateLimiter<String>>;

/// How often idle client buckets are evicted.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub fn create_rate_limiter(burst: u32, per_minute: u32) -> ClientRateLimiter {
    let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
    let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    keyed_limiter(Quota::per_minute(per_minute).allow_burst(burst))
}

fn keyed_limiter(quota: Quota) -> ClientRateLimiter {
    Arc::new(RateLimiter::keyed(quota))
}

/// Drops buckets that have fully refilled and returns how many remain.
pub fn prune_idle_clients(limiter: &DefaultKeyedRateLimiter<String>) -> usize {
    limiter.retain_recent();
    limiter.shrink_to_fit();
    limiter.len()
}

/// Prunes `limiter` every `period` until the last strong reference to it
/// is gone. Returns `None` outside a Tokio runtime.
pub fn spawn_pruner(limiter: &ClientRateLimiter, period: Duration) -> Option<JoinHandle<()>> {
    let handle = tokio::runtime::Handle::try_current().ok()?;
    let weak = Arc::downgrade(limiter);

    Some(handle.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(limiter) = weak.upgrade() else {
                break;
            };
            let remaining = prune_idle_clients(&limiter);
            tracing::debug!(remaining, "pruned idle rate limit buckets");
        }
    }))
}

/// The socket peer, or the first `X-Forwarded-For` hop when the deployment
/// sits behind a proxy that sets that header. Callers exposing neither
/// share one bucket.
pub fn client_key(request: &Request<Body>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: ClientRateLimiter,
    trust_forwarded_for: bool,
}

impl RateLimitLayer {
    pub fn new(limiter: ClientRateLimiter, trust_forwarded_for: bool) -> Self {
        Self {
            limiter,
            trust_forwarded_for,
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: ClientRateLimiter,
    trust_forwarded_for: bool,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let trust_forwarded_for = self.trust_forwarded_for;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let key = client_key(&request, trust_forwarded_for);
            if limiter.check_key(&key).is_err() {
                tracing::warn!(client = %key, path = %request.uri().path(), "rate limit exceeded");
                return Ok((
                    StatusCode::TOO_MANY_REQUESTS,
                    axum::Json(serde_json::json!({
                        "statusCode": 429,
                        "success": false,
                        "message": "Too many requests, try again later",
                    })),
                )
                    .into_response());
            }
            inner.call(request).await
        })
    }
}
