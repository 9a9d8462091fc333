//! Per-client rate limiting.
//!
//! Login is throttled per network client. Password changes are throttled per
//! session identity inside the handler, after the session has been resolved,
//! so a caller without a session always sees `UNAUTHORIZED` and rotating
//! addresses does not buy a stolen session more guesses.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock,
    },
    time::{Duration, Instant},
};

use crate::web::error::ApiError;

/// Per-client rate limiter using Governor.
pub type ClientRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

struct ClientEntry {
    limiter: ClientRateLimiter,
    /// Milliseconds since the owning state was created.
    last_seen_ms: AtomicU64,
}

type LimiterMap = RwLock<HashMap<String, Arc<ClientEntry>>>;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Entries untouched for this long are evicted by the cleanup task.
///
/// Longer than a quota window, so evicting never refills a bucket early.
pub const IDLE_EVICTION: Duration = Duration::from_secs(600);

/// State for rate limiting.
pub struct RateLimitState {
    login_limiters: LimiterMap,
    credential_limiters: LimiterMap,
    api_limiters: LimiterMap,
    /// Credential endpoint quota (requests per minute).
    auth_rate_limit: u32,
    /// General API quota (requests per minute).
    api_rate_limit: u32,
    trust_proxy_headers: bool,
    started: Instant,
}

impl RateLimitState {
    /// Create a new rate limit state keyed on the peer address.
    pub fn new(auth_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            login_limiters: RwLock::new(HashMap::new()),
            credential_limiters: RwLock::new(HashMap::new()),
            api_limiters: RwLock::new(HashMap::new()),
            auth_rate_limit,
            api_rate_limit,
            trust_proxy_headers: false,
            started: Instant::now(),
        }
    }

    /// Key clients on `X-Forwarded-For` / `X-Real-IP` when set.
    ///
    /// Only enable behind a reverse proxy that overwrites these headers.
    pub fn with_trusted_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn check(&self, limiters: &LimiterMap, key: &str, requests_per_minute: u32) -> bool {
        let entry = limiters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        let entry = match entry {
            Some(entry) => entry,
            None => {
                let mut guard = limiters.write().unwrap_or_else(PoisonError::into_inner);
                guard
                    .entry(key.to_string())
                    .or_insert_with(|| {
                        let quota = Quota::per_minute(
                            NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN),
                        );
                        Arc::new(ClientEntry {
                            limiter: RateLimiter::direct(quota),
                            last_seen_ms: AtomicU64::new(0),
                        })
                    })
                    .clone()
            }
        };

        entry.last_seen_ms.store(self.now_ms(), Ordering::Relaxed);
        entry.limiter.check().is_ok()
    }

    /// Check if a login attempt is allowed for the given client address.
    pub fn check_auth(&self, client: &str) -> bool {
        self.check(&self.login_limiters, client, self.auth_rate_limit)
    }

    /// Check if a password change is allowed for the given session identity.
    pub fn check_credential_change(&self, identity: &str) -> bool {
        self.check(&self.credential_limiters, identity, self.auth_rate_limit)
    }

    /// Check if a general API request is allowed for the given client.
    pub fn check_api(&self, client: &str) -> bool {
        self.check(&self.api_limiters, client, self.api_rate_limit)
    }

    /// Evict entries that have not been checked for `max_idle`.
    pub fn cleanup_idle(&self, max_idle: Duration) {
        let now = self.now_ms();
        let max_idle_ms = max_idle.as_millis() as u64;
        for limiters in [
            &self.login_limiters,
            &self.credential_limiters,
            &self.api_limiters,
        ] {
            limiters
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|_, entry| {
                    now.saturating_sub(entry.last_seen_ms.load(Ordering::Relaxed)) < max_idle_ms
                });
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        [
            &self.login_limiters,
            &self.credential_limiters,
            &self.api_limiters,
        ]
        .iter()
        .map(|limiters| limiters.read().unwrap_or_else(PoisonError::into_inner).len())
        .sum()
    }

    /// Start a background task that periodically evicts idle clients.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVAL).await;
                self.cleanup_idle(IDLE_EVICTION);
                tracing::debug!(clients = self.tracked_clients(), "Rate limiter cleanup");
            }
        });
    }

    /// Identify the client for address-keyed quotas.
    ///
    /// Proxy headers are client controlled, so they are read only when
    /// trusted; otherwise the TCP peer address is used.
    fn client_ip(&self, req: &Request<Body>) -> String {
        if self.trust_proxy_headers {
            let headers = req.headers();

            if let Some(first) = headers
                .get("X-Forwarded-For")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return first.to_string();
            }

            if let Some(real_ip) = headers
                .get("X-Real-IP")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return real_ip.to_string();
            }
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return addr.ip().to_string();
        }

        "unknown".to_string()
    }
}

/// Rate limiting middleware for the login endpoint.
pub async fn auth_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = state.client_ip(&req);

    if !state.check_auth(&ip) {
        tracing::warn!(ip = %ip, path = %req.uri().path(), "Credential rate limit exceeded");
        return ApiError::too_many_requests("Too many attempts. Please try again later.")
            .into_response();
    }

    next.run(req).await
}

/// Rate limiting middleware for the general API.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = state.client_ip(&req);

    if !state.check_api(&ip) {
        tracing::warn!(ip = %ip, "API rate limit exceeded");
        return ApiError::too_many_requests("Too many requests. Please try again later.")
            .into_response();
    }

    next.run(req).await
}
