use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    cache::{KvStore, RateLimitCacheOperations, RateLimitStatus},
    config::Config,
    error::AppError,
    utils::{ClientIp, resolve_client_ip},
};

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    config: Arc<Config>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    pub async fn check_rate_limit(
        self: Arc<Self>,
        mut req: Request<Body>,
        next: Next,
    ) -> Result<Response, AppError> {
        let ip = resolve_client_ip(&req, self.config.trust_proxy_headers);
        tracing::debug!("rate limit check for client: {}", ip);

        let status = RateLimitCacheOperations::record_hit(
            &self.store,
            &ip,
            self.config.rate_limit_window_secs,
            self.config.rate_limit_requests,
        )
        .await?;

        if status.exceeded() {
            tracing::info!(
                "Rate limit exceeded for {} ({} requests, resets in {}s)",
                ip,
                status.count,
                status.reset_after_secs
            );
            let mut response = AppError::RateLimited {
                max: self.config.rate_limit_requests,
            }
            .into_response();
            let headers = response.headers_mut();
            apply_rate_limit_headers(headers, &status);
            headers.insert(RETRY_AFTER, HeaderValue::from(status.reset_after_secs));
            return Ok(response);
        }

        req.extensions_mut().insert(ClientIp(ip));
        let mut response = next.run(req).await;
        apply_rate_limit_headers(response.headers_mut(), &status);
        Ok(response)
    }
}

fn apply_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(status.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(status.remaining()));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(status.reset_after_secs));
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check_rate_limit(req, next).await
}
