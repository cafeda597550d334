//! Rate limiting middleware using Governor.
//!
//! Requests are billed against the identity behind them, not the raw
//! header: a caller with a valid session token gets a per-user bucket,
//! everyone else shares one anonymous bucket. A forged or expired token
//! therefore cannot mint itself a fresh quota.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use spiderpay_types::UserId;

use crate::security::TokenIssuer;

/// Quota applied when the deployment does not configure one.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// Sweep idle buckets once the key table grows past this size.
const SWEEP_THRESHOLD: usize = 10_000;

/// The identity a request is billed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CallerKey {
    /// Holder of a verified session token
    User(UserId),
    /// Everyone else, bad tokens included
    Anonymous,
}

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiter: RateLimiter<CallerKey, DefaultKeyedStateStore<CallerKey>, DefaultClock>,
    tokens: TokenIssuer,
}

impl RateLimiterState {
    /// Creates a keyed limiter allowing `requests` per `period` for each
    /// caller.
    ///
    /// # Panics
    /// Panics if `requests` is zero or `period` is zero.
    pub fn new(tokens: TokenIssuer, requests: u32, period: Duration) -> Self {
        let quota = Quota::with_period(period)
            .expect("rate limit period must be non-zero")
            .allow_burst(NonZeroU32::new(requests).expect("rate limit quota must be non-zero"));

        Self {
            limiter: RateLimiter::keyed(quota),
            tokens,
        }
    }

    /// Resolves the bucket a request is billed against.
    fn caller_key(&self, headers: &HeaderMap) -> CallerKey {
        headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.verify(token))
            .map(CallerKey::User)
            .unwrap_or(CallerKey::Anonymous)
    }

    /// Bills one request to the key.
    /// Returns true if the request is allowed, false if rate limited.
    fn check(&self, key: &CallerKey) -> bool {
        // Keys whose buckets have fully refilled carry no state worth
        // keeping; dropping them bounds the table under caller churn.
        if self.limiter.len() > SWEEP_THRESHOLD {
            self.limiter.retain_recent();
        }
        self.limiter.check_key(key).is_ok()
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = limiter.caller_key(request.headers());
    if !limiter.check(&key) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"rate-limit-test-secret";

    fn state(requests: u32) -> RateLimiterState {
        RateLimiterState::new(
            TokenIssuer::with_default_ttl(SECRET),
            requests,
            Duration::from_secs(60),
        )
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", token).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_verified_tokens_get_per_user_buckets() {
        let state = state(1);
        let issuer = TokenIssuer::with_default_ttl(SECRET);
        let alice = state.caller_key(&bearer(&issuer.issue(UserId::new()).unwrap()));
        let bob = state.caller_key(&bearer(&issuer.issue(UserId::new()).unwrap()));
        assert_ne!(alice, bob);

        assert!(state.check(&alice));
        assert!(!state.check(&alice));
        // Exhausting one user's quota leaves the other untouched.
        assert!(state.check(&bob));
    }

    #[test]
    fn test_tokens_for_one_user_share_a_bucket() {
        let state = state(1);
        let issuer = TokenIssuer::with_default_ttl(SECRET);
        let user = UserId::new();

        let first = state.caller_key(&bearer(&issuer.issue(user).unwrap()));
        let second = state.caller_key(&bearer(&issuer.issue(user).unwrap()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unverifiable_callers_share_the_anonymous_bucket() {
        let state = state(1);
        let forged = TokenIssuer::with_default_ttl(b"some-other-secret")
            .issue(UserId::new())
            .unwrap();

        assert_eq!(state.caller_key(&bearer(&forged)), CallerKey::Anonymous);
        assert_eq!(state.caller_key(&bearer("garbage")), CallerKey::Anonymous);
        assert_eq!(state.caller_key(&HeaderMap::new()), CallerKey::Anonymous);

        assert!(state.check(&CallerKey::Anonymous));
        assert!(!state.check(&CallerKey::Anonymous));
    }

    #[test]
    fn test_limiter_survives_key_churn() {
        let state = state(2);

        for _ in 0..(SWEEP_THRESHOLD + 10) {
            assert!(state.check(&CallerKey::User(UserId::new())));
        }

        // The sweep path has run; fresh callers still get their quota.
        let fresh = CallerKey::User(UserId::new());
        assert!(state.check(&fresh));
        assert!(state.check(&fresh));
        assert!(!state.check(&fresh));
    }
}
