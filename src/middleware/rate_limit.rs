use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed-window limiter keyed by caller identity and endpoint, so one noisy
/// client cannot starve the others.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests: max_requests.max(1),
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        buckets.retain(|_, state| now.duration_since(state.start) < self.window);

        let state = buckets.entry(key.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if state.count < self.max_requests {
            state.count += 1;
            true
        } else {
            false
        }
    }
}

/// Authenticated callers are keyed by the bearer subject, so a refreshed
/// token does not grant a fresh budget; unauthenticated requests fall back
/// to the forwarded client address.
fn caller_key(req: &Request<Body>) -> String {
    let caller = crate::middleware::auth::bearer_subject(req)
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        })
        .unwrap_or_else(|| "anonymous".to_string());
    format!("{}:{}", caller, req.uri().path())
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.allow(&caller_key(&req)) {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::Claims;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn init_test_config() {
        std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        std::env::set_var("JWT_SECRET", "test_secret_key");
        std::env::set_var("DISCORD_BOT_TOKEN", "bot-token");
        std::env::set_var("DISCORD_APPLICATION_CHANNEL_ID", "123456");
        let _ = crate::config::init_config();
    }

    fn token(sub: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            role: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .expect("encode token")
    }

    fn request(token: Option<String>, path: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn caller_key_is_the_bearer_subject_not_the_raw_token() {
        init_test_config();

        let first = caller_key(&request(Some(token("alice", 3600)), "/api/applications"));
        let refreshed = caller_key(&request(Some(token("alice", 7200)), "/api/applications"));
        assert_eq!(first, "alice:/api/applications");
        // A refreshed token for the same subject shares the same budget.
        assert_eq!(first, refreshed);

        let other = caller_key(&request(Some(token("bob", 3600)), "/api/applications"));
        assert_ne!(first, other);
    }

    #[test]
    fn anonymous_callers_fall_back_to_the_forwarded_address() {
        init_test_config();

        let req = Request::builder()
            .uri("/api/applications")
            .header("x-forwarded-for", "10.0.0.9")
            .body(Body::empty())
            .unwrap();
        assert_eq!(caller_key(&req), "10.0.0.9:/api/applications");

        assert_eq!(
            caller_key(&request(None, "/api/applications")),
            "anonymous:/api/applications"
        );
    }

    #[test]
    fn callers_are_limited_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);

        assert!(limiter.allow("alice:/api/applications"));
        assert!(limiter.allow("alice:/api/applications"));
        assert!(!limiter.allow("alice:/api/applications"));

        // A different caller still has budget.
        assert!(limiter.allow("bob:/api/applications"));
        // As does the same caller on a different endpoint.
        assert!(limiter.allow("alice:/api/applications/form"));
    }
}
