//! Per-session ordering of cart changes.
//!
//! A cart change reads the cart from the session, updates it, and the session
//! layer writes the record back after the handler returns. Overlapping POSTs
//! from one visitor would read the same cart and the last write would win, so
//! POSTs carrying the same session cookie run one at a time. This layer sits
//! outside the session layer so the lock also covers the session save.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;

/// Idle time after which an unused lock is dropped.
const LOCK_IDLE_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on locks held in memory.
const LOCK_CAPACITY: u64 = 100_000;

/// One mutex per session cookie value.
#[derive(Debug, Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        let locks = Cache::builder()
            .max_capacity(LOCK_CAPACITY)
            .time_to_idle(LOCK_IDLE_TTL)
            .build();
        Self { locks }
    }

    async fn lock_for(&self, session_id: String) -> Arc<Mutex<()>> {
        self.locks
            .get_with(session_id, async { Arc::new(Mutex::new(())) })
            .await
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Run POSTs that share a session cookie one at a time.
///
/// Requests without a session cookie get a fresh session, so nothing else can
/// touch their cart and they pass straight through.
pub async fn session_lock_middleware(
    State(locks): State<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }
    let Some(session_id) = session_cookie(request.headers()) else {
        return next.run(request).await;
    };

    let lock = locks.lock_for(session_id).await;
    let _guard = lock.lock().await;
    next.run(request).await
}

/// Value of the session cookie, if the request carries one.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_cookie_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; orchard_session=abc123; lang=en"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_same_session_shares_one_lock() {
        let locks = SessionLocks::new();
        let a = locks.lock_for("abc".to_string()).await;
        let b = locks.lock_for("abc".to_string()).await;
        let c = locks.lock_for("xyz".to_string()).await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let _held = a.lock().await;
        assert!(b.try_lock().is_err());
        assert!(c.try_lock().is_ok());
    }
}
