//! Session middleware configuration.
//!
//! Sessions live in process memory, in a `moka` cache that evicts records
//! idle for longer than the session expiry. The session holds the visitor's
//! cart, so a cart lives as long as its session.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::{self, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "orchard_session";

/// Session expiry in days.
const SESSION_EXPIRY_DAYS: i64 = 7;

/// Idle time after which the store drops a record (matches the expiry).
const SESSION_IDLE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on live sessions held in memory.
const SESSION_CAPACITY: u64 = 100_000;

/// In-memory session store with idle eviction.
#[derive(Debug, Clone)]
pub struct MokaSessionStore {
    cache: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store that drops records idle for `idle_ttl`.
    #[must_use]
    pub fn new(max_capacity: u64, idle_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle_ttl)
            .build();
        Self { cache }
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MokaSessionStore {
    fn default() -> Self {
        Self::new(SESSION_CAPACITY, SESSION_IDLE_TTL)
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(record) = self.cache.get(session_id).await else {
            return Ok(None);
        };
        if record.expiry_date <= OffsetDateTime::now_utc() {
            self.cache.invalidate(session_id).await;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer(
    store: MokaSessionStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<MokaSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            SESSION_EXPIRY_DAYS,
        )))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
