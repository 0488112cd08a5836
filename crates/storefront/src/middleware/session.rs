//! Session middleware configuration.
//!
//! Shop sessions live in process memory only. Restarting the server or
//! letting a session go idle discards the visitor's cart.
//!
//! Handlers read the whole shop session, change it and write it back, and
//! the session layer only persists the record after the handler returns. To
//! keep two requests carrying the same cookie from overwriting each other,
//! [`session_lock_middleware`] sits outside the session layer and runs them
//! one at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ishq_session";

/// Idle time after which a session is dropped (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer backed by an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Per-session request locks, keyed by session cookie value.
///
/// Entries exist only while some request holds or waits for them.
#[derive(Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl SessionLocks {
    /// Wait until no other request for `session_id` is in flight.
    pub async fn acquire(&self, session_id: &str) -> SessionLockGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(session_id.to_string()).or_default())
        };

        SessionLockGuard {
            guard: Some(lock.lock_owned().await),
            session_id: session_id.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of sessions with a request in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held for the duration of one request; releases the session on drop.
pub struct SessionLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    session_id: String,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for SessionLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map still references the mutex: nobody is waiting.
        if locks
            .get(&self.session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.session_id);
        }
    }
}

/// Extract the session cookie value from the request headers.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Serialize requests that carry the same session cookie.
///
/// Must be layered outside the session layer so the lock also covers the
/// store write that happens after the handler. Requests without a cookie get
/// a fresh session and need no lock.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session_id) = session_cookie(request.headers()).map(str::to_string) else {
        return next.run(request).await;
    };

    let _guard = state.session_locks().acquire(&session_id).await;
    next.run(request).await
}
