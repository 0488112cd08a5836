//! Shop session persistence in the tower-sessions store.
//!
//! The whole [`ShopSession`] (cart plus selected section) is stored under a
//! single key. Handlers load it, dispatch an intent, and save it back;
//! [`crate::middleware::session_lock_middleware`] keeps that sequence from
//! interleaving between requests of the same visitor.

use ishq_core::ShopSession;
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart and selected section.
    pub const SHOP: &str = "shop";
}

/// Load the visitor's shop session, starting a fresh one if none is stored.
///
/// An unreadable entry is logged and replaced rather than failing the page.
pub async fn load_shop(session: &Session) -> ShopSession {
    match session.get::<ShopSession>(keys::SHOP).await {
        Ok(shop) => shop.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read shop session, starting fresh");
            ShopSession::default()
        }
    }
}

/// Store the visitor's shop session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save_shop(
    session: &Session,
    shop: &ShopSession,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::SHOP, shop).await
}
