//! Application state shared across handlers.

use std::sync::Arc;

use ishq_core::Catalog;

use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::middleware::SessionLocks;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything behind it is
/// read-only after startup apart from the session locks; per-visitor state
/// lives in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    content: ContentStore,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create the application state, loading content pages from
    /// `config.content_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content directory cannot be read.
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Result<Self, ContentError> {
        let content = ContentStore::load(&config.content_dir)?;
        tracing::info!(
            products = catalog.len(),
            pages = content.len(),
            "Catalog and content loaded"
        );
        Ok(Self::from_parts(config, catalog, content))
    }

    /// Assemble state from already-loaded parts.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, catalog: Catalog, content: ContentStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                content,
                session_locks: SessionLocks::default(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get the per-session request locks.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }
}
