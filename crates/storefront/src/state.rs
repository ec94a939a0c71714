//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogStore;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The catalog is not read here; it loads on the first store page visit.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let catalog = CatalogStore::new(config.catalog_path.clone());
        Self::with_catalog(config, catalog)
    }

    /// Create application state around an existing catalog store.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, catalog: CatalogStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, catalog }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }
}
