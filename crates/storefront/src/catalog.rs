//! Catalog loading.
//!
//! The catalog is a static JSON fixture read once, the first time a store
//! page is requested. A background task reads and parses the file while the
//! store page renders a loading state. When the task finishes the catalog is
//! swapped in; a read or parse failure leaves it empty. Nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use orchard_core::{Product, ProductId};
use thiserror::Error;
use tracing::{error, info, instrument};

/// Error reading the catalog fixture.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a catalog fixture.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or is not a JSON array
/// of products.
pub async fn read_catalog(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Product::parse_list(&json).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// What a request sees of the catalog.
#[derive(Debug, Clone)]
pub enum CatalogSnapshot {
    /// The fixture is still being read.
    Loading,
    /// The catalog is available (possibly empty after a failed load).
    Ready(Arc<Vec<Product>>),
}

#[derive(Debug)]
enum LoadState {
    Idle,
    Loading,
    Ready(Arc<Vec<Product>>),
}

/// Lazily loaded, shared catalog.
///
/// Cheap to clone; all clones share the same load state.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: Arc<PathBuf>,
    state: Arc<RwLock<LoadState>>,
}

impl CatalogStore {
    /// Create a store for the fixture at `path`. Nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            state: Arc::new(RwLock::new(LoadState::Idle)),
        }
    }

    /// Create a store that already holds `products`.
    #[must_use]
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            path: Arc::new(PathBuf::new()),
            state: Arc::new(RwLock::new(LoadState::Ready(Arc::new(products)))),
        }
    }

    /// Current snapshot without triggering a load.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            LoadState::Ready(products) => CatalogSnapshot::Ready(Arc::clone(products)),
            LoadState::Idle | LoadState::Loading => CatalogSnapshot::Loading,
        }
    }

    /// Current snapshot, starting the background load on first use.
    #[must_use]
    pub fn ensure_loaded(&self) -> CatalogSnapshot {
        if self.begin_load() {
            let store = self.clone();
            info!(path = %self.path.display(), "Spawning background catalog load");
            tokio::spawn(async move {
                store.finish_load().await;
            });
        }
        self.snapshot()
    }

    /// Load the catalog now and wait for it.
    ///
    /// Returns immediately if the catalog is already loaded. If another load
    /// is in flight this performs its own read; the last one to finish wins.
    pub async fn load(&self) -> Arc<Vec<Product>> {
        if let CatalogSnapshot::Ready(products) = self.snapshot() {
            return products;
        }
        self.begin_load();
        self.finish_load().await
    }

    /// Find a product by id in the loaded catalog.
    ///
    /// Returns `None` while the catalog is loading.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<Product> {
        match self.snapshot() {
            CatalogSnapshot::Ready(products) => products.iter().find(|p| p.id == id).cloned(),
            CatalogSnapshot::Loading => None,
        }
    }

    /// Move `Idle` to `Loading`. Returns whether this call made the move.
    fn begin_load(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, LoadState::Idle) {
            *state = LoadState::Loading;
            true
        } else {
            false
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn finish_load(&self) -> Arc<Vec<Product>> {
        let products = match read_catalog(&self.path).await {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                products
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog, serving an empty store");
                Vec::new()
            }
        };

        let products = Arc::new(products);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            LoadState::Ready(Arc::clone(&products));
        products
    }
}
