//! Integration tests for Orchard.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p orchard-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - Landing page, health check, security headers
//! - `storefront_listing` - Store listing filters, sorting and catalog loading
//! - `storefront_cart` - Session-backed cart operations
//!
//! Each test starts its own storefront on an ephemeral port with a temporary
//! catalog fixture, and drives it with a cookie-keeping `reqwest` client.

use std::path::PathBuf;

use orchard_storefront::catalog::CatalogStore;
use orchard_storefront::config::StorefrontConfig;
use orchard_storefront::state::AppState;
use reqwest::Client;

/// Catalog fixture shared by the storefront tests.
pub const FIXTURE: &str = r#"[
    {"id": 1, "category": "macbook", "name": "MacBook Air", "chip": "M3",
     "colors": ["Midnight", "Silver"], "capacity": ["256GB", "512GB"], "ram": "8GB",
     "screenSize": "13.6\"", "price": 1099, "image": "/static/images/macbook-air.png"},
    {"id": 2, "category": "iphone", "name": "iPhone 16", "chip": "A18",
     "colors": ["Black", "Pink"], "capacity": ["128GB", "256GB"], "ram": "8GB",
     "screenSize": "6.1\"", "price": 799, "image": "/static/images/iphone-16.png"},
    {"id": 3, "category": "iphone", "name": "iPhone 16 Pro", "chip": "A18 Pro",
     "colors": ["Black Titanium", "Desert Titanium"], "capacity": ["256GB", "1TB"], "ram": "8GB",
     "screenSize": "6.3\"", "price": 999, "image": "/static/images/iphone-16-pro.png"},
    {"id": 4, "category": "iphone", "name": "iPhone 16e", "chip": "A18",
     "colors": ["Black", "White"], "capacity": ["128GB"], "ram": "8GB",
     "screenSize": "6.1\"", "price": 599, "image": "/static/images/iphone-16e.png"},
    {"id": 5, "category": "airpods", "name": "AirPods Max", "chip": "H1",
     "colors": ["Midnight", "Blue"], "capacity": [], "ram": "-",
     "screenSize": "-", "price": 549, "image": "/static/images/airpods-max.png"},
    {"id": 6, "category": "macbook", "name": "MacBook Pro 16", "chip": "M4 Pro",
     "colors": ["Space Black"], "capacity": ["1TB"], "ram": "24GB",
     "screenSize": "16.2\"", "price": 2499, "image": "/static/images/macbook-pro-16.png"}
]"#;

/// A storefront running on an ephemeral port.
pub struct TestServer {
    base_url: String,
    catalog_path: PathBuf,
    /// Client with its own cookie jar (one visitor session).
    pub client: Client,
}

impl TestServer {
    /// Start a storefront over [`FIXTURE`] with the catalog already loaded.
    pub async fn start() -> Self {
        Self::start_with(FIXTURE, true).await
    }

    /// Start a storefront over `catalog_json`.
    ///
    /// With `preload` false the catalog is left unread, so the first store
    /// visit observes the loading state.
    pub async fn start_with(catalog_json: &str, preload: bool) -> Self {
        let catalog_path =
            std::env::temp_dir().join(format!("orchard-it-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&catalog_path, catalog_json).expect("write catalog fixture");

        let path_value = catalog_path.display().to_string();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_CATALOG_PATH" => Some(path_value.clone()),
            "STOREFRONT_PORT" => Some("0".to_string()),
            _ => None,
        })
        .expect("test configuration");

        let catalog = CatalogStore::new(&catalog_path);
        if preload {
            catalog.load().await;
        }
        let state = AppState::with_catalog(config, catalog);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");

        tokio::spawn(async move {
            axum::serve(listener, orchard_storefront::app(state))
                .await
                .expect("storefront server");
        });

        Self {
            base_url: format!("http://{addr}"),
            catalog_path,
            client: new_client(),
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the body text.
    pub async fn get_text(&self, path: &str) -> String {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request")
            .text()
            .await
            .expect("response body")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.catalog_path);
    }
}

/// A client with a fresh cookie jar.
#[must_use]
pub fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}
