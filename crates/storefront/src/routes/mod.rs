//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Health check
//!
//! # Store
//! GET  /store                  - Redirect to /store/all
//! GET  /store/{category}       - Filterable product listing
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart panel fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add product (returns panel, triggers cart-updated)
//! POST /cart/remove            - Remove line (returns panel, triggers cart-updated)
//! POST /cart/increase          - Increment line quantity
//! POST /cart/decrease          - Decrement line quantity (stops at 1)
//! ```

pub mod cart;
pub mod home;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use orchard_core::catalog::NAV_CATEGORIES;

use crate::state::AppState;

/// Navigation bar link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Navigation links, marking the one for `active_category` as active.
#[must_use]
pub fn nav_links(active_category: Option<&str>) -> Vec<NavLink> {
    NAV_CATEGORIES
        .iter()
        .map(|&(label, token)| NavLink {
            label,
            href: format!("/store/{token}"),
            active: active_category == Some(token),
        })
        .collect()
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/store", get(store::redirect_to_all))
        .route("/store/{category}", get(store::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(home::home))
        // Store listing
        .merge(store_routes())
        // Cart fragments and mutations
        .nest("/cart", cart_routes())
}
