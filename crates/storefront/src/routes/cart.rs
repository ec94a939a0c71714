//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself is serialized into the visitor's session; every mutation
//! answers with the re-rendered cart panel and an `HX-Trigger` header so the
//! count badge in the navigation bar refreshes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use orchard_core::{Cart, CartItem, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::CartStore;
use crate::state::AppState;

/// Event name HTMX listeners use to refresh cart widgets.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Where a plain form post lands when it carries no usable `Referer`.
const FALLBACK_RETURN_PATH: &str = "/store/all";

/// Whether the request was sent by HTMX.
fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

/// Same-site path to send a plain form post back to.
///
/// Only the path and query of the `Referer` are kept.
fn return_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| url::Url::parse(referer).ok())
        .map_or_else(
            || FALLBACK_RETURN_PATH.to_string(),
            |url| match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_string(),
            },
        )
}

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    /// Whether the decrement button is live (quantity above 1).
    pub can_decrease: bool,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
            can_decrease: item.quantity > 1,
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: String,
    pub item_count: usize,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            total: cart.total_price().to_string(),
            item_count: cart.len(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Form data naming a cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub id: ProductId,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

impl CartPanelTemplate {
    fn new(cart: &Cart) -> Self {
        Self {
            cart: CartView::from(cart),
        }
    }
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

/// Display the cart panel.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let store = CartStore::open(session).await;
    CartPanelTemplate::new(store.cart())
}

/// Get cart count badge (HTMX).
///
/// Counts distinct lines, not units.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let store = CartStore::open(session).await;
    CartCountTemplate {
        count: store.cart().len(),
    }
}

/// Add a catalog product to the cart.
///
/// Adding a product already in the cart increases that line's quantity.
/// HTMX requests get the cart panel back; a plain form post is redirected
/// to the page it came from.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find(form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
    let quantity = form.quantity.unwrap_or(1);

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", form.product_id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );

    let mut store = CartStore::open(session).await;
    let cart = store
        .add_to_cart(CartItem::from_product(&product, quantity))
        .await?;

    if !is_htmx(&headers) {
        return Ok(Redirect::to(&return_path(&headers)).into_response());
    }

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartPanelTemplate::new(cart),
    )
        .into_response())
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CartLineForm>) -> Result<impl IntoResponse> {
    add_breadcrumb("cart", "Removed from cart", &[("product_id", form.id.to_string())]);

    let mut store = CartStore::open(session).await;
    let cart = store.remove_from_cart(form.id).await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartPanelTemplate::new(cart),
    ))
}

/// Increment a line's quantity (HTMX).
#[instrument(skip(session))]
pub async fn increase(
    session: Session,
    Form(form): Form<CartLineForm>,
) -> Result<impl IntoResponse> {
    let mut store = CartStore::open(session).await;
    let cart = store.increase_qty(form.id).await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartPanelTemplate::new(cart),
    ))
}

/// Decrement a line's quantity, never below 1 (HTMX).
#[instrument(skip(session))]
pub async fn decrease(
    session: Session,
    Form(form): Form<CartLineForm>,
) -> Result<impl IntoResponse> {
    let mut store = CartStore::open(session).await;
    let cart = store.decrease_qty(form.id).await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartPanelTemplate::new(cart),
    ))
}
