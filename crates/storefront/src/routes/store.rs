//! Store listing route handlers.
//!
//! The listing is rebuilt from the query string on every request. Facet
//! selections, the price range, the sort key and the view mode all live in
//! the URL, so every filter control is a plain link or GET form.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Redirect, Response},
};
use orchard_core::catalog::NAV_CATEGORIES;
use orchard_core::filter::Facet;
use orchard_core::{Category, FilterSelection, Listing, Price, Product, SortKey};
use rust_decimal::Decimal;
use tracing::{debug, instrument};
use url::form_urlencoded;

use crate::catalog::CatalogSnapshot;
use crate::filters;
use crate::routes::{NavLink, nav_links};
use crate::state::AppState;

/// Number of model quick-select chips above the grid.
const MODEL_CHIP_LIMIT: usize = 6;

// =============================================================================
// Query Parsing
// =============================================================================

/// Product grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    /// Parse a view token. Anything but `list` is the grid.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token == "list" { Self::List } else { Self::Grid }
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

/// Listing state carried in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub selection: FilterSelection,
    pub sort: SortKey,
    pub view: ViewMode,
}

impl ListingQuery {
    /// Parse a raw query string.
    ///
    /// `capacity`, `color` and `model` may repeat. Empty values, unknown keys
    /// and unparseable prices are ignored.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            if let Some(facet) = Facet::from_key(&key) {
                query.selection.select(facet, value.into_owned());
                continue;
            }
            match key.as_ref() {
                "sort" => query.sort = SortKey::from_token(&value),
                "view" => query.view = ViewMode::from_token(&value),
                "min_price" => {
                    if let Some(price) = parse_price(&value) {
                        query.selection.price_range.min = price;
                    }
                }
                "max_price" => {
                    if let Some(price) = parse_price(&value) {
                        query.selection.price_range.max = price;
                    }
                }
                _ => {}
            }
        }
        query
    }

    /// Query-string pairs for this state, omitting defaults.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.selection.query_pairs();
        if self.sort != SortKey::default() {
            pairs.push(("sort", self.sort.token().to_string()));
        }
        if self.view != ViewMode::default() {
            pairs.push(("view", self.view.token().to_string()));
        }
        pairs
    }

    /// Listing URL for `category` with this state.
    #[must_use]
    pub fn url(&self, category: &Category) -> String {
        let path = format!("/store/{}", urlencoding::encode(category.token()));
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return path;
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{path}?{query}")
    }

    fn with_selection(&self, selection: FilterSelection) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }
}

/// Parse a non-negative dollar amount.
fn parse_price(value: &str) -> Option<Price> {
    Decimal::from_str(value.trim())
        .ok()
        .filter(|amount| !amount.is_sign_negative())
        .map(Price::new)
}

// =============================================================================
// View Types
// =============================================================================

/// Product card display data.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub name: String,
    pub chip: String,
    pub ram: String,
    pub screen_size: String,
    pub colors: String,
    pub capacity: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            chip: product.chip.clone(),
            ram: product.ram.clone(),
            screen_size: product.screen_size.clone(),
            colors: product.colors.join(", "),
            capacity: product.capacity.join(", "),
            price: product.price.to_string(),
            image: product.image.clone(),
        }
    }
}

/// One checkbox-style facet option.
#[derive(Clone)]
pub struct FacetOptionView {
    pub value: String,
    pub selected: bool,
    /// Listing URL with this option toggled.
    pub toggle_url: String,
}

/// A titled group of facet options in the filter panel.
#[derive(Clone)]
pub struct FacetGroupView {
    pub title: &'static str,
    pub options: Vec<FacetOptionView>,
}

/// Sort menu entry.
#[derive(Clone)]
pub struct SortOptionView {
    pub label: &'static str,
    pub url: String,
    pub selected: bool,
}

/// Hidden input carried by the price form.
#[derive(Clone)]
pub struct HiddenField {
    pub name: &'static str,
    pub value: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Store listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/index.html")]
pub struct StoreTemplate {
    pub nav: Vec<NavLink>,
    pub heading: String,
    pub category_url: String,
    pub products: Vec<ProductCardView>,
    pub count: usize,
    pub model_chips: Vec<FacetOptionView>,
    pub facet_groups: Vec<FacetGroupView>,
    pub sort_options: Vec<SortOptionView>,
    pub sort_label: &'static str,
    pub min_price: String,
    pub max_price: String,
    pub hidden_fields: Vec<HiddenField>,
    /// Whether any facet value is selected.
    pub has_filters: bool,
    /// Listing URL with every facet and the price range reset.
    pub clear_url: String,
    pub list_view: bool,
    pub grid_url: String,
    pub list_url: String,
}

impl StoreTemplate {
    /// Build the page for a derived listing.
    #[must_use]
    pub fn build(category: &Category, query: &ListingQuery, listing: &Listing<'_>) -> Self {
        let option_views = |facet: Facet| -> Vec<FacetOptionView> {
            listing
                .facets
                .options(facet)
                .iter()
                .map(|value| FacetOptionView {
                    value: value.clone(),
                    selected: query.selection.is_selected(facet, value),
                    toggle_url: query
                        .with_selection(query.selection.toggled(facet, value))
                        .url(category),
                })
                .collect()
        };

        let mut facet_groups = vec![FacetGroupView {
            title: "Models",
            options: option_views(Facet::Model),
        }];
        if !listing.facets.capacities.is_empty() {
            facet_groups.push(FacetGroupView {
                title: "Capacity",
                options: option_views(Facet::Capacity),
            });
        }
        facet_groups.push(FacetGroupView {
            title: "Color",
            options: option_views(Facet::Color),
        });

        let model_chips = option_views(Facet::Model)
            .into_iter()
            .take(MODEL_CHIP_LIMIT)
            .collect();

        let sort_options = SortKey::ALL
            .iter()
            .map(|&key| SortOptionView {
                label: key.label(),
                url: ListingQuery {
                    sort: key,
                    ..query.clone()
                }
                .url(category),
                selected: key == query.sort,
            })
            .collect();

        let hidden_fields = query
            .query_pairs()
            .into_iter()
            .filter(|(name, _)| *name != "min_price" && *name != "max_price")
            .map(|(name, value)| HiddenField { name, value })
            .collect();

        let selection = &query.selection;
        Self {
            nav: nav_links(Some(category.token())),
            heading: heading(category),
            category_url: format!("/store/{}", urlencoding::encode(category.token())),
            products: listing.products.iter().map(|p| ProductCardView::from(*p)).collect(),
            count: listing.len(),
            model_chips,
            facet_groups,
            sort_options,
            sort_label: query.sort.label(),
            min_price: selection.price_range.min.amount().to_string(),
            max_price: selection.price_range.max.amount().to_string(),
            hidden_fields,
            has_filters: selection.has_facets(),
            clear_url: query.with_selection(FilterSelection::default()).url(category),
            list_view: query.view == ViewMode::List,
            grid_url: ListingQuery {
                view: ViewMode::Grid,
                ..query.clone()
            }
            .url(category),
            list_url: ListingQuery {
                view: ViewMode::List,
                ..query.clone()
            }
            .url(category),
        }
    }
}

/// Page heading for a category: its navigation label when it has one.
fn heading(category: &Category) -> String {
    match category {
        Category::All => "All".to_string(),
        Category::Named(token) => NAV_CATEGORIES
            .iter()
            .find(|&&(_, t)| t == token)
            .map_or_else(|| token.clone(), |&(label, _)| label.to_string()),
    }
}

/// Placeholder shown while the catalog is loading.
#[derive(Template, WebTemplate)]
#[template(path = "store/loading.html")]
pub struct StoreLoadingTemplate {
    pub nav: Vec<NavLink>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Redirect the bare store path to the full catalog.
pub async fn redirect_to_all() -> Redirect {
    Redirect::to("/store/all")
}

/// Display the filterable product listing for a category.
///
/// The first request starts the catalog load and gets the loading page,
/// which refreshes itself until the catalog is ready.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(category): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let category = Category::from_token(&category);
    let query = ListingQuery::parse(query.as_deref());

    let CatalogSnapshot::Ready(catalog) = state.catalog().ensure_loaded() else {
        debug!("Catalog still loading");
        return StoreLoadingTemplate {
            nav: nav_links(Some(category.token())),
        }
        .into_response();
    };

    let listing = Listing::derive(&catalog, &category, &query.selection, query.sort);
    debug!(count = listing.len(), "Listing derived");

    StoreTemplate::build(&category, &query, &listing).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use orchard_core::ProductId;

    use super::*;

    fn product(id: i64, category: &str, name: &str, price: i64, colors: &[&str], capacity: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            category: category.to_string(),
            name: name.to_string(),
            chip: "M4".to_string(),
            colors: colors.iter().map(ToString::to_string).collect(),
            capacity: capacity.iter().map(ToString::to_string).collect(),
            ram: "16GB".to_string(),
            screen_size: "13\"".to_string(),
            price: Price::from_dollars(price),
            image: format!("/static/images/{id}.png"),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "macbook", "MacBook Air", 1099, &["Midnight", "Silver"], &["256GB", "512GB"]),
            product(2, "macbook", "MacBook Pro", 1599, &["Space Black"], &["512GB"]),
            product(3, "airpods", "AirPods Pro 2", 249, &["White"], &[]),
        ]
    }

    #[test]
    fn test_parse_empty_query() {
        assert_eq!(ListingQuery::parse(None), ListingQuery::default());
        assert_eq!(ListingQuery::parse(Some("")), ListingQuery::default());
    }

    #[test]
    fn test_parse_repeated_facets_and_sort() {
        let query = ListingQuery::parse(Some(
            "capacity=256GB&capacity=1TB&color=Space+Black&model=MacBook%20Pro&sort=price-high&view=list",
        ));

        assert!(query.selection.is_selected(Facet::Capacity, "256GB"));
        assert!(query.selection.is_selected(Facet::Capacity, "1TB"));
        assert!(query.selection.is_selected(Facet::Color, "Space Black"));
        assert!(query.selection.is_selected(Facet::Model, "MacBook Pro"));
        assert_eq!(query.sort, SortKey::PriceHigh);
        assert_eq!(query.view, ViewMode::List);
    }

    #[test]
    fn test_parse_price_bounds() {
        let query = ListingQuery::parse(Some("min_price=200&max_price=999.5"));
        assert_eq!(query.selection.price_range.min, Price::from_dollars(200));
        assert_eq!(
            query.selection.price_range.max,
            Price::new(Decimal::new(9995, 1))
        );
    }

    #[test]
    fn test_parse_ignores_invalid_values() {
        let query = ListingQuery::parse(Some("min_price=cheap&max_price=-5&color=&foo=bar&sort=random"));
        assert_eq!(query, ListingQuery::default());
    }

    #[test]
    fn test_url_round_trips_state() {
        let query = ListingQuery::parse(Some("color=Space+Black&sort=name&max_price=1500"));
        let url = query.url(&Category::from_token("macbook"));

        let (path, raw) = url.split_once('?').unwrap();
        assert_eq!(path, "/store/macbook");
        assert_eq!(ListingQuery::parse(Some(raw)), query);
    }

    #[test]
    fn test_default_url_has_no_query() {
        assert_eq!(ListingQuery::default().url(&Category::All), "/store/all");
    }

    #[test]
    fn test_build_facet_groups() {
        let catalog = catalog();
        let category = Category::from_token("macbook");
        let query = ListingQuery::parse(Some("color=Midnight"));
        let listing = Listing::derive(&catalog, &category, &query.selection, query.sort);

        let page = StoreTemplate::build(&category, &query, &listing);
        let titles: Vec<&str> = page.facet_groups.iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Models", "Capacity", "Color"]);
        assert_eq!(page.count, 1);
        assert_eq!(page.heading, "Macbook");
        assert!(page.has_filters);
        assert_eq!(page.clear_url, "/store/macbook");

        let midnight = page.facet_groups[2]
            .options
            .iter()
            .find(|o| o.value == "Midnight")
            .unwrap();
        assert!(midnight.selected);
        assert_eq!(midnight.toggle_url, "/store/macbook");
    }

    #[test]
    fn test_build_hides_empty_capacity_group() {
        let catalog = catalog();
        let category = Category::from_token("airpods");
        let query = ListingQuery::default();
        let listing = Listing::derive(&catalog, &category, &query.selection, query.sort);

        let page = StoreTemplate::build(&category, &query, &listing);
        let titles: Vec<&str> = page.facet_groups.iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Models", "Color"]);
        assert!(!page.has_filters);
    }

    #[test]
    fn test_build_price_form_keeps_other_state() {
        let catalog = catalog();
        let category = Category::All;
        let query = ListingQuery::parse(Some("model=MacBook+Air&sort=price-low&min_price=100"));
        let listing = Listing::derive(&catalog, &category, &query.selection, query.sort);

        let page = StoreTemplate::build(&category, &query, &listing);
        let fields: Vec<(&str, &str)> = page
            .hidden_fields
            .iter()
            .map(|f| (f.name, f.value.as_str()))
            .collect();
        assert_eq!(fields, vec![("model", "MacBook Air"), ("sort", "price-low")]);
        assert_eq!(page.min_price, "100");
        assert_eq!(page.max_price, "2000");
        assert_eq!(page.sort_label, "Price: Low to High");
    }

    #[test]
    fn test_heading_for_unknown_category_is_token() {
        assert_eq!(heading(&Category::from_token("vision")), "vision");
        assert_eq!(heading(&Category::All), "All");
    }

    #[test]
    fn test_store_page_renders() {
        let catalog = catalog();
        let category = Category::All;
        let query = ListingQuery::default();
        let listing = Listing::derive(&catalog, &category, &query.selection, query.sort);

        let html = StoreTemplate::build(&category, &query, &listing).render().unwrap();
        assert!(html.contains("MacBook Pro"));
        assert!(html.contains("$1599"));
        assert!(html.contains("3 products"));
    }
}
