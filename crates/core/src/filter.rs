//! Catalog filter pipeline.
//!
//! Derives the displayed product list from the full catalog in four steps:
//!
//! 1. Category: exact match on `Product::category`, or everything for `all`.
//! 2. Facets: capacity and color pass when the product shares at least one
//!    value with the selection; model passes when the product name is
//!    selected. Empty facets pass everything. Facets are ANDed together.
//! 3. Price: inclusive range.
//! 4. Sort by one of the [`SortKey`]s.
//!
//! The whole list is rebuilt from the inputs on every call to
//! [`Listing::derive`]; there is no incremental state.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::catalog::{Category, Product};
use crate::types::Price;

/// Default upper bound of the price filter, in dollars.
pub const DEFAULT_MAX_PRICE: i64 = 2000;

/// Inclusive price interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Price, max: Price) -> Self {
        Self { min, max }
    }

    /// Whether `price` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.min <= price && price <= self.max
    }

    /// Whether this is the untouched default range.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Price::ZERO,
            max: Price::from_dollars(DEFAULT_MAX_PRICE),
        }
    }
}

/// Sort order of the store listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Descending id, used as a proxy for recency.
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    /// Case-insensitive name order.
    Name,
}

impl SortKey {
    /// All sort keys in menu order.
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceLow, Self::PriceHigh, Self::Name];

    /// Parse a sort token. Unknown tokens fall back to [`SortKey::Newest`].
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "name" => Self::Name,
            _ => Self::Newest,
        }
    }

    /// The query-string token for this key.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Name => "name",
        }
    }

    /// Human-readable menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Name => "Name",
        }
    }

    /// Compare two products under this key.
    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Newest => b.id.cmp(&a.id),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Name => case_folded_cmp(&a.name, &b.name),
        }
    }
}

/// Case-folding name comparison.
///
/// Only case is folded: letters compare case-insensitively first, and names
/// that differ only by case put the lowercase form first. Accents are not
/// folded, so `Écran` sorts after every ASCII name.
fn case_folded_cmp(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    folded(a).cmp(&folded(b)).then_with(|| b.cmp(a))
}

/// A filterable product attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Capacity,
    Color,
    Model,
}

impl Facet {
    /// Query-string key for this facet.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Color => "color",
            Self::Model => "model",
        }
    }

    /// Parse a query-string key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "capacity" => Some(Self::Capacity),
            "color" => Some(Self::Color),
            "model" => Some(Self::Model),
            _ => None,
        }
    }
}

/// The visitor's current facet and price selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub capacities: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub price_range: PriceRange,
}

impl FilterSelection {
    /// Selected values of one facet.
    #[must_use]
    pub const fn selected(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Capacity => &self.capacities,
            Facet::Color => &self.colors,
            Facet::Model => &self.models,
        }
    }

    fn selected_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Capacity => &mut self.capacities,
            Facet::Color => &mut self.colors,
            Facet::Model => &mut self.models,
        }
    }

    /// Add a facet value to the selection.
    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        self.selected_mut(facet).insert(value.into());
    }

    /// Add `value` when absent, remove it when present.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selected = self.selected_mut(facet);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Copy of this selection with `value` toggled.
    #[must_use]
    pub fn toggled(&self, facet: Facet, value: &str) -> Self {
        let mut next = self.clone();
        next.toggle(facet, value);
        next
    }

    /// Whether `value` is selected for `facet`.
    #[must_use]
    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.selected(facet).contains(value)
    }

    /// Whether any capacity, color or model is selected.
    #[must_use]
    pub fn has_facets(&self) -> bool {
        !(self.capacities.is_empty() && self.colors.is_empty() && self.models.is_empty())
    }

    /// Reset every facet and the price range.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `product` passes every facet and the price range.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        intersects(&self.capacities, &product.capacity)
            && intersects(&self.colors, &product.colors)
            && (self.models.is_empty() || self.models.contains(&product.name))
            && self.price_range.contains(product.price)
    }

    /// Query-string pairs describing this selection (facets only when set,
    /// price bounds only when they differ from the default).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for facet in [Facet::Capacity, Facet::Color, Facet::Model] {
            for value in self.selected(facet) {
                pairs.push((facet.key(), value.clone()));
            }
        }
        let defaults = PriceRange::default();
        if self.price_range.min != defaults.min {
            pairs.push(("min_price", self.price_range.min.amount().to_string()));
        }
        if self.price_range.max != defaults.max {
            pairs.push(("max_price", self.price_range.max.amount().to_string()));
        }
        pairs
    }
}

/// An empty selection passes; otherwise at least one value must be shared.
fn intersects(selected: &BTreeSet<String>, values: &[String]) -> bool {
    selected.is_empty() || values.iter().any(|v| selected.contains(v))
}

/// Facet values offered for a category, each sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    pub capacities: Vec<String>,
    pub colors: Vec<String>,
    pub models: Vec<String>,
}

impl FacetOptions {
    /// Collect options from the category-scoped products.
    ///
    /// Options are never taken from the full catalog, so a value that does
    /// not occur in the current category is never offered.
    #[must_use]
    pub fn from_products(products: &[&Product]) -> Self {
        let capacities: BTreeSet<&str> = products
            .iter()
            .flat_map(|p| p.capacity.iter().map(String::as_str))
            .collect();
        let colors: BTreeSet<&str> = products
            .iter()
            .flat_map(|p| p.colors.iter().map(String::as_str))
            .collect();
        let models: BTreeSet<&str> = products.iter().map(|p| p.name.as_str()).collect();

        Self {
            capacities: capacities.into_iter().map(String::from).collect(),
            colors: colors.into_iter().map(String::from).collect(),
            models: models.into_iter().map(String::from).collect(),
        }
    }

    /// Options of one facet.
    #[must_use]
    pub fn options(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Capacity => &self.capacities,
            Facet::Color => &self.colors,
            Facet::Model => &self.models,
        }
    }
}

/// Result of one run of the pipeline.
#[derive(Debug, Clone)]
pub struct Listing<'a> {
    /// Facet options for the selected category.
    pub facets: FacetOptions,
    /// Products after category, facet and price filtering, in sort order.
    pub products: Vec<&'a Product>,
}

impl<'a> Listing<'a> {
    /// Run the full pipeline over `catalog`.
    #[must_use]
    pub fn derive(
        catalog: &'a [Product],
        category: &Category,
        selection: &FilterSelection,
        sort: SortKey,
    ) -> Self {
        let in_category = category.select(catalog);
        let facets = FacetOptions::from_products(&in_category);

        let mut products: Vec<&Product> = in_category
            .into_iter()
            .filter(|p| selection.matches(p))
            .collect();
        products.sort_by(|a, b| sort.compare(a, b));

        Self { facets, products }
    }

    /// Number of products shown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether no product survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
