//! Catalog inspection commands.
//!
//! These run the same pipeline as the store page over a fixture file, so a
//! catalog can be checked without starting the storefront.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_CATALOG_PATH` - Default fixture path (shared with the storefront)

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use orchard_core::catalog::validate as validate_catalog;
use orchard_core::filter::Facet;
use orchard_core::{Category, FacetOptions, FilterSelection, Listing, Price, Product, SortKey};

/// Errors from catalog commands.
#[derive(Debug, thiserror::Error)]
pub enum CatalogCommandError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog has {0} problem(s)")]
    Invalid(usize),
}

/// Filter flags for `catalog list`.
#[derive(Debug, Default)]
pub struct ListFilters {
    pub category: String,
    pub sort: String,
    pub capacities: Vec<String>,
    pub colors: Vec<String>,
    pub models: Vec<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl ListFilters {
    fn selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::default();
        for (facet, values) in [
            (Facet::Capacity, &self.capacities),
            (Facet::Color, &self.colors),
            (Facet::Model, &self.models),
        ] {
            for value in values {
                selection.select(facet, value.clone());
            }
        }
        if let Some(min) = self.min_price {
            selection.price_range.min = Price::from_dollars(min);
        }
        if let Some(max) = self.max_price {
            selection.price_range.max = Price::from_dollars(max);
        }
        selection
    }
}

fn load(path: &Path) -> Result<Vec<Product>, CatalogCommandError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogCommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let products = Product::parse_list(&json).map_err(|source| CatalogCommandError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), count = products.len(), "Catalog loaded");
    Ok(products)
}

/// List the products a store page would show for `filters`.
///
/// # Errors
///
/// Returns `CatalogCommandError` if the fixture cannot be read or parsed.
pub fn list(path: &Path, filters: &ListFilters) -> Result<(), CatalogCommandError> {
    let catalog = load(path)?;
    let listing = Listing::derive(
        &catalog,
        &Category::from_token(&filters.category),
        &filters.selection(),
        SortKey::from_token(&filters.sort),
    );

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render_listing(&listing));
    }
    Ok(())
}

/// Print the facet options offered for `category`.
///
/// # Errors
///
/// Returns `CatalogCommandError` if the fixture cannot be read or parsed.
pub fn facets(path: &Path, category: &str) -> Result<(), CatalogCommandError> {
    let catalog = load(path)?;
    let in_category = Category::from_token(category).select(&catalog);
    let options = FacetOptions::from_products(&in_category);

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render_facets(&options));
    }
    Ok(())
}

/// Report data problems in the fixture.
///
/// # Errors
///
/// Returns `CatalogCommandError::Invalid` if any problem is found.
pub fn validate(path: &Path) -> Result<(), CatalogCommandError> {
    let catalog = load(path)?;
    let issues = validate_catalog(&catalog);

    for issue in &issues {
        tracing::warn!("{issue}");
    }
    if !issues.is_empty() {
        return Err(CatalogCommandError::Invalid(issues.len()));
    }

    tracing::info!(count = catalog.len(), "Catalog is valid");
    Ok(())
}

fn render_listing(listing: &Listing<'_>) -> String {
    let mut out = String::new();
    for product in &listing.products {
        let _ = writeln!(
            out,
            "{:>4}  {:<10}  {:<40}  {:>8}",
            product.id, product.category, product.name, product.price
        );
    }
    let _ = writeln!(out, "{} product(s)", listing.len());
    out
}

fn render_facets(options: &FacetOptions) -> String {
    let mut out = String::new();
    for (title, facet) in [
        ("Models", Facet::Model),
        ("Capacity", Facet::Capacity),
        ("Color", Facet::Color),
    ] {
        let values = options.options(facet);
        if values.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title}: {}", values.join(", "));
    }
    out
}
