//! Catalog records and category selection.
//!
//! The catalog is static reference data: a JSON array of [`Product`] records
//! loaded once and never mutated. A [`Category`] is read from the store URL
//! path segment and used verbatim as the match key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductId};

/// Category token that bypasses category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Category tokens linked from the navigation bar, in display order.
pub const NAV_CATEGORIES: &[(&str, &str)] = &[
    ("Store", ALL_CATEGORIES),
    ("Macbook", "macbook"),
    ("iPhone", "iphone"),
    ("iPad", "ipad"),
    ("Airpods", "airpods"),
    ("iMac", "imac"),
];

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Category tag, compared case-sensitively against the URL token.
    pub category: String,
    pub name: String,
    pub chip: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub capacity: Vec<String>,
    pub ram: String,
    pub screen_size: String,
    pub price: Price,
    /// Opaque image reference (URL or static path).
    pub image: String,
}

impl Product {
    /// Parse a catalog fixture (a JSON array of products).
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document is not an array of
    /// well-formed product records.
    pub fn parse_list(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Category selection for the store listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// The reserved `all` token: every product passes.
    #[default]
    All,
    /// Exact, case-sensitive match on `Product::category`.
    Named(String),
}

impl Category {
    /// Build a category from a URL path token.
    ///
    /// No normalization is applied: `iPhone` and `iphone` are different
    /// categories.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(token.to_string())
        }
    }

    /// The URL token for this category.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }

    /// Whether `product` belongs to this category.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category == *name,
        }
    }

    /// Select the products of this category, preserving catalog order.
    #[must_use]
    pub fn select<'a>(&self, catalog: &'a [Product]) -> Vec<&'a Product> {
        catalog.iter().filter(|p| self.matches(p)).collect()
    }
}

/// A data problem found in a catalog fixture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("product {id} has non-positive price {price}")]
    NonPositivePrice { id: ProductId, price: Price },
}

/// Check a catalog for duplicate ids and non-positive prices.
///
/// Each duplicated id is reported once, at its second occurrence.
#[must_use]
pub fn validate(catalog: &[Product]) -> Vec<CatalogIssue> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut issues = Vec::new();

    for product in catalog {
        if !seen.insert(product.id) && reported.insert(product.id) {
            issues.push(CatalogIssue::DuplicateId(product.id));
        }
        if !product.price.is_positive() {
            issues.push(CatalogIssue::NonPositivePrice {
                id: product.id,
                price: product.price,
            });
        }
    }
    issues
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use super::*;

    /// Build a product with the fields the pipeline looks at.
    pub(crate) fn product(
        id: i64,
        category: &str,
        name: &str,
        price: i64,
        colors: &[&str],
        capacity: &[&str],
    ) -> Product {
        Product {
            id: ProductId::new(id),
            category: category.to_string(),
            name: name.to_string(),
            chip: "A18".to_string(),
            colors: colors.iter().map(ToString::to_string).collect(),
            capacity: capacity.iter().map(ToString::to_string).collect(),
            ram: "8GB".to_string(),
            screen_size: "6.1\"".to_string(),
            price: Price::from_dollars(price),
            image: format!("/static/images/{id}.png"),
        }
    }

    #[test]
    fn test_parse_list_reads_fixture_field_names() {
        let json = r#"[{
            "id": 1,
            "category": "iphone",
            "name": "iPhone 16",
            "chip": "A18",
            "colors": ["Black", "Pink"],
            "capacity": ["128GB", "256GB"],
            "ram": "8GB",
            "screenSize": "6.1\"",
            "price": 799,
            "image": "/static/images/iphone-16.png"
        }]"#;

        let products = Product::parse_list(json).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].screen_size, "6.1\"");
        assert_eq!(products[0].price, Price::from_dollars(799));
        assert_eq!(products[0].capacity, vec!["128GB", "256GB"]);
    }

    #[test]
    fn test_parse_list_rejects_non_array() {
        assert!(Product::parse_list(r#"{"id": 1}"#).is_err());
        assert!(Product::parse_list("not json").is_err());
    }

    #[test]
    fn test_category_all_token() {
        assert_eq!(Category::from_token("all"), Category::All);
        assert_eq!(Category::All.token(), "all");
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let iphone = product(1, "iphone", "iPhone 16", 799, &[], &[]);
        assert!(Category::from_token("iphone").matches(&iphone));
        assert!(!Category::from_token("iPhone").matches(&iphone));
        assert!(!Category::from_token("ALL").matches(&iphone));
    }

    #[test]
    fn test_select_by_category() {
        let catalog = vec![
            product(1, "iphone", "iPhone 16", 999, &[], &[]),
            product(2, "ipad", "iPad Air", 599, &[], &[]),
        ];

        let ipads = Category::from_token("ipad").select(&catalog);
        assert_eq!(ipads.len(), 1);
        assert_eq!(ipads[0].id, ProductId::new(2));

        assert_eq!(Category::All.select(&catalog).len(), 2);
    }

    #[test]
    fn test_validate_clean_catalog() {
        let catalog = vec![
            product(1, "iphone", "iPhone 16", 799, &[], &[]),
            product(2, "ipad", "iPad Air", 599, &[], &[]),
        ];
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_validate_reports_duplicates_once_and_bad_prices() {
        let catalog = vec![
            product(1, "iphone", "iPhone 16", 799, &[], &[]),
            product(1, "iphone", "iPhone 16 Plus", 899, &[], &[]),
            product(1, "iphone", "iPhone 16 Pro", 999, &[], &[]),
            product(2, "ipad", "iPad", 0, &[], &[]),
        ];

        let issues = validate(&catalog);
        assert_eq!(
            issues,
            vec![
                CatalogIssue::DuplicateId(ProductId::new(1)),
                CatalogIssue::NonPositivePrice {
                    id: ProductId::new(2),
                    price: Price::ZERO,
                },
            ]
        );
        assert_eq!(issues[0].to_string(), "duplicate product id 1");
    }
}
