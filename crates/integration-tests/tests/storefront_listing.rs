//! Integration tests for the store listing page.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use orchard_core::Product;
use orchard_integration_tests::{FIXTURE, TestServer};

/// Product names in page order.
fn names_in_order<'a>(body: &str, names: &[&'a str]) -> Vec<&'a str> {
    let mut found: Vec<(usize, &str)> = names
        .iter()
        .filter_map(|name| {
            body.find(&format!("<h2>{name}</h2>"))
                .map(|index| (index, *name))
        })
        .collect();
    found.sort_unstable();
    found.into_iter().map(|(_, name)| name).collect()
}

#[tokio::test]
async fn test_store_redirects_to_all() {
    let server = TestServer::start().await;
    let response = server.client.get(server.url("/store")).send().await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.url().path(), "/store/all");
}

#[tokio::test]
async fn test_all_category_lists_every_product_under_default_price_cap() {
    let server = TestServer::start().await;
    let body = server.get_text("/store/all").await;

    let catalog = Product::parse_list(FIXTURE).unwrap();
    assert_eq!(catalog.len(), 6);

    // MacBook Pro 16 costs more than the default $2000 cap.
    assert!(body.contains("5 products"));
    assert!(!body.contains("<h2>MacBook Pro 16</h2>"));
}

#[tokio::test]
async fn test_category_filter_and_default_sort() {
    let server = TestServer::start().await;
    let body = server.get_text("/store/iphone").await;

    assert!(body.contains("3 products"));
    assert_eq!(
        names_in_order(&body, &["iPhone 16", "iPhone 16 Pro", "iPhone 16e", "MacBook Air"]),
        vec!["iPhone 16e", "iPhone 16 Pro", "iPhone 16"]
    );
}

#[tokio::test]
async fn test_price_sorts() {
    let server = TestServer::start().await;
    let names = ["iPhone 16", "iPhone 16 Pro", "iPhone 16e"];

    let low = server.get_text("/store/iphone?sort=price-low").await;
    assert_eq!(
        names_in_order(&low, &names),
        vec!["iPhone 16e", "iPhone 16", "iPhone 16 Pro"]
    );

    let high = server.get_text("/store/iphone?sort=price-high").await;
    assert_eq!(
        names_in_order(&high, &names),
        vec!["iPhone 16 Pro", "iPhone 16", "iPhone 16e"]
    );
}

#[tokio::test]
async fn test_facets_combine() {
    let server = TestServer::start().await;

    let body = server.get_text("/store/iphone?color=Black").await;
    assert!(body.contains("2 products"));

    let body = server
        .get_text("/store/iphone?color=Black&capacity=256GB")
        .await;
    assert!(body.contains("1 product<"));
    assert!(body.contains("<h2>iPhone 16</h2>"));

    let body = server
        .get_text("/store/iphone?capacity=1TB&capacity=128GB")
        .await;
    assert!(body.contains("3 products"));
    assert!(body.contains("Clear all filters"));
}

#[tokio::test]
async fn test_price_range() {
    let server = TestServer::start().await;
    let body = server
        .get_text("/store/all?min_price=599&max_price=999")
        .await;

    assert!(body.contains("3 products"));
    assert!(!body.contains("<h2>AirPods Max</h2>"));
    assert!(!body.contains("<h2>MacBook Air</h2>"));

    let body = server.get_text("/store/macbook?max_price=5000").await;
    assert!(body.contains("<h2>MacBook Pro 16</h2>"));
}

#[tokio::test]
async fn test_facet_options_are_scoped_to_category() {
    let server = TestServer::start().await;
    let body = server.get_text("/store/airpods").await;

    assert!(body.contains("Midnight"));
    assert!(!body.contains("Desert Titanium"));
    // AirPods have no capacity options.
    assert!(!body.contains("<legend>Capacity</legend>"));
}

#[tokio::test]
async fn test_category_token_is_case_sensitive() {
    let server = TestServer::start().await;
    let body = server.get_text("/store/iPhone").await;

    assert!(body.contains("No products found"));
}

#[tokio::test]
async fn test_list_view_toggle() {
    let server = TestServer::start().await;
    let body = server.get_text("/store/all?view=list").await;
    assert!(body.contains("product-grid list-view"));
}

#[tokio::test]
async fn test_first_visit_shows_loading_then_listing() {
    let server = TestServer::start_with(FIXTURE, false).await;

    let mut body = server.get_text("/store/all").await;
    for _ in 0..50 {
        if !body.contains("Loading products") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        body = server.get_text("/store/all").await;
    }

    assert!(body.contains("5 products"));
}

#[tokio::test]
async fn test_malformed_catalog_degrades_to_empty_store() {
    let server = TestServer::start_with("{\"not\": \"an array\"}", true).await;
    let body = server.get_text("/store/all").await;

    assert!(body.contains("0 products"));
    assert!(body.contains("No products found"));
}
