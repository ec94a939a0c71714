//! Integration tests for the session-backed cart.

#![allow(clippy::unwrap_used)]

use orchard_integration_tests::{TestServer, new_client};
use reqwest::Client;
use tokio::task::JoinSet;

/// POST `form` to `path` the way HTMX does.
async fn post(server: &TestServer, client: &Client, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    client
        .post(server.url(path))
        .header("HX-Request", "true")
        .form(form)
        .send()
        .await
        .unwrap()
}

async fn count(server: &TestServer, client: &Client) -> String {
    client
        .get(server.url("/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
        .trim()
        .to_string()
}

#[tokio::test]
async fn test_empty_cart() {
    let server = TestServer::start().await;
    assert_eq!(count(&server, &server.client).await, "Cart(0)");

    let panel = server.get_text("/cart").await;
    assert!(panel.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_merges_quantities() {
    let server = TestServer::start().await;
    let client = &server.client;

    let response = post(&server, client, "/cart/add", &[("product_id", "5")]).await;
    assert!(response.status().is_success());
    assert_eq!(response.headers().get("hx-trigger").unwrap(), "cart-updated");

    let body = post(&server, client, "/cart/add", &[("product_id", "5"), ("quantity", "2")])
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("AirPods Max"));
    assert!(body.contains("<span>3</span>"));
    assert!(body.contains("$1647"));
    assert_eq!(count(&server, client).await, "Cart(1)");
}

#[tokio::test]
async fn test_count_is_distinct_lines() {
    let server = TestServer::start().await;
    let client = &server.client;

    post(&server, client, "/cart/add", &[("product_id", "2"), ("quantity", "4")]).await;
    post(&server, client, "/cart/add", &[("product_id", "4")]).await;

    assert_eq!(count(&server, client).await, "Cart(2)");
}

#[tokio::test]
async fn test_decrease_stops_at_one_and_remove_deletes() {
    let server = TestServer::start().await;
    let client = &server.client;

    post(&server, client, "/cart/add", &[("product_id", "2")]).await;

    let body = post(&server, client, "/cart/increase", &[("id", "2")])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("<span>2</span>"));

    for _ in 0..3 {
        post(&server, client, "/cart/decrease", &[("id", "2")]).await;
    }
    let panel = server.get_text("/cart").await;
    assert!(panel.contains("<span>1</span>"));
    assert!(panel.contains("iPhone 16"));

    let body = post(&server, client, "/cart/remove", &[("id", "2")])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Your cart is empty"));

    // Operations on a removed line are no-ops.
    let response = post(&server, client, "/cart/increase", &[("id", "2")]).await;
    assert!(response.status().is_success());
    assert_eq!(count(&server, client).await, "Cart(0)");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let server = TestServer::start().await;
    let response = post(&server, &server.client, "/cart/add", &[("product_id", "999")]).await;

    assert_eq!(response.status(), 404);
    assert_eq!(count(&server, &server.client).await, "Cart(0)");
}

#[tokio::test]
async fn test_malformed_form_is_rejected() {
    let server = TestServer::start().await;
    let response = post(&server, &server.client, "/cart/add", &[("product_id", "abc")]).await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let server = TestServer::start().await;
    post(&server, &server.client, "/cart/add", &[("product_id", "1")]).await;

    let other = new_client();
    assert_eq!(count(&server, &other).await, "Cart(0)");
    assert_eq!(count(&server, &server.client).await, "Cart(1)");
}

#[tokio::test]
async fn test_concurrent_increases_all_apply() {
    let server = TestServer::start().await;
    let client = &server.client;
    post(&server, client, "/cart/add", &[("product_id", "2")]).await;

    let mut requests = JoinSet::new();
    for _ in 0..40 {
        let client = client.clone();
        let url = server.url("/cart/increase");
        requests.spawn(async move {
            client
                .post(url)
                .header("HX-Request", "true")
                .form(&[("id", "2")])
                .send()
                .await
                .unwrap()
                .status()
        });
    }
    while let Some(status) = requests.join_next().await {
        assert!(status.unwrap().is_success());
    }

    let panel = server.get_text("/cart").await;
    assert!(panel.contains("<span>41</span>"), "panel: {panel}");
}

#[tokio::test]
async fn test_plain_form_add_redirects_back() {
    let server = TestServer::start().await;
    let referer = server.url("/store/iphone?sort=name");

    let response = server
        .client
        .post(server.url("/cart/add"))
        .header("Referer", &referer)
        .form(&[("product_id", "3")])
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.url().as_str(), referer);
    let body = response.text().await.unwrap();
    assert!(body.contains("<html"));
    assert_eq!(count(&server, &server.client).await, "Cart(1)");
}
