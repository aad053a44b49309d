//! Router tests: the full storefront app against a mocked backend and a
//! static product list.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrina_core::catalog::Product;
use vitrina_storefront::config::{BackendConfig, StorefrontConfig};
use vitrina_storefront::state::{AppState, ProductSource};

fn tenant_row() -> Value {
    json!({
        "id": "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1",
        "slug": "herramientas-sur",
        "name": "Herramientas Sur",
        "owner_id": "0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33",
        "status": "active",
        "business": { "whatsapp": "+54 9 11 5555-0000" },
        "payment": { "mercadopago_enabled": true, "mercadopago_link": "https://mpago.la/abc" },
        "created_at": "2025-01-10T12:00:00Z",
        "updated_at": "2025-01-10T12:00:00Z"
    })
}

fn products() -> Vec<Product> {
    serde_json::from_value(json!([
        {
            "code": "MK-1", "name": "Taladro Makita HP1640", "condition": "Nuevo",
            "original_price": 120000, "price": 90000, "stock": 3
        },
        {
            "code": "BS-1", "name": "Caladora Bosch GST75E", "condition": "Nuevo",
            "original_price": 150000, "price": 150000, "stock": 2
        },
        {
            "code": "MK-2", "name": "Amoladora Makita GA4530", "condition": "Usado - Buen estado",
            "original_price": 60000, "price": 60000, "stock": 0
        }
    ]))
    .unwrap()
}

struct TestApp {
    // Held so the mock backend outlives the router.
    _server: MockServer,
    router: Router,
}

impl TestApp {
    async fn with_tenant(tenant: Value) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tenants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([tenant])))
            .mount(&server)
            .await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:5173".to_string(),
            tenant_slug: "herramientas-sur".to_string(),
            catalog_path: None,
            page_size: 12,
            rate_limit: false,
            backend: BackendConfig {
                url: Url::parse(&server.uri()).unwrap(),
                anon_key: SecretString::from("anon-test-key"),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state =
            AppState::with_source(config, ProductSource::File(Arc::new(products()))).unwrap();

        Self {
            _server: server,
            router: vitrina_storefront::app(state),
        }
    }

    async fn new() -> Self {
        Self::with_tenant(tenant_row()).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, set_cookie, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, json) = self.send("GET", uri, None, None).await;
        (status, json)
    }
}

fn codes(page: &Value) -> Vec<&str> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["code"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_store_info() {
    let app = TestApp::new().await;
    let (status, store) = app.get("/api/store").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store["name"], "Herramientas Sur");
    assert_eq!(store["payment"]["mercadopago"], true);
    assert_eq!(store["payment"]["transfer"], false);
}

#[tokio::test]
async fn test_inactive_store_is_hidden() {
    let mut tenant = tenant_row();
    tenant["status"] = json!("suspended");
    let app = TestApp::with_tenant(tenant).await;

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("herramientas-sur"));
}

#[tokio::test]
async fn test_listing_default_order() {
    let app = TestApp::new().await;
    let (status, page) = app.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(codes(&page), ["MK-1", "BS-1", "MK-2"]);
    assert_eq!(page["total"], 3);
    assert_eq!(page["items"][0]["discount_percent"], 25);
    assert_eq!(page["items"][0]["brand"], "makita");
    assert_eq!(page["items"][2]["condition_tag"], "good-used");
}

#[tokio::test]
async fn test_listing_filters_and_sorts() {
    let app = TestApp::new().await;

    let (_, page) = app.get("/api/products?discount=true").await;
    assert_eq!(codes(&page), ["MK-1"]);

    let (_, page) = app.get("/api/products?sort=price-asc").await;
    assert_eq!(codes(&page), ["MK-2", "MK-1", "BS-1"]);

    let (_, page) = app.get("/api/products?q=makita").await;
    assert_eq!(codes(&page), ["MK-1", "MK-2"]);

    let (_, page) = app.get("/api/products?in_stock=true&brand=bosch").await;
    assert_eq!(codes(&page), ["BS-1"]);

    let (_, page) = app.get("/api/products?min_price=60000&max_price=90000").await;
    assert_eq!(codes(&page), ["MK-1", "MK-2"]);
}

#[tokio::test]
async fn test_listing_page_is_clamped() {
    let app = TestApp::new().await;
    let (status, page) = app.get("/api/products?page_size=2&page=9").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(codes(&page), ["MK-2"]);
}

#[tokio::test]
async fn test_listing_rejects_bad_sort() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/products?sort=cheapest").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_product_detail() {
    let app = TestApp::new().await;

    let (status, product) = app.get("/api/products/BS-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Caladora Bosch GST75E");

    let (status, _) = app.get("/api/products/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_facets() {
    let app = TestApp::new().await;
    let (status, facets) = app.get("/api/facets?q=makita").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(facets["total"], 2);
    assert_eq!(facets["in_stock"], 1);
    assert_eq!(facets["brands"], json!([{ "value": "makita", "count": 2 }]));
}

#[tokio::test]
async fn test_cart_flow() {
    let app = TestApp::new().await;

    let (status, cookie, body) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "MK-1" })), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);
    let cookie = cookie.expect("session cookie");

    let (_, _, body) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "MK-1" })), Some(&cookie))
        .await;
    assert_eq!(body["added"], false);
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);

    let (_, _, cart) = app
        .send(
            "POST",
            "/api/cart/update",
            Some(json!({ "code": "MK-1", "quantity": 3 })),
            Some(&cookie),
        )
        .await;
    assert_eq!(cart["totals"]["total_items"], 3);
    assert_eq!(cart["totals"]["total_price"], "270000");
    assert_eq!(cart["totals"]["total_savings"], "90000");

    let (_, _, body) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "BS-1" })), Some(&cookie))
        .await;
    assert_eq!(body["cart"]["totals"]["distinct_items"], 2);

    let (_, _, cart) = app
        .send("POST", "/api/cart/remove", Some(json!({ "code": "MK-1" })), Some(&cookie))
        .await;
    assert_eq!(cart["totals"]["distinct_items"], 1);

    let (_, _, cart) = app.send("POST", "/api/cart/clear", None, Some(&cookie)).await;
    assert_eq!(cart["items"], json!([]));

    let (_, _, cart) = app.send("GET", "/api/cart", None, Some(&cookie)).await;
    assert_eq!(cart["totals"]["total_items"], 0);
}

#[tokio::test]
async fn test_cart_rejects_huge_quantities() {
    let app = TestApp::new().await;

    let (_, cookie, _) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "MK-1" })), None)
        .await;
    let cookie = cookie.expect("session cookie");
    app.send("POST", "/api/cart/add", Some(json!({ "code": "BS-1" })), Some(&cookie))
        .await;

    for (code, quantity) in [("MK-1", json!(i64::MAX)), ("BS-1", json!(4_294_967_295_u64))] {
        let (status, _, body) = app
            .send(
                "POST",
                "/api/cart/update",
                Some(json!({ "code": code, "quantity": quantity })),
                Some(&cookie),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at most"));
    }

    // The stored cart is untouched and still renders.
    let (status, _, cart) = app.send("GET", "/api/cart", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["total_items"], 2);
}

#[tokio::test]
async fn test_cart_rejects_unknown_and_sold_out() {
    let app = TestApp::new().await;

    let (status, _, _) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "NOPE" })), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "MK-2" })), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("out of stock"));
}

#[tokio::test]
async fn test_checkout_builds_whatsapp_link_and_clears_cart() {
    let app = TestApp::new().await;
    let customer = json!({
        "name": "Ana Pérez",
        "phone": "11 5555-1234",
        "payment_method": "mercadopago"
    });

    let (status, _, _) = app
        .send("POST", "/api/checkout", Some(customer.clone()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, cookie, _) = app
        .send("POST", "/api/cart/add", Some(json!({ "code": "MK-1" })), None)
        .await;
    let cookie = cookie.unwrap();

    let (status, _, plan) = app
        .send("POST", "/api/checkout", Some(customer), Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        plan["whatsapp_url"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/5491155550000?text=")
    );
    assert_eq!(plan["payment_url"], "https://mpago.la/abc");
    assert!(plan["message"].as_str().unwrap().contains("1 x Taladro Makita HP1640 (MK-1)"));

    let (_, _, cart) = app.send("GET", "/api/cart", None, Some(&cookie)).await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
async fn test_checkout_disabled_by_store() {
    let mut tenant = tenant_row();
    tenant["features"] = json!({ "whatsapp_checkout": false });
    let app = TestApp::with_tenant(tenant).await;

    let customer = json!({ "name": "Ana", "phone": "11 5555-1234" });
    let (status, _, _) = app.send("POST", "/api/checkout", Some(customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
