//! HTTP API flow through the router (no socket)

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use ledger_server::services::{LogPrinter, PrintError, ReceiptPrinter, build_app};
use ledger_server::{Config, LedgerStorage, ServerState};
use parking_lot::Mutex;
use serde_json::{Value, json};
use shared::models::ClosedOrderProjection;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (ServerState, Router) {
    let storage = LedgerStorage::open_in_memory().unwrap();
    let state = ServerState::from_storage(
        Config::with_overrides("./unused", 0),
        storage,
        Arc::new(LogPrinter),
    );
    (state.clone(), build_app(state))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-operator", "bea")
        .header("x-role", "Bartender")
        .header("x-session-started-at", "0");
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_beer(app: &Router, stock: i64) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/products",
        Some(json!({ "name": "Red Horse", "price": "50", "category": "Beer", "current_stock": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, app) = app();
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn tab_lifecycle_over_http() {
    let (state, app) = app();
    let product_id = create_beer(&app, 10).await;

    let (status, body) = call(&app, "GET", "/api/tables/T1/order", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, body) = call(&app, "POST", "/api/tables/T1/order/ensure", None).await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["opened_by"], "bea");

    let (status, _) = call(&app, "POST", "/api/tables/T1/order", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/items"),
        Some(json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total"], "150");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/items"),
        Some(json!({ "product_id": product_id, "quantity": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "InsufficientStock");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/items/void"),
        Some(json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], "100");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/checkout"),
        Some(json!({ "tendered": "200" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["change"], "100");
    assert_eq!(body["data"]["cashier"], "bea");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/checkout"),
        Some(json!({ "tendered": "200" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "Conflict");

    let (status, body) = call(&app, "GET", "/api/sales/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["total"], "100");

    let (status, body) = call(&app, "GET", &format!("/api/products/{product_id}/audit"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["consistent"], true);
    assert_eq!(body["data"]["replayed_stock"], 8);

    assert_eq!(state.inventory.get_product(&product_id).unwrap().current_stock, 8);
}

#[tokio::test]
async fn missing_operator_is_rejected() {
    let (_, app) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/tables/T1/order")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let (_, app) = app();
    let (status, body) = call(&app, "GET", "/api/orders/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "NotFound");
}

#[tokio::test]
async fn inventory_ledger_lists_newest_first() {
    let (_, app) = app();
    let product_id = create_beer(&app, 4).await;
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/products/{product_id}/restock"),
        Some(json!({ "quantity": 6, "note": "Friday delivery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "GET", "/api/inventory/ledger", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "RESTOCK");
    assert_eq!(entries[0]["remaining_stock"], 10);
    assert_eq!(entries[1]["kind"], "INITIAL_SETUP");
}

#[tokio::test]
async fn floor_reflects_open_tables() {
    let (state, app) = app();
    let tasks = state.start_background_tasks();

    let (status, _) = call(&app, "POST", "/api/tables/T9/reservation", None).await;
    assert_eq!(status, StatusCode::OK);

    let mut tables = Vec::new();
    for _ in 0..100 {
        let (_, body) = call(&app, "GET", "/api/floor", None).await;
        tables = body["data"].as_array().cloned().unwrap_or_default();
        if !tables.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["table_identifier"], "T9");
    assert_eq!(tables[0]["is_reserved"], true);

    tasks.shutdown().await;
}

#[derive(Default)]
struct SlowPrinter {
    printed: Mutex<Vec<String>>,
}

impl ReceiptPrinter for SlowPrinter {
    fn print(&self, receipt: &ClosedOrderProjection) -> Result<(), PrintError> {
        std::thread::sleep(std::time::Duration::from_millis(600));
        self.printed.lock().push(receipt.order_id.clone());
        Ok(())
    }
}

#[tokio::test]
async fn slow_printer_does_not_fail_checkout() {
    let mut config = Config::with_overrides("./unused", 0);
    config.request_timeout_ms = 200;
    let printer = Arc::new(SlowPrinter::default());
    let state = ServerState::from_storage(
        config,
        LedgerStorage::open_in_memory().unwrap(),
        printer.clone(),
    );
    let tasks = state.start_background_tasks();
    let app = build_app(state);

    let (_, body) = call(&app, "POST", "/api/tables/T2/order/ensure", None).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/checkout"),
        Some(json!({ "tendered": "0" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["order_id"], order_id.as_str());

    for _ in 0..200 {
        if !printer.printed.lock().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(printer.printed.lock().as_slice(), &[order_id]);

    tasks.shutdown().await;
}

#[tokio::test]
async fn oversized_restock_is_rejected() {
    let (_, app) = app();
    let product_id = create_beer(&app, 5).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/products/{product_id}/restock"),
        Some(json!({ "quantity": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["kind"], "InvalidInput");

    let (_, body) = call(&app, "GET", &format!("/api/products/{product_id}"), None).await;
    assert_eq!(body["data"]["current_stock"], 5);
}
