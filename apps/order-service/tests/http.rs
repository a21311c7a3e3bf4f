//! HTTP surface: authentication, role gating and error mapping.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use stockline_db::{Database, DbConfig};
use stockline_order_service::{build_router, AppState, JwtManager, Role};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

async fn app() -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    common::seed(&db).await;

    let state = AppState::new(db.clone(), common::settings(), JwtManager::new(SECRET, 3600));
    (build_router(state), db)
}

fn token(role: Role) -> String {
    JwtManager::new(SECRET, 3600).issue_token("user-1", role).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, role: Option<Role>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(role)));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn placement(customer: &str, product: &str, quantity: i64) -> Value {
    json!({
        "customerName": customer,
        "lines": [{ "productName": product, "quantity": quantity, "discountPercent": 10 }]
    })
}

#[tokio::test]
async fn health_is_public() {
    let (app, _db) = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(body["migrations"]["applied"], body["migrations"]["total"]);
}

#[tokio::test]
async fn health_degrades_when_schema_is_behind() {
    let db = Database::new(DbConfig::in_memory().run_migrations(false)).await.unwrap();
    let app = build_router(AppState::new(db, common::settings(), JwtManager::new(SECRET, 3600)));

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], true);
    assert_eq!(body["migrations"]["applied"], 0);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let (app, _db) = app().await;

    let (status, body) = send(&app, Method::GET, "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let req = Request::builder()
        .uri("/orders")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_sales_may_place() {
    let (app, db) = app().await;
    let body = placement(common::RETAILER, "Hex Bolt", 3);

    for role in [Role::Admin, Role::Warehouse] {
        let (status, body) = send(&app, Method::POST, "/orders", Some(role), Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }
    assert_eq!(db.orders().count().await.unwrap(), 0);

    let (status, receipt) = send(&app, Method::POST, "/orders", Some(Role::Sales), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["orders"][0]["netCostCents"], 270);
    assert_eq!(receipt["orders"][0]["status"], "Placed");
}

#[tokio::test]
async fn only_warehouse_may_update_status() {
    let (app, _db) = app().await;

    let (_, receipt) = send(
        &app,
        Method::POST,
        "/orders",
        Some(Role::Sales),
        Some(placement(common::RETAILER, "hex bolt", 1)),
    )
    .await;
    let id = receipt["orders"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/orders/{id}/status");

    let (status, _) = send(&app, Method::PATCH, &uri, Some(Role::Sales), Some(json!({ "status": "Dispatched" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(Role::Warehouse), Some(json!({ "status": "Placed" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(Role::Warehouse), Some(json!({ "status": "Dispatched" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Dispatched");

    let (status, list) = send(&app, Method::GET, "/orders?status=Dispatched", Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn insufficient_stock_reports_available() {
    let (app, _db) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(Role::Sales),
        Some(placement(common::RETAILER, "ball valve", 9)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["details"]["available"], 5);
}

#[tokio::test]
async fn unknown_customer_is_not_found() {
    let (app, _db) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(Role::Sales),
        Some(placement("Nobody Ltd", "hex bolt", 1)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn keyed_retry_replays_with_ok() {
    let (app, _db) = app().await;
    let mut body = placement(common::WHOLESALER, "wall anchor", 4);
    body["submissionKey"] = json!("po-77");

    let (first, _) = send(&app, Method::POST, "/orders", Some(Role::Sales), Some(body.clone())).await;
    let (second, receipt) = send(&app, Method::POST, "/orders", Some(Role::Sales), Some(body)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(receipt["replayed"], true);

    let (status, found) = send(&app, Method::GET, "/submissions/po-77", Some(Role::Warehouse), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reused_key_with_different_lines_conflicts() {
    let (app, db) = app().await;
    let mut body = placement(common::WHOLESALER, "wall anchor", 4);
    body["submissionKey"] = json!("po-78");
    let (first, _) = send(&app, Method::POST, "/orders", Some(Role::Sales), Some(body.clone())).await;
    assert_eq!(first, StatusCode::CREATED);

    body["lines"][0]["quantity"] = json!(9);
    let (status, err) = send(&app, Method::POST, "/orders", Some(Role::Sales), Some(body)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "DUPLICATE");
    assert_eq!(common::stock(&db, "wall anchor").await, 46);
}

#[tokio::test]
async fn catalog_and_customer_writes_are_admin_only() {
    let (app, _db) = app().await;
    let product = json!({
        "name": "  Copper Wire ",
        "category": "Electrical",
        "wholesalePriceCents": 300,
        "retailPriceCents": 450,
        "distributorPriceCents": 380,
        "quantity": 12
    });

    let (status, _) = send(&app, Method::POST, "/products", Some(Role::Sales), Some(product.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(&app, Method::POST, "/products", Some(Role::Admin), Some(product.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "copper wire");

    let (status, body) = send(&app, Method::POST, "/products", Some(Role::Admin), Some(product)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");

    let (status, restocked) = send(
        &app,
        Method::POST,
        "/products/copper%20wire/restock",
        Some(Role::Admin),
        Some(json!({ "quantity": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restocked["quantity"], 40);

    let (status, _) = send(&app, Method::GET, "/products", Some(Role::Warehouse), None).await;
    assert_eq!(status, StatusCode::OK);

    let customer = json!({ "name": "Northern Distribution", "address": "Unit 7", "tier": "Distributer" });
    let (status, _) = send(&app, Method::POST, "/customers", Some(Role::Sales), Some(customer.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(&app, Method::POST, "/customers", Some(Role::Admin), Some(customer)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["tier"], "Distributor");
    assert_eq!(created["ordersMade"], 0);

    let (status, _) = send(&app, Method::GET, "/customers", Some(Role::Warehouse), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, "/customers", Some(Role::Sales), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_product_draft_is_rejected() {
    let (app, _db) = app().await;
    let product = json!({
        "name": "Spirit Level",
        "category": "tools",
        "wholesalePriceCents": 0,
        "retailPriceCents": 450,
        "distributorPriceCents": 380,
        "quantity": 3
    });

    let (status, body) = send(&app, Method::POST, "/products", Some(Role::Admin), Some(product)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_delete_leaves_stock() {
    let (app, db) = app().await;

    let (_, receipt) = send(
        &app,
        Method::POST,
        "/orders",
        Some(Role::Sales),
        Some(placement(common::RETAILER, "hex bolt", 2)),
    )
    .await;
    let uri = format!("/orders/{}", receipt["orders"][0]["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, Some(Role::Warehouse), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &uri, Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(common::stock(&db, "hex bolt").await, 18);
}
