//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use stockline_core::{CustomerDraft, CustomerTier, LineItemRequest, PlaceOrderRequest, ProductDraft};
use stockline_db::{Database, DbConfig};
use stockline_order_service::EngineSettings;
use tempfile::TempDir;

pub const RETAILER: &str = "Corner Hardware";
pub const WHOLESALER: &str = "Harbour Wholesale";

/// A file-backed database with a pool wide enough for real concurrency.
/// Keep the `TempDir` alive for the test's duration.
pub async fn file_db() -> (TempDir, Database) {
    file_db_with_busy_timeout(Duration::from_secs(10)).await
}

/// Same as [`file_db`], with writers giving up on the lock after `busy`.
pub async fn file_db_with_busy_timeout(busy: Duration) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(
        DbConfig::new(dir.path().join("stockline.db"))
            .max_connections(8)
            .busy_timeout(busy),
    )
    .await
    .unwrap();

    seed(&db).await;
    (dir, db)
}

pub async fn seed(db: &Database) {
    for (name, tier) in [(RETAILER, CustomerTier::Retailer), (WHOLESALER, CustomerTier::Wholesaler)] {
        db.customers()
            .insert(&CustomerDraft {
                name: name.into(),
                address: "1 Test Street".into(),
                tier,
            })
            .await
            .unwrap();
    }

    for (name, quantity) in [("hex bolt", 20), ("wall anchor", 50), ("ball valve", 5)] {
        db.products()
            .insert(&ProductDraft {
                name: name.into(),
                category: "hardware".into(),
                wholesale_price_cents: 80,
                retail_price_cents: 100,
                distributor_price_cents: 90,
                quantity,
                last_restocked_at: None,
            })
            .await
            .unwrap();
    }
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        store_timeout: Duration::from_secs(20),
        max_attempts: 10,
        backoff: Duration::from_millis(5),
    }
}

pub fn order(customer: &str, lines: &[(&str, i64, f64)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        customer_name: customer.into(),
        lines: lines
            .iter()
            .map(|(name, quantity, discount_percent)| LineItemRequest {
                product_name: name.to_string(),
                quantity: *quantity,
                discount_percent: *discount_percent,
            })
            .collect(),
        submission_key: None,
    }
}

pub async fn stock(db: &Database, name: &str) -> i64 {
    db.products().get_by_name(name).await.unwrap().unwrap().quantity
}

pub async fn orders_made(db: &Database, name: &str) -> i64 {
    db.customers().get_by_name(name).await.unwrap().unwrap().orders_made
}
