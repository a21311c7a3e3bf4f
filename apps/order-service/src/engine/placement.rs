//! Order placement.
//!
//! Validates a submission, assigns its idempotency key, and hands it to the
//! store's placement transaction, retrying on write conflicts.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use stockline_core::validation::{validate_customer_name, validate_lines, validate_submission_key};
use stockline_core::{PlaceOrderRequest, PlacementReceipt};
use stockline_db::PlacementRepository;

use super::{timed, EngineError, EngineSettings};

/// Places multi-line submissions all-or-nothing.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    repo: PlacementRepository,
    settings: EngineSettings,
}

impl PlacementEngine {
    pub fn new(repo: PlacementRepository, settings: EngineSettings) -> Self {
        PlacementEngine { repo, settings }
    }

    /// Places every line of `request` or none of them.
    ///
    /// Without a `submission_key` a fresh one is generated, and the caller
    /// finds it on the receipt. Re-sending a committed key replays the
    /// stored lines instead of placing them twice.
    #[instrument(skip(self, request), fields(customer = %request.customer_name, lines = request.lines.len()))]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlacementReceipt, EngineError> {
        validate_customer_name(&request.customer_name)?;
        let lines = validate_lines(&request.lines)?;

        let submission_id = match request.submission_key {
            Some(key) => {
                let key = key.trim().to_string();
                validate_submission_key(&key)?;
                key
            }
            None => Uuid::new_v4().to_string(),
        };

        let mut attempt = 1;
        loop {
            let result = timed(
                &self.settings,
                "place_order",
                self.repo.place(&submission_id, &request.customer_name, &lines),
            )
            .await;

            match result {
                Ok(receipt) => return Ok(receipt),
                Err(e) if e.is_retryable() && attempt < self.settings.max_attempts => {
                    warn!(submission_id = %submission_id, attempt, error = %e, "Placement conflicted, retrying");
                    tokio::time::sleep(self.settings.backoff_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    info!(submission_id = %submission_id, attempts = attempt, "Placement conflicts exhausted");
                    return Err(EngineError::ConflictRetryable { attempts: attempt });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Looks up a committed submission by its key.
    pub async fn find_submission(&self, submission_key: &str) -> Result<PlacementReceipt, EngineError> {
        let receipt = timed(&self.settings, "find_submission", self.repo.find_submission(submission_key)).await?;
        receipt.ok_or_else(|| EngineError::Core(stockline_core::CoreError::OrderNotFound(submission_key.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockline_core::{CoreError, CustomerDraft, CustomerTier, LineItemRequest, ProductDraft};
    use stockline_db::{Database, DbConfig};

    async fn setup() -> (Database, PlacementEngine) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers()
            .insert(&CustomerDraft {
                name: "Corner Hardware".into(),
                address: "88 High Street".into(),
                tier: CustomerTier::Retailer,
            })
            .await
            .unwrap();

        db.products()
            .insert(&ProductDraft {
                name: "hex bolt".into(),
                category: "fasteners".into(),
                wholesale_price_cents: 80,
                retail_price_cents: 100,
                distributor_price_cents: 90,
                quantity: 10,
                last_restocked_at: None,
            })
            .await
            .unwrap();

        let engine = PlacementEngine::new(db.placement(), EngineSettings::default());
        (db, engine)
    }

    fn request(lines: Vec<(&str, i64, f64)>, key: Option<&str>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer_name: "Corner Hardware".into(),
            lines: lines
                .into_iter()
                .map(|(name, quantity, discount_percent)| LineItemRequest {
                    product_name: name.into(),
                    quantity,
                    discount_percent,
                })
                .collect(),
            submission_key: key.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_generates_key_when_absent() {
        let (_db, engine) = setup().await;

        let receipt = engine.place_order(request(vec![("Hex Bolt", 3, 10.0)], None)).await.unwrap();

        assert!(Uuid::parse_str(&receipt.submission_id).is_ok());
        assert_eq!(receipt.orders[0].net_cost_cents, 270);
        assert!(!receipt.replayed);
    }

    #[tokio::test]
    async fn test_same_key_replays() {
        let (db, engine) = setup().await;

        let first = engine
            .place_order(request(vec![("hex bolt", 2, 0.0)], Some("po-1001")))
            .await
            .unwrap();
        let second = engine
            .place_order(request(vec![("hex bolt", 2, 0.0)], Some("po-1001")))
            .await
            .unwrap();

        assert!(second.replayed);
        assert_eq!(first.orders[0].id, second.orders[0].id);
        assert_eq!(db.products().get_by_name("hex bolt").await.unwrap().unwrap().quantity, 8);

        let found = engine.find_submission("po-1001").await.unwrap();
        assert_eq!(found.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_input_before_touching_store() {
        let (db, engine) = setup().await;

        let err = engine.place_order(request(vec![], None)).await.unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));

        let err = engine
            .place_order(request(vec![("hex bolt", 1, 0.0), ("hex bolt", 0, 0.0)], None))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::InvalidLineItem { line: 1, .. })));

        let err = engine
            .place_order(request(vec![("hex bolt", 1, 0.0)], Some("bad key!")))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));

        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_submission() {
        let (_db, engine) = setup().await;
        let err = engine.find_submission("missing").await.unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::OrderNotFound(_))));
    }
}
