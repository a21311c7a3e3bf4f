//! # Validation Module
//!
//! Input validation for catalog records, customer records and placement
//! submissions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (serde)                                         │
//! │  └── Type validation (deserialization)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Business rule validation, before any store round-trip              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (quantity >= 0)                                              │
//! │  └── UNIQUE (name)                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CustomerDraft, DiscountRate, LineItemRequest, ProductDraft};
use crate::MAX_LINES_PER_SUBMISSION;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use stockline_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Steel Bolts M8").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("productName", name, 200)
}

pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_text("category", category, 100)
}

pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_text("customerName", name, 200)
}

pub fn validate_address(address: &str) -> ValidationResult<()> {
    validate_text("address", address, 500)
}

/// Validates an optional client-supplied submission key.
///
/// ## Rules
/// - 1 to 128 characters after trimming
/// - Letters, digits, `-`, `_`, `:` and `.` only
pub fn validate_submission_key(key: &str) -> ValidationResult<()> {
    validate_text("submissionKey", key, 128)?;

    if !key
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "submissionKey".to_string(),
            reason: "must contain only letters, digits, '-', '_', ':' and '.'".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tier price in cents. Prices are strictly positive.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !Money::from_cents(cents).is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Converts a discount percentage into a [`DiscountRate`].
///
/// ## Rules
/// - Must be a finite number in [0, 100]
/// - Precision is two decimal places (basis points); finer values round
///
/// ## Example
/// ```rust
/// use stockline_core::validation::parse_discount_percent;
///
/// assert_eq!(parse_discount_percent(12.5).unwrap().bps(), 1250);
/// assert!(parse_discount_percent(100.01).is_err());
/// assert!(parse_discount_percent(f64::NAN).is_err());
/// ```
pub fn parse_discount_percent(pct: f64) -> ValidationResult<DiscountRate> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "discountPercent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(DiscountRate::from_bps((pct * 100.0).round() as u32))
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product draft. Call on the normalized draft.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_product_name(&draft.name)?;
    validate_category(&draft.category)?;
    validate_price_cents("wholesalePriceCents", draft.wholesale_price_cents)?;
    validate_price_cents("retailPriceCents", draft.retail_price_cents)?;
    validate_price_cents("distributorPriceCents", draft.distributor_price_cents)?;
    validate_stock_quantity(draft.quantity)?;
    Ok(())
}

pub fn validate_customer_draft(draft: &CustomerDraft) -> ValidationResult<()> {
    validate_customer_name(&draft.name)?;
    validate_address(&draft.address)?;
    Ok(())
}

// =============================================================================
// Placement Validators
// =============================================================================

/// A line item that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLine {
    /// Normalized product name.
    pub product_name: String,
    pub quantity: i64,
    pub discount: DiscountRate,
}

/// Validates every line of a submission before any store access.
///
/// ## Rules
/// - At least one line, at most [`MAX_LINES_PER_SUBMISSION`]
/// - Product name present
/// - `quantity >= 1`
/// - `discountPercent` in [0, 100]
///
/// Line failures are reported as [`CoreError::InvalidLineItem`] with the
/// zero-based line index.
pub fn validate_lines(lines: &[LineItemRequest]) -> CoreResult<Vec<ValidatedLine>> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        }
        .into());
    }

    if lines.len() > MAX_LINES_PER_SUBMISSION {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_LINES_PER_SUBMISSION as i64,
        }
        .into());
    }

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let invalid = |reason: String| CoreError::InvalidLineItem { line: idx, reason };

            validate_product_name(&line.product_name).map_err(|e| invalid(e.to_string()))?;

            if line.quantity < 1 {
                return Err(invalid(format!(
                    "quantity must be at least 1, got {}",
                    line.quantity
                )));
            }

            let discount =
                parse_discount_percent(line.discount_percent).map_err(|e| invalid(e.to_string()))?;

            Ok(ValidatedLine {
                product_name: crate::types::normalize_product_name(&line.product_name),
                quantity: line.quantity,
                discount,
            })
        })
        .collect()
}

/// Canonical text form of a submission's lines, stored with its key.
///
/// Two submissions carry the same fingerprint only when they list the same
/// products, quantities and discounts in the same order. Names are
/// length-prefixed so no name can forge a separator.
pub fn submission_fingerprint(lines: &[ValidatedLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{}:{}|{}|{}",
                line.product_name.len(),
                line.product_name,
                line.quantity,
                line.discount.bps()
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerTier;

    fn line(name: &str, quantity: i64, discount_percent: f64) -> LineItemRequest {
        LineItemRequest {
            product_name: name.to_string(),
            quantity,
            discount_percent,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Copper Wire 2mm").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents("retail", 1).is_ok());
        assert!(validate_price_cents("retail", 0).is_err());
        assert!(validate_price_cents("retail", -100).is_err());
    }

    #[test]
    fn test_validate_submission_key() {
        assert!(validate_submission_key("order-2026-10-19:agent7").is_ok());
        assert!(validate_submission_key("").is_err());
        assert!(validate_submission_key("has space").is_err());
        assert!(validate_submission_key(&"k".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_parse_discount_percent_bounds() {
        assert_eq!(parse_discount_percent(0.0).unwrap().bps(), 0);
        assert_eq!(parse_discount_percent(100.0).unwrap().bps(), 10_000);
        assert!(parse_discount_percent(-0.5).is_err());
        assert!(parse_discount_percent(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_lines_normalizes_names() {
        let validated = validate_lines(&[line("  Steel Bolts ", 3, 10.0)]).unwrap();
        assert_eq!(validated[0].product_name, "steel bolts");
        assert_eq!(validated[0].quantity, 3);
        assert_eq!(validated[0].discount, DiscountRate::from_percent(10));
    }

    #[test]
    fn test_validate_lines_reports_line_index() {
        let err = validate_lines(&[line("bolts", 1, 0.0), line("nuts", 0, 0.0)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLineItem { line: 1, .. }));

        let err = validate_lines(&[line("bolts", 2, 101.0)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLineItem { line: 0, .. }));
    }

    #[test]
    fn test_validate_lines_rejects_empty_and_oversized() {
        assert!(matches!(
            validate_lines(&[]),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let many: Vec<_> = (0..=MAX_LINES_PER_SUBMISSION)
            .map(|i| line(&format!("p{i}"), 1, 0.0))
            .collect();
        assert!(matches!(
            validate_lines(&many),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_validate_drafts() {
        let product = ProductDraft {
            name: "bolts".into(),
            category: "fasteners".into(),
            wholesale_price_cents: 8000,
            retail_price_cents: 10_000,
            distributor_price_cents: 9000,
            quantity: 0,
            last_restocked_at: None,
        };
        assert!(validate_product_draft(&product).is_ok());
        assert!(validate_product_draft(&ProductDraft {
            quantity: -1,
            ..product.clone()
        })
        .is_err());
        assert!(validate_product_draft(&ProductDraft {
            retail_price_cents: 0,
            ..product
        })
        .is_err());

        let customer = CustomerDraft {
            name: "Acme Hardware".into(),
            address: "12 Dock Road".into(),
            tier: CustomerTier::Retailer,
        };
        assert!(validate_customer_draft(&customer).is_ok());
        assert!(validate_customer_draft(&CustomerDraft {
            address: " ".into(),
            ..customer
        })
        .is_err());
    }

    #[test]
    fn test_fingerprint_tracks_line_content() {
        let lines = validate_lines(&[line("Bolts", 2, 10.0), line("nuts", 1, 0.0)]).unwrap();
        let same = validate_lines(&[line(" bolts ", 2, 10.0), line("NUTS", 1, 0.0)]).unwrap();
        assert_eq!(submission_fingerprint(&lines), submission_fingerprint(&same));
        assert_eq!(submission_fingerprint(&lines), "5:bolts|2|1000;4:nuts|1|0");

        let more = validate_lines(&[line("bolts", 3, 10.0), line("nuts", 1, 0.0)]).unwrap();
        let reordered = validate_lines(&[line("nuts", 1, 0.0), line("bolts", 2, 10.0)]).unwrap();
        let cheaper = validate_lines(&[line("bolts", 2, 15.0), line("nuts", 1, 0.0)]).unwrap();
        for other in [more, reordered, cheaper] {
            assert_ne!(submission_fingerprint(&lines), submission_fingerprint(&other));
        }
    }
}
