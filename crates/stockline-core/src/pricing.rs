//! # Pricing Resolver
//!
//! Maps a customer tier and a product to a unit price, and turns a validated
//! line into its gross and net cost.
//!
//! ## Line Cost Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product { wholesale: 80, retail: 100, distributor: 90 }                │
//! │  Customer tier: Retailer                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unit_price(Retailer, product) ──► 100.00                               │
//! │       │                                                                 │
//! │       ▼  × quantity 3                                                   │
//! │  gross ──► 300.00                                                       │
//! │       │                                                                 │
//! │       ▼  − 10% (rounded half up to the cent)                            │
//! │  net ──► 270.00                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CustomerTier, DiscountRate, Product};

/// Returns the unit price that applies to `tier` for `product`.
///
/// ## Example
/// ```rust,ignore
/// let unit = unit_price(CustomerTier::Retailer, &product);
/// assert_eq!(unit, product.retail_price());
/// ```
pub fn unit_price(tier: CustomerTier, product: &Product) -> Money {
    match tier {
        CustomerTier::Wholesaler => product.wholesale_price(),
        CustomerTier::Retailer => product.retail_price(),
        CustomerTier::Distributor => product.distributor_price(),
    }
}

/// Cost breakdown of one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCost {
    pub unit: Money,
    pub quantity: i64,
    pub gross: Money,
    pub discount: DiscountRate,
    pub net: Money,
}

impl LineCost {
    /// Computes gross and net for a line.
    ///
    /// `line` is the zero-based index used in the error if the gross
    /// overflows.
    ///
    /// ## Example
    /// ```rust
    /// use stockline_core::money::Money;
    /// use stockline_core::pricing::LineCost;
    /// use stockline_core::types::DiscountRate;
    ///
    /// let cost = LineCost::compute(0, Money::from_cents(10_000), 3, DiscountRate::from_percent(10)).unwrap();
    /// assert_eq!(cost.gross.cents(), 30_000);
    /// assert_eq!(cost.net.cents(), 27_000);
    /// ```
    pub fn compute(
        line: usize,
        unit: Money,
        quantity: i64,
        discount: DiscountRate,
    ) -> CoreResult<LineCost> {
        let gross = unit
            .checked_mul_quantity(quantity)
            .ok_or_else(|| CoreError::InvalidLineItem {
                line,
                reason: format!("line total overflows for quantity {quantity}"),
            })?;

        Ok(LineCost {
            unit,
            quantity,
            gross,
            discount,
            net: gross.apply_discount(discount),
        })
    }
}

/// Prices a line for a customer tier.
pub fn price_line(
    line: usize,
    tier: CustomerTier,
    product: &Product,
    quantity: i64,
    discount: DiscountRate,
) -> CoreResult<LineCost> {
    LineCost::compute(line, unit_price(tier, product), quantity, discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".into(),
            name: "steel bolts".into(),
            category: "fasteners".into(),
            wholesale_price_cents: 8000,
            retail_price_cents: 10_000,
            distributor_price_cents: 9000,
            quantity: 50,
            last_restocked_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_each_tier_selects_its_price() {
        let product = sample_product();
        assert_eq!(unit_price(CustomerTier::Wholesaler, &product).cents(), 8000);
        assert_eq!(unit_price(CustomerTier::Retailer, &product).cents(), 10_000);
        assert_eq!(unit_price(CustomerTier::Distributor, &product).cents(), 9000);
    }

    #[test]
    fn test_retailer_three_units_ten_percent() {
        let cost = price_line(
            0,
            CustomerTier::Retailer,
            &sample_product(),
            3,
            DiscountRate::from_percent(10),
        )
        .unwrap();
        assert_eq!(cost.unit.cents(), 10_000);
        assert_eq!(cost.gross.cents(), 30_000);
        assert_eq!(cost.net.cents(), 27_000);
    }

    #[test]
    fn test_overflowing_line_is_rejected() {
        let err = LineCost::compute(4, Money::from_cents(i64::MAX / 2), 3, DiscountRate::zero())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidLineItem { line: 4, .. }));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Net equals gross × (1 − bps/10000) to within half a cent.
            #[test]
            fn net_matches_exact_discount_to_the_cent(
                unit in 1i64..10_000_000,
                qty in 1i64..10_000,
                bps in 0u32..=10_000,
            ) {
                let cost = LineCost::compute(0, Money::from_cents(unit), qty, DiscountRate::from_bps(bps)).unwrap();
                let gross = (unit * qty) as i128;
                prop_assert_eq!(cost.gross.cents() as i128, gross);

                // Compare in units of 1/10000 cent to stay in integers.
                let exact_scaled = gross * (10_000 - bps as i128);
                let net_scaled = cost.net.cents() as i128 * 10_000;
                prop_assert!((net_scaled - exact_scaled).abs() <= 5_000);
            }

            /// Discounts never make a line negative or larger than gross.
            #[test]
            fn net_is_bounded_by_gross(
                unit in 1i64..1_000_000,
                qty in 1i64..1_000,
                bps in 0u32..=10_000,
            ) {
                let cost = LineCost::compute(0, Money::from_cents(unit), qty, DiscountRate::from_bps(bps)).unwrap();
                prop_assert!(cost.net.cents() >= 0);
                prop_assert!(cost.net <= cost.gross);
            }
        }
    }
}
