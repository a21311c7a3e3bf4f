//! # Domain Types
//!
//! Core domain types used throughout Stockline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │    Customer     │   │     Order       │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │        │
//! │  │  name (unique)  │   │  name (unique)  │   │  submission_id  │        │
//! │  │  3 tier prices  │   │  tier           │   │  cost snapshot  │        │
//! │  │  quantity       │   │  orders_made    │   │  status         │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  CustomerTier   │   │  OrderStatus    │   │  DiscountRate   │        │
//! │  │  Wholesaler     │   │  Placed ...     │   │  bps (u32)      │        │
//! │  │  Retailer       │   │  Delivered      │   │  1000 = 10%     │        │
//! │  │  Distributor    │   │  CannotBe...    │   └─────────────────┘        │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products and customers have:
//! - `id`: UUID v4, used for relations
//! - `name`: the unique business key staff type into forms

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 10000 bps = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// 100% expressed in basis points.
    pub const FULL_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        DiscountRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Customer Tier
// =============================================================================

/// Pricing classification of a customer. Selects which of a product's three
/// prices applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CustomerTier {
    Wholesaler,
    Retailer,
    /// Older records and clients spell this `Distributer`.
    #[serde(alias = "Distributer")]
    Distributor,
}

impl CustomerTier {
    pub const ALL: [CustomerTier; 3] = [
        CustomerTier::Wholesaler,
        CustomerTier::Retailer,
        CustomerTier::Distributor,
    ];

    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::Wholesaler => "wholesaler",
            CustomerTier::Retailer => "retailer",
            CustomerTier::Distributor => "distributor",
        }
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CustomerTier::Wholesaler => "Wholesaler",
            CustomerTier::Retailer => "Retailer",
            CustomerTier::Distributor => "Distributor",
        };
        f.write_str(label)
    }
}

impl FromStr for CustomerTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wholesaler" => Ok(CustomerTier::Wholesaler),
            "retailer" => Ok(CustomerTier::Retailer),
            "distributor" | "distributer" => Ok(CustomerTier::Distributor),
            _ => Err(CoreError::UnknownTier(s.to_string())),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfillment status of an order record.
///
/// The serialized names are the labels warehouse staff see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderStatus {
    #[serde(rename = "Placed")]
    #[serde(alias = "placed")]
    Placed,
    #[serde(rename = "Preparing For Transit")]
    #[serde(alias = "preparing_for_transit")]
    PreparingForTransit,
    #[serde(rename = "Dispatched")]
    #[serde(alias = "dispatched")]
    Dispatched,
    #[serde(rename = "Delivered")]
    #[serde(alias = "delivered")]
    Delivered,
    #[serde(rename = "Cannot be processed")]
    #[serde(alias = "cannot_be_processed")]
    CannotBeProcessed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::PreparingForTransit,
        OrderStatus::Dispatched,
        OrderStatus::Delivered,
        OrderStatus::CannotBeProcessed,
    ];

    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::PreparingForTransit => "preparing_for_transit",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
            OrderStatus::CannotBeProcessed => "cannot_be_processed",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::PreparingForTransit => "Preparing For Transit",
            OrderStatus::Dispatched => "Dispatched",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::CannotBeProcessed => "Cannot be processed",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Placed
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts both the storage form and the display label.
impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted || st.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique, lowercased business key.
    pub name: String,

    /// Lowercased category label.
    pub category: String,

    /// Unit price for `Wholesaler` customers, in cents.
    pub wholesale_price_cents: i64,

    /// Unit price for `Retailer` customers, in cents.
    pub retail_price_cents: i64,

    /// Unit price for `Distributor` customers, in cents.
    pub distributor_price_cents: i64,

    /// On-hand quantity. Never negative.
    pub quantity: i64,

    #[ts(as = "String")]
    pub last_restocked_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn wholesale_price(&self) -> Money {
        Money::from_cents(self.wholesale_price_cents)
    }

    #[inline]
    pub fn retail_price(&self) -> Money {
        Money::from_cents(self.retail_price_cents)
    }

    #[inline]
    pub fn distributor_price(&self) -> Money {
        Money::from_cents(self.distributor_price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock right now.
    ///
    /// Advisory only: the authoritative check is the conditional decrement
    /// in the placement transaction.
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Input for creating or replacing a product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub wholesale_price_cents: i64,
    pub retail_price_cents: i64,
    pub distributor_price_cents: i64,
    pub quantity: i64,
    #[ts(as = "Option<String>")]
    pub last_restocked_at: Option<DateTime<Utc>>,
}

impl ProductDraft {
    /// Returns a copy with the name and category case-normalized.
    pub fn normalized(&self) -> Self {
        ProductDraft {
            name: normalize_product_name(&self.name),
            category: self.category.trim().to_lowercase(),
            ..self.clone()
        }
    }
}

/// Canonical form of a product name: trimmed and lowercased.
///
/// ## Example
/// ```rust
/// use stockline_core::types::normalize_product_name;
///
/// assert_eq!(normalize_product_name("  Steel Bolts "), "steel bolts");
/// ```
pub fn normalize_product_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    /// Unique business key.
    pub name: String,
    pub address: String,
    pub tier: CustomerTier,
    /// Number of order lines accepted for this customer.
    pub orders_made: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerDraft {
    pub name: String,
    pub address: String,
    pub tier: CustomerTier,
}

// =============================================================================
// Order
// =============================================================================

/// One product line of an accepted submission.
///
/// Uses the snapshot pattern: product name and unit cost are frozen at the
/// time of placement and survive later catalog edits or deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Groups the lines of one placement and deduplicates retries.
    pub submission_id: String,
    /// Product name at time of order (frozen).
    pub product_name: String,
    /// Unit cost for the customer's tier at time of order (frozen).
    pub unit_cost_cents: i64,
    pub quantity: i64,
    pub customer_id: String,
    /// Customer name at time of order (denormalized for display).
    pub customer_name: String,
    /// unit_cost × quantity.
    pub gross_cost_cents: i64,
    pub discount_bps: u32,
    /// gross − discount, rounded to the cent.
    pub net_cost_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    #[inline]
    pub fn gross_cost(&self) -> Money {
        Money::from_cents(self.gross_cost_cents)
    }

    #[inline]
    pub fn net_cost(&self) -> Money {
        Money::from_cents(self.net_cost_cents)
    }

    #[inline]
    pub fn discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }

    /// Discount as a percentage, e.g. `12.5`.
    #[inline]
    pub fn discount_percent(&self) -> f64 {
        self.discount().percent()
    }
}

// =============================================================================
// Placement Request / Result
// =============================================================================

/// One requested line in a placement submission, as sent by a sales agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItemRequest {
    pub product_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub discount_percent: f64,
}

/// A placement submission.
///
/// `submission_key` deduplicates retries of the same submission. When absent
/// the engine generates one, so an unkeyed retry is a new submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    pub lines: Vec<LineItemRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_key: Option<String>,
}

/// Body of a status change. `status` accepts the display label
/// (`"Preparing For Transit"`) or the storage form (`"preparing_for_transit"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// The result of a successful placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PlacementReceipt {
    pub submission_id: String,
    pub customer_name: String,
    pub orders: Vec<Order>,
    /// Sum of the per-line net costs.
    pub total_net_cents: i64,
    /// True when this receipt answers a retry of an already committed
    /// submission and nothing new was written.
    pub replayed: bool,
}

impl PlacementReceipt {
    /// Builds a receipt from committed order lines.
    pub fn new(
        submission_id: impl Into<String>,
        customer_name: impl Into<String>,
        orders: Vec<Order>,
        replayed: bool,
    ) -> Self {
        let total: Money = orders.iter().map(Order::net_cost).sum();
        PlacementReceipt {
            submission_id: submission_id.into(),
            customer_name: customer_name.into(),
            orders,
            total_net_cents: total.cents(),
            replayed,
        }
    }

    #[inline]
    pub fn total_net(&self) -> Money {
        Money::from_cents(self.total_net_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_conversions() {
        let rate = DiscountRate::from_percent(10);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percent() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tier_parsing_accepts_legacy_spelling() {
        assert_eq!("Retailer".parse::<CustomerTier>().unwrap(), CustomerTier::Retailer);
        assert_eq!("distributer".parse::<CustomerTier>().unwrap(), CustomerTier::Distributor);
        assert!(matches!(
            "platinum".parse::<CustomerTier>(),
            Err(CoreError::UnknownTier(_))
        ));
    }

    #[test]
    fn test_tier_serde_alias() {
        let tier: CustomerTier = serde_json::from_str("\"Distributer\"").unwrap();
        assert_eq!(tier, CustomerTier::Distributor);
        assert_eq!(serde_json::to_string(&tier).unwrap(), "\"Distributor\"");
    }

    #[test]
    fn test_status_labels_round_trip_through_from_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.label().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_label() {
        let json = serde_json::to_string(&OrderStatus::PreparingForTransit).unwrap();
        assert_eq!(json, "\"Preparing For Transit\"");
        let parsed: OrderStatus = serde_json::from_str("\"Cannot be processed\"").unwrap();
        assert_eq!(parsed, OrderStatus::CannotBeProcessed);
    }

    #[test]
    fn test_product_draft_normalized() {
        let draft = ProductDraft {
            name: "  Copper Wire ".into(),
            category: "ELECTRICAL".into(),
            wholesale_price_cents: 100,
            retail_price_cents: 120,
            distributor_price_cents: 110,
            quantity: 5,
            last_restocked_at: None,
        };
        let normalized = draft.normalized();
        assert_eq!(normalized.name, "copper wire");
        assert_eq!(normalized.category, "electrical");
        assert_eq!(normalized.quantity, 5);
    }

    #[test]
    fn test_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
    }
}
