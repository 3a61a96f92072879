use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loyalty tier assigned to a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyLevel {
    /// Convert loyalty level to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyLevel::Bronze => "bronze",
            LoyaltyLevel::Silver => "silver",
            LoyaltyLevel::Gold => "gold",
            LoyaltyLevel::Platinum => "platinum",
        }
    }

    /// Parse loyalty level from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "bronze" => Ok(LoyaltyLevel::Bronze),
            "silver" => Ok(LoyaltyLevel::Silver),
            "gold" => Ok(LoyaltyLevel::Gold),
            "platinum" => Ok(LoyaltyLevel::Platinum),
            _ => Err(format!("Invalid loyalty level: {}", s)),
        }
    }
}

impl Default for LoyaltyLevel {
    fn default() -> Self {
        LoyaltyLevel::Bronze
    }
}

impl std::fmt::Display for LoyaltyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a promo code discounts the eligible subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percent,
    Fixed,
}

impl DiscountType {
    /// Convert discount type to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Fixed => "fixed",
        }
    }

    /// Parse discount type from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "percent" => Ok(DiscountType::Percent),
            "fixed" => Ok(DiscountType::Fixed),
            _ => Err(format!("Invalid discount type: {}", s)),
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered customer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    #[schema(example = 1)]
    pub customer_id: i64,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub registration_date: NaiveDate,
    pub loyalty_level: LoyaltyLevel,
}

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub product_id: i64,
    #[schema(example = "Wireless Mouse")]
    pub name: String,
    #[schema(example = "electronics")]
    pub category: String,
    pub base_price: Decimal,
    #[schema(example = true)]
    pub in_stock: bool,
}

/// A shopping cart
///
/// `items` is populated by the repository from the cart_items table,
/// ordered by line item id; it is never read from the cart row itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Cart {
    #[schema(example = 1)]
    pub cart_id: i64,
    pub customer_id: Option<i64>,
    pub created_date: DateTime<Utc>,
    #[sqlx(rename = "is_active")]
    pub active: bool,
    #[schema(example = "SAVE10")]
    pub promo_code: Option<String>,
    #[sqlx(skip)]
    pub items: Vec<CartItem>,
}

/// A cart line item
///
/// Carries an immutable snapshot of the product (name, category, price,
/// stock flag) taken at the time it was added to the cart. Later edits to
/// the source product do not retroactively change an existing line item,
/// and `source_product_id` may dangle once the product is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CartItem {
    #[schema(example = 1)]
    pub cart_item_id: i64,
    pub cart_id: i64,
    pub source_product_id: Option<i64>,
    #[schema(example = "Wireless Mouse")]
    pub name: String,
    #[schema(example = "electronics")]
    pub category: Option<String>,
    pub unit_price: Decimal,
    pub in_stock: bool,
    #[schema(example = 2, minimum = 1)]
    pub quantity: i32,
    pub added_date: DateTime<Utc>,
}

/// A promotional code
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PromoCode {
    #[schema(example = "SAVE10")]
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[schema(example = true)]
    pub active: bool,
    #[schema(example = "electronics")]
    pub applicable_category: Option<String>,
}

/// Normalize a raw promo code value for storage on a cart.
///
/// Stored codes are always trimmed; blank input normalizes to None.
pub fn normalize_promo_code(raw: Option<&str>) -> Option<String> {
    match raw {
        Some(code) if !code.trim().is_empty() => Some(code.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_promo_code_trims() {
        assert_eq!(
            normalize_promo_code(Some("  SAVE10  ")),
            Some("SAVE10".to_string())
        );
    }

    #[test]
    fn test_normalize_promo_code_blank_is_none() {
        assert_eq!(normalize_promo_code(Some("   ")), None);
        assert_eq!(normalize_promo_code(Some("")), None);
        assert_eq!(normalize_promo_code(None), None);
    }

    #[test]
    fn test_discount_type_round_trip() {
        assert_eq!(DiscountType::from_str("percent").unwrap(), DiscountType::Percent);
        assert_eq!(DiscountType::from_str("FIXED").unwrap(), DiscountType::Fixed);
        assert!(DiscountType::from_str("bogus").is_err());
        assert_eq!(DiscountType::Percent.to_string(), "percent");
    }

    #[test]
    fn test_loyalty_level_round_trip() {
        assert_eq!(LoyaltyLevel::from_str("GOLD").unwrap(), LoyaltyLevel::Gold);
        assert!(LoyaltyLevel::from_str("diamond").is_err());
        assert_eq!(LoyaltyLevel::default(), LoyaltyLevel::Bronze);
    }

    #[test]
    fn test_promo_code_serialization() {
        let promo = PromoCode {
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Percent,
            discount_value: dec!(10),
            active: true,
            applicable_category: None,
        };

        let json = serde_json::to_string(&promo).expect("Failed to serialize PromoCode");
        assert!(json.contains("\"code\":\"SAVE10\""));
        assert!(json.contains("\"discount_type\":\"percent\""));
        assert!(json.contains("\"active\":true"));
    }

    #[test]
    fn test_cart_deserialization_defaults() {
        let json = r#"{
            "cart_id": 7,
            "customer_id": null,
            "created_date": "2024-03-01T10:00:00Z",
            "active": true,
            "promo_code": "SAVE10",
            "items": []
        }"#;

        let cart: Cart = serde_json::from_str(json).expect("Failed to deserialize Cart");
        assert_eq!(cart.cart_id, 7);
        assert!(cart.active);
        assert!(cart.items.is_empty());
        assert_eq!(cart.promo_code.as_deref(), Some("SAVE10"));
    }
}
