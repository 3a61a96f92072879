use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::{DiscountType, LoyaltyLevel};

/// Request DTO for creating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    /// Defaults to today when omitted
    pub registration_date: Option<NaiveDate>,
    /// Defaults to bronze when omitted
    pub loyalty_level: Option<LoyaltyLevel>,
}

/// Request DTO for updating a customer; omitted fields are kept
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub loyalty_level: Option<LoyaltyLevel>,
}

/// Request DTO for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub category: String,
    #[validate(custom = "crate::validation::validate_non_negative_decimal")]
    pub base_price: Decimal,
    /// Defaults to false when omitted
    pub in_stock: Option<bool>,
}

/// Request DTO for updating a product; omitted fields are kept
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub name: Option<String>,
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub category: Option<String>,
    #[validate(custom = "crate::validation::validate_non_negative_decimal")]
    pub base_price: Option<Decimal>,
    pub in_stock: Option<bool>,
}

/// Request DTO for creating a cart
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCartRequest {
    pub customer_id: i64,
    /// Trimmed on storage; blank clears to no code
    pub promo_code: Option<String>,
    /// Defaults to false when omitted
    pub active: Option<bool>,
}

/// Request DTO for updating a cart; omitted fields are kept
///
/// A provided promo code is normalized: trimmed, and a blank value
/// clears the code entirely.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartRequest {
    pub customer_id: Option<i64>,
    pub active: Option<bool>,
    pub promo_code: Option<String>,
}

/// Request DTO for adding a line item to a cart
///
/// The product's name, category, price, and stock flag are copied onto
/// the item at creation time and never change afterwards.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCartItemRequest {
    pub cart_id: i64,
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for updating a line item's quantity
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
}

/// Request DTO for creating a promo code
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePromoRequest {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub code: String,
    pub discount_type: DiscountType,
    #[validate(custom = "crate::validation::validate_non_negative_decimal")]
    pub discount_value: Decimal,
    /// Defaults to false when omitted
    pub active: Option<bool>,
    pub applicable_category: Option<String>,
}

/// Request DTO for updating a promo code; omitted fields are kept
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePromoRequest {
    pub discount_type: Option<DiscountType>,
    #[validate(custom = "crate::validation::validate_non_negative_decimal")]
    pub discount_value: Option<Decimal>,
    pub active: Option<bool>,
    pub applicable_category: Option<String>,
    /// When true, removes the category filter regardless of
    /// `applicable_category`
    #[serde(default)]
    pub clear_category: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_promo_request_validation() {
        let valid = CreatePromoRequest {
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Percent,
            discount_value: dec!(10),
            active: Some(true),
            applicable_category: None,
        };
        assert!(valid.validate().is_ok());

        let blank_code = CreatePromoRequest {
            code: "   ".to_string(),
            discount_type: DiscountType::Percent,
            discount_value: dec!(10),
            active: None,
            applicable_category: None,
        };
        assert!(blank_code.validate().is_err());

        let negative_value = CreatePromoRequest {
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: dec!(-5),
            active: None,
            applicable_category: None,
        };
        assert!(negative_value.validate().is_err());
    }

    #[test]
    fn test_cart_item_quantity_validation() {
        let request: CreateCartItemRequest = serde_json::from_str(
            r#"{"cart_id": 1, "product_id": 2, "quantity": 0}"#,
        )
        .expect("Failed to deserialize CreateCartItemRequest");
        assert!(request.validate().is_err());

        let request: CreateCartItemRequest = serde_json::from_str(
            r#"{"cart_id": 1, "product_id": 2, "quantity": 3}"#,
        )
        .expect("Failed to deserialize CreateCartItemRequest");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_promo_clear_category_defaults_false() {
        let request: UpdatePromoRequest =
            serde_json::from_str(r#"{"active": true}"#).expect("Failed to deserialize");
        assert!(!request.clear_category);
        assert_eq!(request.active, Some(true));
    }

    #[test]
    fn test_create_customer_email_validation() {
        let request = CreateCustomerRequest {
            email: "not-an-email".to_string(),
            registration_date: None,
            loyalty_level: None,
        };
        assert!(request.validate().is_err());
    }
}
