use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Computed total value of a single cart
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartTotal {
    #[schema(example = 1)]
    pub cart_id: i64,
    pub total: Decimal,
}

/// How often a product was added to carts, summed over line item quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductAdditionCount {
    #[schema(example = 1)]
    pub product_id: i64,
    #[schema(example = "Wireless Mouse")]
    pub name: String,
    #[schema(example = 12)]
    pub total_quantity: i64,
}

/// Number of active carts owned by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerCartCount {
    #[schema(example = 1)]
    pub customer_id: i64,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = 3)]
    pub active_carts: i64,
}

/// Total line item quantity per normalized category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryQuantity {
    #[schema(example = "electronics")]
    pub category: String,
    #[schema(example = 7)]
    pub total_quantity: i64,
}

/// Final payable total for a cart after its assigned promo code is applied
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartFinalTotal {
    #[schema(example = 1)]
    pub cart_id: i64,
    #[schema(example = "SAVE10")]
    pub promo_code: String,
    pub final_total: Decimal,
}

/// Projected discount a promo code would grant if every cart used it
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PromoDiscountProjection {
    #[schema(example = "SAVE10")]
    pub code: String,
    pub total_discount: Decimal,
}

/// A product sitting in a cart whose snapshot was taken while out of stock
///
/// Rebuilt from the line item's frozen product snapshot, not from a live
/// catalog lookup.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OutOfStockProduct {
    #[schema(example = 1)]
    pub product_id: i64,
    #[schema(example = "Wireless Mouse")]
    pub name: String,
    #[schema(example = "electronics")]
    pub category: Option<String>,
    pub unit_price: Decimal,
}

/// Composite efficiency score for a cart, in [0, 100]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartEfficiency {
    #[schema(example = 1)]
    pub cart_id: i64,
    pub total: Decimal,
    #[schema(example = 5)]
    pub item_count: i64,
    #[schema(example = 3)]
    pub distinct_products: i64,
    pub score: Decimal,
}
