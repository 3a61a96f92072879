// HTTP handlers for the analytics report endpoints.
//
// Every endpoint is a GET over a fresh snapshot; results are plain JSON
// arrays with no formatting or currency symbols applied.

use axum::{extract::State, Json};

use crate::analytics::error::AnalyticsError;
use crate::analytics::models::{
    CartEfficiency, CartFinalTotal, CartTotal, CategoryQuantity, CustomerCartCount,
    OutOfStockProduct, ProductAdditionCount, PromoDiscountProjection,
};
use crate::models::PromoCode;

/// Handler for GET /api/analytics/active-cart-totals
#[utoipa::path(
    get,
    path = "/api/analytics/active-cart-totals",
    responses(
        (status = 200, description = "Totals of all active carts", body = Vec<CartTotal>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn active_cart_totals(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CartTotal>>, AnalyticsError> {
    Ok(Json(state.analytics.active_cart_totals().await?))
}

/// Handler for GET /api/analytics/top-products
#[utoipa::path(
    get,
    path = "/api/analytics/top-products",
    responses(
        (status = 200, description = "Top 5 products by additions", body = Vec<ProductAdditionCount>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn top_products(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<ProductAdditionCount>>, AnalyticsError> {
    Ok(Json(state.analytics.top_products_by_additions().await?))
}

/// Handler for GET /api/analytics/active-carts-per-customer
#[utoipa::path(
    get,
    path = "/api/analytics/active-carts-per-customer",
    responses(
        (status = 200, description = "Active cart counts per customer", body = Vec<CustomerCartCount>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn active_carts_per_customer(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CustomerCartCount>>, AnalyticsError> {
    Ok(Json(state.analytics.active_cart_count_per_customer().await?))
}

/// Handler for GET /api/analytics/category-counts
#[utoipa::path(
    get,
    path = "/api/analytics/category-counts",
    responses(
        (status = 200, description = "Quantity totals per category", body = Vec<CategoryQuantity>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn category_counts(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CategoryQuantity>>, AnalyticsError> {
    Ok(Json(state.analytics.category_quantity_totals().await?))
}

/// Handler for GET /api/analytics/final-totals-with-promo
#[utoipa::path(
    get,
    path = "/api/analytics/final-totals-with-promo",
    responses(
        (status = 200, description = "Final totals for carts with a promo code", body = Vec<CartFinalTotal>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn final_totals_with_promo(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CartFinalTotal>>, AnalyticsError> {
    Ok(Json(state.analytics.final_totals_with_promo().await?))
}

/// Handler for GET /api/analytics/unused-promos
#[utoipa::path(
    get,
    path = "/api/analytics/unused-promos",
    responses(
        (status = 200, description = "Active promo codes no cart has used", body = Vec<PromoCode>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn unused_promos(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<PromoCode>>, AnalyticsError> {
    Ok(Json(state.analytics.unused_active_promos().await?))
}

/// Handler for GET /api/analytics/promo-discount-summary
#[utoipa::path(
    get,
    path = "/api/analytics/promo-discount-summary",
    responses(
        (status = 200, description = "Projected discount per promo if applied everywhere", body = Vec<PromoDiscountProjection>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn promo_discount_summary(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<PromoDiscountProjection>>, AnalyticsError> {
    Ok(Json(state.analytics.promo_discount_if_applied().await?))
}

/// Handler for GET /api/analytics/out-of-stock-products
#[utoipa::path(
    get,
    path = "/api/analytics/out-of-stock-products",
    responses(
        (status = 200, description = "Products in carts that were out of stock when added", body = Vec<OutOfStockProduct>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn out_of_stock_products(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<OutOfStockProduct>>, AnalyticsError> {
    Ok(Json(state.analytics.out_of_stock_products_in_carts().await?))
}

/// Handler for GET /api/analytics/weighted-efficiency
#[utoipa::path(
    get,
    path = "/api/analytics/weighted-efficiency",
    responses(
        (status = 200, description = "Weighted efficiency scores, best cart first", body = Vec<CartEfficiency>),
        (status = 500, description = "Internal server error")
    ),
    tag = "analytics"
)]
pub async fn weighted_efficiency(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CartEfficiency>>, AnalyticsError> {
    Ok(Json(state.analytics.cart_efficiency_scores().await?))
}
