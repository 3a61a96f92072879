use std::collections::HashMap;

use sqlx::PgPool;

use crate::analytics::error::AnalyticsError;
use crate::models::{Cart, CartItem, Customer, PromoCode};

/// Read-only bulk access to the entity snapshot the reports compute over
///
/// Every method reads whatever is committed at call time; the repository
/// never writes. Carts come back with their line items attached in
/// insertion order.
#[derive(Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    /// Create a new SnapshotRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active carts, with line items
    pub async fn list_active_carts(&self) -> Result<Vec<Cart>, AnalyticsError> {
        let carts = sqlx::query_as::<_, Cart>(
            r#"
            SELECT cart_id, customer_id, created_date, is_active, promo_code
            FROM carts
            WHERE is_active = TRUE
            ORDER BY cart_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(carts).await
    }

    /// Every cart, with line items
    pub async fn list_all_carts(&self) -> Result<Vec<Cart>, AnalyticsError> {
        let carts = sqlx::query_as::<_, Cart>(
            r#"
            SELECT cart_id, customer_id, created_date, is_active, promo_code
            FROM carts
            ORDER BY cart_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(carts).await
    }

    /// Every line item across all carts
    pub async fn list_all_line_items(&self) -> Result<Vec<CartItem>, AnalyticsError> {
        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT cart_item_id, cart_id, source_product_id, name, category,
                   unit_price, in_stock, quantity, added_date
            FROM cart_items
            ORDER BY cart_item_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Every customer
    pub async fn list_all_customers(&self) -> Result<Vec<Customer>, AnalyticsError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT customer_id, email, registration_date, loyalty_level
            FROM customers
            ORDER BY customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Every promo code
    pub async fn list_all_promo_codes(&self) -> Result<Vec<PromoCode>, AnalyticsError> {
        let promos = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT code, discount_type, discount_value, active, applicable_category
            FROM promo_codes
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(promos)
    }

    /// Active promo codes only
    pub async fn list_active_promo_codes(&self) -> Result<Vec<PromoCode>, AnalyticsError> {
        let promos = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT code, discount_type, discount_value, active, applicable_category
            FROM promo_codes
            WHERE active = TRUE
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(promos)
    }

    /// Look up a promo code by its exact (case-sensitive) code
    pub async fn find_promo_by_code(
        &self,
        code: &str,
    ) -> Result<Option<PromoCode>, AnalyticsError> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT code, discount_type, discount_value, active, applicable_category
            FROM promo_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Attach line items to the given carts, ordered by line item id
    async fn attach_items(&self, mut carts: Vec<Cart>) -> Result<Vec<Cart>, AnalyticsError> {
        if carts.is_empty() {
            return Ok(carts);
        }

        let cart_ids: Vec<i64> = carts.iter().map(|cart| cart.cart_id).collect();
        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT cart_item_id, cart_id, source_product_id, name, category,
                   unit_price, in_stock, quantity, added_date
            FROM cart_items
            WHERE cart_id = ANY($1)
            ORDER BY cart_item_id
            "#,
        )
        .bind(&cart_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<CartItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.cart_id).or_default().push(item);
        }
        for cart in &mut carts {
            cart.items = grouped.remove(&cart.cart_id).unwrap_or_default();
        }

        Ok(carts)
    }
}
