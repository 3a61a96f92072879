use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::manage::error::ManageError;
use crate::models::{Cart, CartItem, Customer, DiscountType, LoyaltyLevel, Product, PromoCode};

/// Repository for customer records
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Create a new CustomerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer
    pub async fn create(
        &self,
        email: &str,
        registration_date: NaiveDate,
        loyalty_level: LoyaltyLevel,
    ) -> Result<Customer, ManageError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (email, registration_date, loyalty_level)
            VALUES ($1, $2, $3)
            RETURNING customer_id, email, registration_date, loyalty_level
            "#,
        )
        .bind(email)
        .bind(registration_date)
        .bind(loyalty_level)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Find a customer by id
    pub async fn find_by_id(&self, customer_id: i64) -> Result<Option<Customer>, ManageError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT customer_id, email, registration_date, loyalty_level FROM customers WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Write back a full customer row
    pub async fn update(&self, customer: &Customer) -> Result<Customer, ManageError> {
        let updated = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET email = $1, registration_date = $2, loyalty_level = $3
            WHERE customer_id = $4
            RETURNING customer_id, email, registration_date, loyalty_level
            "#,
        )
        .bind(&customer.email)
        .bind(customer.registration_date)
        .bind(customer.loyalty_level)
        .bind(customer.customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ManageError::not_found("Customer", customer.customer_id))?;

        Ok(updated)
    }

    /// Delete a customer; returns false when no row matched
    pub async fn delete(&self, customer_id: i64) -> Result<bool, ManageError> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All customers, ordered by id
    pub async fn list_all(&self) -> Result<Vec<Customer>, ManageError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT customer_id, email, registration_date, loyalty_level FROM customers ORDER BY customer_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

/// Repository for catalog products
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new ProductRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product
    pub async fn create(
        &self,
        name: &str,
        category: &str,
        base_price: Decimal,
        in_stock: bool,
    ) -> Result<Product, ManageError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, category, base_price, in_stock)
            VALUES ($1, $2, $3, $4)
            RETURNING product_id, name, category, base_price, in_stock
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(base_price)
        .bind(in_stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find a product by id
    pub async fn find_by_id(&self, product_id: i64) -> Result<Option<Product>, ManageError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT product_id, name, category, base_price, in_stock FROM products WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Write back a full product row
    ///
    /// Existing line items keep their snapshot; this touches the catalog
    /// record only.
    pub async fn update(&self, product: &Product) -> Result<Product, ManageError> {
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $1, category = $2, base_price = $3, in_stock = $4
            WHERE product_id = $5
            RETURNING product_id, name, category, base_price, in_stock
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.base_price)
        .bind(product.in_stock)
        .bind(product.product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ManageError::not_found("Product", product.product_id))?;

        Ok(updated)
    }

    /// Delete a product; returns false when no row matched
    pub async fn delete(&self, product_id: i64) -> Result<bool, ManageError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All products, ordered by id
    pub async fn list_all(&self) -> Result<Vec<Product>, ManageError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT product_id, name, category, base_price, in_stock FROM products ORDER BY product_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

/// Repository for carts
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new CartRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a cart
    pub async fn create(
        &self,
        customer_id: i64,
        promo_code: Option<&str>,
        active: bool,
    ) -> Result<Cart, ManageError> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (customer_id, is_active, promo_code)
            VALUES ($1, $2, $3)
            RETURNING cart_id, customer_id, created_date, is_active, promo_code
            "#,
        )
        .bind(customer_id)
        .bind(active)
        .bind(promo_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Find a cart by id, with its line items attached
    pub async fn find_by_id(&self, cart_id: i64) -> Result<Option<Cart>, ManageError> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT cart_id, customer_id, created_date, is_active, promo_code FROM carts WHERE cart_id = $1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        match cart {
            Some(cart) => {
                let mut carts = self.attach_items(vec![cart]).await?;
                Ok(carts.pop())
            }
            None => Ok(None),
        }
    }

    /// Write back a cart row (items are managed separately)
    pub async fn update(&self, cart: &Cart) -> Result<Cart, ManageError> {
        let updated = sqlx::query_as::<_, Cart>(
            r#"
            UPDATE carts
            SET customer_id = $1, is_active = $2, promo_code = $3
            WHERE cart_id = $4
            RETURNING cart_id, customer_id, created_date, is_active, promo_code
            "#,
        )
        .bind(cart.customer_id)
        .bind(cart.active)
        .bind(cart.promo_code.as_deref())
        .bind(cart.cart_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ManageError::not_found("Cart", cart.cart_id))?;

        Ok(updated)
    }

    /// Delete a cart; returns false when no row matched
    pub async fn delete(&self, cart_id: i64) -> Result<bool, ManageError> {
        let result = sqlx::query("DELETE FROM carts WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All carts with their line items, ordered by id
    pub async fn list_all(&self) -> Result<Vec<Cart>, ManageError> {
        let carts = sqlx::query_as::<_, Cart>(
            "SELECT cart_id, customer_id, created_date, is_active, promo_code FROM carts ORDER BY cart_id",
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(carts).await
    }

    /// Whether any cart belongs to the given customer
    pub async fn exists_for_customer(&self, customer_id: i64) -> Result<bool, ManageError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM carts WHERE customer_id = $1)",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }

    async fn attach_items(&self, mut carts: Vec<Cart>) -> Result<Vec<Cart>, ManageError> {
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

/// Repository for cart line items
#[derive(Clone)]
pub struct CartItemRepository {
    pool: PgPool,
}

impl CartItemRepository {
    /// Create a new CartItemRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a line item, copying the product snapshot onto it
    pub async fn create(
        &self,
        cart_id: i64,
        product: &Product,
        quantity: i32,
    ) -> Result<CartItem, ManageError> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items
                (cart_id, source_product_id, name, category, unit_price, in_stock, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING cart_item_id, cart_id, source_product_id, name, category,
                      unit_price, in_stock, quantity, added_date
            "#,
        )
        .bind(cart_id)
        .bind(product.product_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.base_price)
        .bind(product.in_stock)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Find a line item by id
    pub async fn find_by_id(&self, cart_item_id: i64) -> Result<Option<CartItem>, ManageError> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT cart_item_id, cart_id, source_product_id, name, category,
                   unit_price, in_stock, quantity, added_date
            FROM cart_items
            WHERE cart_item_id = $1
            "#,
        )
        .bind(cart_item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Update a line item's quantity (the snapshot itself is immutable)
    pub async fn update_quantity(
        &self,
        cart_item_id: i64,
        quantity: i32,
    ) -> Result<CartItem, ManageError> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = $1
            WHERE cart_item_id = $2
            RETURNING cart_item_id, cart_id, source_product_id, name, category,
                      unit_price, in_stock, quantity, added_date
            "#,
        )
        .bind(quantity)
        .bind(cart_item_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ManageError::not_found("Cart item", cart_item_id))?;

        Ok(item)
    }

    /// Delete a line item; returns false when no row matched
    pub async fn delete(&self, cart_item_id: i64) -> Result<bool, ManageError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_item_id = $1")
            .bind(cart_item_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All line items, ordered by id
    pub async fn list_all(&self) -> Result<Vec<CartItem>, ManageError> {
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

    /// Whether any line item belongs to the given cart
    pub async fn exists_for_cart(&self, cart_id: i64) -> Result<bool, ManageError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM cart_items WHERE cart_id = $1)",
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }
}

/// Repository for promo codes
#[derive(Clone)]
pub struct PromoCodeRepository {
    pool: PgPool,
}

impl PromoCodeRepository {
    /// Create a new PromoCodeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a promo code
    pub async fn create(
        &self,
        code: &str,
        discount_type: DiscountType,
        discount_value: Decimal,
        active: bool,
        applicable_category: Option<&str>,
    ) -> Result<PromoCode, ManageError> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            INSERT INTO promo_codes (code, discount_type, discount_value, active, applicable_category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING code, discount_type, discount_value, active, applicable_category
            "#,
        )
        .bind(code)
        .bind(discount_type)
        .bind(discount_value)
        .bind(active)
        .bind(applicable_category)
        .fetch_one(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Find a promo code by its exact code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, ManageError> {
        let promo = sqlx::query_as::<_, PromoCode>(
            "SELECT code, discount_type, discount_value, active, applicable_category FROM promo_codes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Whether a promo code already exists
    pub async fn exists(&self, code: &str) -> Result<bool, ManageError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM promo_codes WHERE code = $1)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }

    /// Write back a full promo code row
    pub async fn update(&self, promo: &PromoCode) -> Result<PromoCode, ManageError> {
        let updated = sqlx::query_as::<_, PromoCode>(
            r#"
            UPDATE promo_codes
            SET discount_type = $1, discount_value = $2, active = $3, applicable_category = $4
            WHERE code = $5
            RETURNING code, discount_type, discount_value, active, applicable_category
            "#,
        )
        .bind(promo.discount_type)
        .bind(promo.discount_value)
        .bind(promo.active)
        .bind(promo.applicable_category.as_deref())
        .bind(&promo.code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ManageError::not_found("Promo code", &promo.code))?;

        Ok(updated)
    }

    /// Delete a promo code; returns false when no row matched
    pub async fn delete(&self, code: &str) -> Result<bool, ManageError> {
        let result = sqlx::query("DELETE FROM promo_codes WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All promo codes, ordered by code
    pub async fn list_all(&self) -> Result<Vec<PromoCode>, ManageError> {
        let promos = sqlx::query_as::<_, PromoCode>(
            "SELECT code, discount_type, discount_value, active, applicable_category FROM promo_codes ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(promos)
    }
}
