// HTTP handlers for entity management and search.
//
// Mutations validate their payload, check referential guards, and log at
// info level; searches list the full collection and filter in memory.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::manage::error::ManageError;
use crate::manage::models::{
    CreateCartItemRequest, CreateCartRequest, CreateCustomerRequest, CreatePromoRequest,
    CreateProductRequest, UpdateCartItemRequest, UpdateCartRequest, UpdateCustomerRequest,
    UpdatePromoRequest, UpdateProductRequest,
};
use crate::models::{normalize_promo_code, Cart, CartItem, Customer, Product, PromoCode};
use crate::search::{
    filter_cart_items, filter_carts, filter_customers, filter_products, filter_promos,
    CartItemSearchParams, CartSearchParams, CustomerSearchParams, ProductSearchParams,
    PromoSearchParams,
};

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// Handler for POST /api/customers
pub async fn create_customer(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ManageError> {
    payload.validate()?;

    let registration_date = payload
        .registration_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let customer = state
        .customers
        .create(
            payload.email.trim(),
            registration_date,
            payload.loyalty_level.unwrap_or_default(),
        )
        .await?;

    tracing::info!("Created customer {}", customer.customer_id);
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Handler for PUT /api/customers/:id
pub async fn update_customer(
    State(state): State<crate::AppState>,
    Path(customer_id): Path<i64>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ManageError> {
    payload.validate()?;

    let mut customer = state
        .customers
        .find_by_id(customer_id)
        .await?
        .ok_or_else(|| ManageError::not_found("Customer", customer_id))?;

    if let Some(email) = payload.email {
        customer.email = email.trim().to_string();
    }
    if let Some(registration_date) = payload.registration_date {
        customer.registration_date = registration_date;
    }
    if let Some(loyalty_level) = payload.loyalty_level {
        customer.loyalty_level = loyalty_level;
    }

    let updated = state.customers.update(&customer).await?;
    tracing::info!("Updated customer {}", customer_id);
    Ok(Json(updated))
}

/// Handler for DELETE /api/customers/:id
///
/// Refuses while the customer still owns carts.
pub async fn delete_customer(
    State(state): State<crate::AppState>,
    Path(customer_id): Path<i64>,
) -> Result<StatusCode, ManageError> {
    if state.carts.exists_for_customer(customer_id).await? {
        return Err(ManageError::Conflict(format!(
            "Customer {} still owns carts",
            customer_id
        )));
    }
    if !state.customers.delete(customer_id).await? {
        return Err(ManageError::not_found("Customer", customer_id));
    }

    tracing::info!("Deleted customer {}", customer_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/customers
pub async fn search_customers(
    State(state): State<crate::AppState>,
    Query(params): Query<CustomerSearchParams>,
) -> Result<Json<Vec<Customer>>, ManageError> {
    let customers = state.customers.list_all().await?;
    let found = filter_customers(customers, &params);
    tracing::debug!("Customer search returned {} rows", found.len());
    Ok(Json(found))
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Handler for POST /api/products
pub async fn create_product(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ManageError> {
    payload.validate()?;

    let product = state
        .products
        .create(
            payload.name.trim(),
            payload.category.trim(),
            payload.base_price,
            payload.in_stock.unwrap_or(false),
        )
        .await?;

    tracing::info!("Created product {}", product.product_id);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for PUT /api/products/:id
///
/// Touches the catalog record only; line item snapshots are immutable.
pub async fn update_product(
    State(state): State<crate::AppState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ManageError> {
    payload.validate()?;

    let mut product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| ManageError::not_found("Product", product_id))?;

    if let Some(name) = payload.name {
        product.name = name.trim().to_string();
    }
    if let Some(category) = payload.category {
        product.category = category.trim().to_string();
    }
    if let Some(base_price) = payload.base_price {
        product.base_price = base_price;
    }
    if let Some(in_stock) = payload.in_stock {
        product.in_stock = in_stock;
    }

    let updated = state.products.update(&product).await?;
    tracing::info!("Updated product {}", product_id);
    Ok(Json(updated))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<crate::AppState>,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, ManageError> {
    if !state.products.delete(product_id).await? {
        return Err(ManageError::not_found("Product", product_id));
    }

    tracing::info!("Deleted product {}", product_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/products
pub async fn search_products(
    State(state): State<crate::AppState>,
    Query(params): Query<ProductSearchParams>,
) -> Result<Json<Vec<Product>>, ManageError> {
    let products = state.products.list_all().await?;
    let found = filter_products(products, &params);
    tracing::debug!("Product search returned {} rows", found.len());
    Ok(Json(found))
}

// ---------------------------------------------------------------------------
// Carts
// ---------------------------------------------------------------------------

/// Handler for POST /api/carts
pub async fn create_cart(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateCartRequest>,
) -> Result<(StatusCode, Json<Cart>), ManageError> {
    payload.validate()?;

    if state.customers.find_by_id(payload.customer_id).await?.is_none() {
        return Err(ManageError::not_found("Customer", payload.customer_id));
    }

    let promo_code = normalize_promo_code(payload.promo_code.as_deref());
    let cart = state
        .carts
        .create(
            payload.customer_id,
            promo_code.as_deref(),
            payload.active.unwrap_or(false),
        )
        .await?;

    tracing::info!("Created cart {}", cart.cart_id);
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Handler for PUT /api/carts/:id
pub async fn update_cart(
    State(state): State<crate::AppState>,
    Path(cart_id): Path<i64>,
    Json(payload): Json<UpdateCartRequest>,
) -> Result<Json<Cart>, ManageError> {
    payload.validate()?;

    let mut cart = state
        .carts
        .find_by_id(cart_id)
        .await?
        .ok_or_else(|| ManageError::not_found("Cart", cart_id))?;

    if let Some(customer_id) = payload.customer_id {
        if state.customers.find_by_id(customer_id).await?.is_none() {
            return Err(ManageError::not_found("Customer", customer_id));
        }
        cart.customer_id = Some(customer_id);
    }
    if let Some(active) = payload.active {
        cart.active = active;
    }
    if let Some(promo_code) = payload.promo_code {
        // Blank input clears the code entirely
        cart.promo_code = normalize_promo_code(Some(&promo_code));
    }

    let updated = state.carts.update(&cart).await?;
    tracing::info!("Updated cart {}", cart_id);
    Ok(Json(updated))
}

/// Handler for DELETE /api/carts/:id
///
/// Refuses while line items remain in the cart.
pub async fn delete_cart(
    State(state): State<crate::AppState>,
    Path(cart_id): Path<i64>,
) -> Result<StatusCode, ManageError> {
    if state.cart_items.exists_for_cart(cart_id).await? {
        return Err(ManageError::Conflict(format!(
            "Cart {} still contains line items",
            cart_id
        )));
    }
    if !state.carts.delete(cart_id).await? {
        return Err(ManageError::not_found("Cart", cart_id));
    }

    tracing::info!("Deleted cart {}", cart_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/carts
pub async fn search_carts(
    State(state): State<crate::AppState>,
    Query(params): Query<CartSearchParams>,
) -> Result<Json<Vec<Cart>>, ManageError> {
    let carts = state.carts.list_all().await?;
    let found = filter_carts(carts, &params);
    tracing::debug!("Cart search returned {} rows", found.len());
    Ok(Json(found))
}

// ---------------------------------------------------------------------------
// Cart items
// ---------------------------------------------------------------------------

/// Handler for POST /api/cart-items
///
/// Copies the product's current name, category, price, and stock flag
/// onto the new line item; the snapshot never changes afterwards.
pub async fn create_cart_item(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateCartItemRequest>,
) -> Result<(StatusCode, Json<CartItem>), ManageError> {
    payload.validate()?;

    if state.carts.find_by_id(payload.cart_id).await?.is_none() {
        return Err(ManageError::not_found("Cart", payload.cart_id));
    }
    let product = state
        .products
        .find_by_id(payload.product_id)
        .await?
        .ok_or_else(|| ManageError::not_found("Product", payload.product_id))?;

    let item = state
        .cart_items
        .create(payload.cart_id, &product, payload.quantity)
        .await?;

    tracing::info!(
        "Added product {} to cart {} as item {}",
        payload.product_id,
        payload.cart_id,
        item.cart_item_id
    );
    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for PUT /api/cart-items/:id
pub async fn update_cart_item(
    State(state): State<crate::AppState>,
    Path(cart_item_id): Path<i64>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartItem>, ManageError> {
    payload.validate()?;

    let item = state
        .cart_items
        .find_by_id(cart_item_id)
        .await?
        .ok_or_else(|| ManageError::not_found("Cart item", cart_item_id))?;

    let updated = match payload.quantity {
        Some(quantity) => {
            let updated = state
                .cart_items
                .update_quantity(cart_item_id, quantity)
                .await?;
            tracing::info!("Updated cart item {} quantity to {}", cart_item_id, quantity);
            updated
        }
        None => item,
    };

    Ok(Json(updated))
}

/// Handler for DELETE /api/cart-items/:id
pub async fn delete_cart_item(
    State(state): State<crate::AppState>,
    Path(cart_item_id): Path<i64>,
) -> Result<StatusCode, ManageError> {
    if !state.cart_items.delete(cart_item_id).await? {
        return Err(ManageError::not_found("Cart item", cart_item_id));
    }

    tracing::info!("Deleted cart item {}", cart_item_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/cart-items
pub async fn search_cart_items(
    State(state): State<crate::AppState>,
    Query(params): Query<CartItemSearchParams>,
) -> Result<Json<Vec<CartItem>>, ManageError> {
    let items = state.cart_items.list_all().await?;
    let found = filter_cart_items(items, &params);
    tracing::debug!("Cart item search returned {} rows", found.len());
    Ok(Json(found))
}

// ---------------------------------------------------------------------------
// Promo codes
// ---------------------------------------------------------------------------

/// Handler for POST /api/promo-codes
pub async fn create_promo(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreatePromoRequest>,
) -> Result<(StatusCode, Json<PromoCode>), ManageError> {
    payload.validate()?;

    let code = payload.code.trim().to_string();
    if state.promos.exists(&code).await? {
        tracing::warn!("Attempt to create duplicate promo code {}", code);
        return Err(ManageError::Conflict(format!(
            "Promo code '{}' already exists",
            code
        )));
    }

    let applicable_category = payload
        .applicable_category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty());
    let promo = state
        .promos
        .create(
            &code,
            payload.discount_type,
            payload.discount_value,
            payload.active.unwrap_or(false),
            applicable_category,
        )
        .await?;

    tracing::info!("Created promo code {}", promo.code);
    Ok((StatusCode::CREATED, Json(promo)))
}

/// Handler for PUT /api/promo-codes/:code
pub async fn update_promo(
    State(state): State<crate::AppState>,
    Path(code): Path<String>,
    Json(payload): Json<UpdatePromoRequest>,
) -> Result<Json<PromoCode>, ManageError> {
    payload.validate()?;

    let mut promo = state
        .promos
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ManageError::not_found("Promo code", &code))?;

    if let Some(discount_type) = payload.discount_type {
        promo.discount_type = discount_type;
    }
    if let Some(discount_value) = payload.discount_value {
        promo.discount_value = discount_value;
    }
    if let Some(active) = payload.active {
        promo.active = active;
    }
    if payload.clear_category {
        promo.applicable_category = None;
    } else if let Some(category) = payload.applicable_category {
        let trimmed = category.trim();
        if !trimmed.is_empty() {
            promo.applicable_category = Some(trimmed.to_string());
        }
    }

    let updated = state.promos.update(&promo).await?;
    tracing::info!("Updated promo code {}", code);
    Ok(Json(updated))
}

/// Handler for DELETE /api/promo-codes/:code
pub async fn delete_promo(
    State(state): State<crate::AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ManageError> {
    if !state.promos.delete(&code).await? {
        return Err(ManageError::not_found("Promo code", &code));
    }

    tracing::info!("Deleted promo code {}", code);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/promo-codes
pub async fn search_promos(
    State(state): State<crate::AppState>,
    Query(params): Query<PromoSearchParams>,
) -> Result<Json<Vec<PromoCode>>, ManageError> {
    let promos = state.promos.list_all().await?;
    let found = filter_promos(promos, &params);
    tracing::debug!("Promo search returned {} rows", found.len());
    Ok(Json(found))
}
