mod analytics;
mod db;
mod manage;
mod models;
mod search;
mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use analytics::{AnalyticsService, SnapshotRepository};
use manage::{
    CartItemRepository, CartRepository, CustomerRepository, ProductRepository,
    PromoCodeRepository,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        analytics::handlers::active_cart_totals,
        analytics::handlers::top_products,
        analytics::handlers::active_carts_per_customer,
        analytics::handlers::category_counts,
        analytics::handlers::final_totals_with_promo,
        analytics::handlers::unused_promos,
        analytics::handlers::promo_discount_summary,
        analytics::handlers::out_of_stock_products,
        analytics::handlers::weighted_efficiency,
    ),
    components(
        schemas(
            models::Customer,
            models::Product,
            models::Cart,
            models::CartItem,
            models::PromoCode,
            models::LoyaltyLevel,
            models::DiscountType,
            analytics::CartTotal,
            analytics::ProductAdditionCount,
            analytics::CustomerCartCount,
            analytics::CategoryQuantity,
            analytics::CartFinalTotal,
            analytics::PromoDiscountProjection,
            analytics::OutOfStockProduct,
            analytics::CartEfficiency,
        )
    ),
    tags(
        (name = "analytics", description = "Cart analytics and pricing reports")
    ),
    info(
        title = "Cart Analytics API",
        version = "1.0.0",
        description = "Back-office API for cart management and analytics reporting"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    customers: CustomerRepository,
    products: ProductRepository,
    carts: CartRepository,
    cart_items: CartItemRepository,
    promos: PromoCodeRepository,
    analytics: AnalyticsService,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let state = AppState {
        customers: CustomerRepository::new(db.clone()),
        products: ProductRepository::new(db.clone()),
        carts: CartRepository::new(db.clone()),
        cart_items: CartItemRepository::new(db.clone()),
        promos: PromoCodeRepository::new(db.clone()),
        analytics: AnalyticsService::new(SnapshotRepository::new(db)),
    };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Customer management
        .route("/api/customers", post(manage::handlers::create_customer))
        .route("/api/customers", get(manage::handlers::search_customers))
        .route("/api/customers/:id", put(manage::handlers::update_customer))
        .route("/api/customers/:id", delete(manage::handlers::delete_customer))
        // Product management
        .route("/api/products", post(manage::handlers::create_product))
        .route("/api/products", get(manage::handlers::search_products))
        .route("/api/products/:id", put(manage::handlers::update_product))
        .route("/api/products/:id", delete(manage::handlers::delete_product))
        // Cart management
        .route("/api/carts", post(manage::handlers::create_cart))
        .route("/api/carts", get(manage::handlers::search_carts))
        .route("/api/carts/:id", put(manage::handlers::update_cart))
        .route("/api/carts/:id", delete(manage::handlers::delete_cart))
        // Cart item management
        .route("/api/cart-items", post(manage::handlers::create_cart_item))
        .route("/api/cart-items", get(manage::handlers::search_cart_items))
        .route("/api/cart-items/:id", put(manage::handlers::update_cart_item))
        .route("/api/cart-items/:id", delete(manage::handlers::delete_cart_item))
        // Promo code management
        .route("/api/promo-codes", post(manage::handlers::create_promo))
        .route("/api/promo-codes", get(manage::handlers::search_promos))
        .route("/api/promo-codes/:code", put(manage::handlers::update_promo))
        .route("/api/promo-codes/:code", delete(manage::handlers::delete_promo))
        // Analytics reports
        .route("/api/analytics/active-cart-totals", get(analytics::handlers::active_cart_totals))
        .route("/api/analytics/top-products", get(analytics::handlers::top_products))
        .route("/api/analytics/active-carts-per-customer", get(analytics::handlers::active_carts_per_customer))
        .route("/api/analytics/category-counts", get(analytics::handlers::category_counts))
        .route("/api/analytics/final-totals-with-promo", get(analytics::handlers::final_totals_with_promo))
        .route("/api/analytics/unused-promos", get(analytics::handlers::unused_promos))
        .route("/api/analytics/promo-discount-summary", get(analytics::handlers::promo_discount_summary))
        .route("/api/analytics/out-of-stock-products", get(analytics::handlers::out_of_stock_products))
        .route("/api/analytics/weighted-efficiency", get(analytics::handlers::weighted_efficiency))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Cart Analytics API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Cart Analytics API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
