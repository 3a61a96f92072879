// Generic predicate-based search over full entity collections.
//
// Filters are evaluated in memory against the snapshot the repositories
// return. Parsing is lenient: a filter value that does not parse is
// ignored rather than rejected, so a search never fails on bad input.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Cart, CartItem, Customer, DiscountType, LoyaltyLevel, Product, PromoCode};

/// Query parameters for customer search
#[derive(Debug, Default, Deserialize)]
pub struct CustomerSearchParams {
    /// Substring match on email (case-insensitive)
    pub email: Option<String>,
    /// Exact loyalty level
    pub loyalty_level: Option<String>,
    /// Inclusive lower bound on registration date (YYYY-MM-DD)
    pub registered_from: Option<String>,
    /// Inclusive upper bound on registration date (YYYY-MM-DD)
    pub registered_to: Option<String>,
}

/// Query parameters for product search
#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchParams {
    pub name: Option<String>,
    pub category: Option<String>,
    pub in_stock: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Query parameters for cart search
#[derive(Debug, Default, Deserialize)]
pub struct CartSearchParams {
    pub customer_id: Option<String>,
    pub active: Option<String>,
    pub promo_code: Option<String>,
}

/// Query parameters for cart item search
#[derive(Debug, Default, Deserialize)]
pub struct CartItemSearchParams {
    pub cart_id: Option<String>,
    pub product_id: Option<String>,
    pub min_quantity: Option<String>,
}

/// Query parameters for promo code search
#[derive(Debug, Default, Deserialize)]
pub struct PromoSearchParams {
    pub discount_type: Option<String>,
    pub active: Option<String>,
    pub category: Option<String>,
}

/// Filter customers by email substring, loyalty level, and registration
/// date range
pub fn filter_customers(
    mut customers: Vec<Customer>,
    params: &CustomerSearchParams,
) -> Vec<Customer> {
    let email = normalize_term(params.email.as_deref());
    let level = params
        .loyalty_level
        .as_deref()
        .and_then(|value| LoyaltyLevel::from_str(value.trim()).ok());
    let from = parse_date(params.registered_from.as_deref());
    let to = parse_date(params.registered_to.as_deref());

    customers.retain(|customer| {
        email
            .as_deref()
            .map_or(true, |needle| contains_ignore_case(&customer.email, needle))
            && level.map_or(true, |level| customer.loyalty_level == level)
            && within_date_range(customer.registration_date, from, to)
    });
    customers.sort_by_key(|customer| customer.customer_id);
    customers
}

/// Filter products by name/category substring, stock flag, and price range
pub fn filter_products(mut products: Vec<Product>, params: &ProductSearchParams) -> Vec<Product> {
    let name = normalize_term(params.name.as_deref());
    let category = normalize_term(params.category.as_deref());
    let in_stock = parse_bool(params.in_stock.as_deref());
    let min_price = parse_decimal(params.min_price.as_deref());
    let max_price = parse_decimal(params.max_price.as_deref());

    products.retain(|product| {
        name.as_deref()
            .map_or(true, |needle| contains_ignore_case(&product.name, needle))
            && category
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(&product.category, needle))
            && in_stock.map_or(true, |wanted| product.in_stock == wanted)
            && min_price.map_or(true, |min| product.base_price >= min)
            && max_price.map_or(true, |max| product.base_price <= max)
    });
    products.sort_by_key(|product| product.product_id);
    products
}

/// Filter carts by owning customer, active flag, and promo code substring
pub fn filter_carts(mut carts: Vec<Cart>, params: &CartSearchParams) -> Vec<Cart> {
    let customer_id = parse_i64(params.customer_id.as_deref());
    let active = parse_bool(params.active.as_deref());
    let promo_code = normalize_term(params.promo_code.as_deref());

    carts.retain(|cart| {
        customer_id.map_or(true, |id| cart.customer_id == Some(id))
            && active.map_or(true, |wanted| cart.active == wanted)
            && promo_code.as_deref().map_or(true, |needle| {
                cart.promo_code
                    .as_deref()
                    .map_or(false, |code| contains_ignore_case(code, needle))
            })
    });
    carts.sort_by_key(|cart| cart.cart_id);
    carts
}

/// Filter line items by cart, source product, and minimum quantity
pub fn filter_cart_items(
    mut items: Vec<CartItem>,
    params: &CartItemSearchParams,
) -> Vec<CartItem> {
    let cart_id = parse_i64(params.cart_id.as_deref());
    let product_id = parse_i64(params.product_id.as_deref());
    let min_quantity = parse_i32(params.min_quantity.as_deref());

    items.retain(|item| {
        cart_id.map_or(true, |id| item.cart_id == id)
            && product_id.map_or(true, |id| item.source_product_id == Some(id))
            && min_quantity.map_or(true, |min| item.quantity >= min)
    });
    items.sort_by_key(|item| item.cart_item_id);
    items
}

/// Filter promo codes by discount type, active flag, and category substring
pub fn filter_promos(mut promos: Vec<PromoCode>, params: &PromoSearchParams) -> Vec<PromoCode> {
    let discount_type = params
        .discount_type
        .as_deref()
        .and_then(|value| DiscountType::from_str(value.trim()).ok());
    let active = parse_bool(params.active.as_deref());
    let category = normalize_term(params.category.as_deref());

    promos.retain(|promo| {
        discount_type.map_or(true, |wanted| promo.discount_type == wanted)
            && active.map_or(true, |wanted| promo.active == wanted)
            && category.as_deref().map_or(true, |needle| {
                promo
                    .applicable_category
                    .as_deref()
                    .map_or(false, |cat| contains_ignore_case(cat, needle))
            })
    });
    promos.sort_by(|a, b| a.code.cmp(&b.code));
    promos
}

/// Trim a search term; blank collapses to None
fn normalize_term(value: Option<&str>) -> Option<String> {
    value.and_then(|term| {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    normalize_term(value).and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
}

fn parse_bool(value: Option<&str>) -> Option<bool> {
    match normalize_term(value)?.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_i64(value: Option<&str>) -> Option<i64> {
    normalize_term(value).and_then(|v| v.parse().ok())
}

fn parse_i32(value: Option<&str>) -> Option<i32> {
    normalize_term(value).and_then(|v| v.parse().ok())
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    normalize_term(value).and_then(|v| v.parse().ok())
}

fn within_date_range(value: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |from| value >= from) && to.map_or(true, |to| value <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn customer(customer_id: i64, email: &str, level: LoyaltyLevel, date: &str) -> Customer {
        Customer {
            customer_id,
            email: email.to_string(),
            registration_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            loyalty_level: level,
        }
    }

    fn product(product_id: i64, name: &str, category: &str, price: Decimal, in_stock: bool) -> Product {
        Product {
            product_id,
            name: name.to_string(),
            category: category.to_string(),
            base_price: price,
            in_stock,
        }
    }

    fn cart(cart_id: i64, customer_id: Option<i64>, active: bool, promo: Option<&str>) -> Cart {
        Cart {
            cart_id,
            customer_id,
            created_date: Utc::now(),
            active,
            promo_code: promo.map(|c| c.to_string()),
            items: vec![],
        }
    }

    #[test]
    fn test_filter_customers_by_email_and_level() {
        let customers = vec![
            customer(1, "alice@example.com", LoyaltyLevel::Gold, "2024-01-10"),
            customer(2, "bob@example.com", LoyaltyLevel::Bronze, "2024-02-20"),
            customer(3, "alicia@shop.io", LoyaltyLevel::Gold, "2024-03-05"),
        ];

        let params = CustomerSearchParams {
            email: Some("ALIC".to_string()),
            loyalty_level: Some("gold".to_string()),
            ..Default::default()
        };
        let found = filter_customers(customers, &params);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].customer_id, 1);
        assert_eq!(found[1].customer_id, 3);
    }

    #[test]
    fn test_filter_customers_by_date_range() {
        let customers = vec![
            customer(1, "a@x.com", LoyaltyLevel::Bronze, "2024-01-10"),
            customer(2, "b@x.com", LoyaltyLevel::Bronze, "2024-02-20"),
            customer(3, "c@x.com", LoyaltyLevel::Bronze, "2024-03-05"),
        ];

        let params = CustomerSearchParams {
            registered_from: Some("2024-02-01".to_string()),
            registered_to: Some("2024-02-28".to_string()),
            ..Default::default()
        };
        let found = filter_customers(customers, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].customer_id, 2);
    }

    #[test]
    fn test_unparseable_filters_are_ignored() {
        let customers = vec![customer(1, "a@x.com", LoyaltyLevel::Bronze, "2024-01-10")];
        let params = CustomerSearchParams {
            loyalty_level: Some("diamond".to_string()),
            registered_from: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_customers(customers, &params).len(), 1);
    }

    #[test]
    fn test_filter_products_by_price_range_and_stock() {
        let products = vec![
            product(1, "Mouse", "electronics", dec!(25.00), true),
            product(2, "Keyboard", "electronics", dec!(80.00), false),
            product(3, "Desk", "furniture", dec!(250.00), true),
        ];

        let params = ProductSearchParams {
            min_price: Some("20".to_string()),
            max_price: Some("100".to_string()),
            in_stock: Some("true".to_string()),
            ..Default::default()
        };
        let found = filter_products(products, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_id, 1);
    }

    #[test]
    fn test_filter_carts_by_customer_and_promo() {
        let carts = vec![
            cart(1, Some(1), true, Some("SAVE10")),
            cart(2, Some(1), false, None),
            cart(3, Some(2), true, Some("WELCOME")),
        ];

        let params = CartSearchParams {
            customer_id: Some("1".to_string()),
            promo_code: Some("save".to_string()),
            ..Default::default()
        };
        let found = filter_carts(carts, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].cart_id, 1);
    }

    #[test]
    fn test_filter_carts_without_promo_never_match_promo_term() {
        let carts = vec![cart(1, None, true, None)];
        let params = CartSearchParams {
            promo_code: Some("save".to_string()),
            ..Default::default()
        };
        assert!(filter_carts(carts, &params).is_empty());
    }

    #[test]
    fn test_filter_cart_items_by_min_quantity() {
        let item = |id: i64, cart_id: i64, qty: i32| CartItem {
            cart_item_id: id,
            cart_id,
            source_product_id: Some(1),
            name: "Item".to_string(),
            category: None,
            unit_price: dec!(1.00),
            in_stock: true,
            quantity: qty,
            added_date: Utc::now(),
        };
        let items = vec![item(1, 1, 1), item(2, 1, 5), item(3, 2, 10)];

        let params = CartItemSearchParams {
            cart_id: Some("1".to_string()),
            min_quantity: Some("2".to_string()),
            ..Default::default()
        };
        let found = filter_cart_items(items, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].cart_item_id, 2);
    }

    #[test]
    fn test_filter_promos_by_type_and_category() {
        let promo = |code: &str, dt: DiscountType, active: bool, category: Option<&str>| PromoCode {
            code: code.to_string(),
            discount_type: dt,
            discount_value: dec!(10),
            active,
            applicable_category: category.map(|c| c.to_string()),
        };
        let promos = vec![
            promo("A", DiscountType::Percent, true, Some("Electronics")),
            promo("B", DiscountType::Fixed, true, Some("electronics")),
            promo("C", DiscountType::Percent, false, None),
        ];

        let params = PromoSearchParams {
            discount_type: Some("percent".to_string()),
            category: Some("electro".to_string()),
            ..Default::default()
        };
        let found = filter_promos(promos, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "A");
    }
}
