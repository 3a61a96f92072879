// Aggregation passes for the cart analytics reports.
//
// Every function here is a single stateless pass over a snapshot slice:
// it builds its accumulators, produces an ordered result list, and holds
// nothing afterwards. Grouping uses a first-seen key order (a Vec of keys
// next to a HashMap of accumulators) so discovery order survives into the
// output wherever the report does not impose its own sort.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::analytics::models::{
    CartEfficiency, CartFinalTotal, CartTotal, CategoryQuantity, CustomerCartCount,
    OutOfStockProduct, ProductAdditionCount, PromoDiscountProjection,
};
use crate::analytics::pricing::PriceCalculator;
use crate::analytics::scoring::EfficiencyScorer;
use crate::models::{Cart, CartItem, Customer, PromoCode};

/// Number of entries the top-products report returns
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Grouping label for line items whose category is blank
pub const UNSPECIFIED_CATEGORY: &str = "UNSPECIFIED";

/// Normalize a category label for grouping: blank collapses to
/// `UNSPECIFIED`, everything else is kept as stored.
pub fn normalize_category(category: &str) -> &str {
    if category.trim().is_empty() {
        UNSPECIFIED_CATEGORY
    } else {
        category
    }
}

/// Total value of every cart in the given (active) snapshot
pub fn active_cart_totals(carts: &[Cart]) -> Vec<CartTotal> {
    carts
        .iter()
        .map(|cart| CartTotal {
            cart_id: cart.cart_id,
            total: PriceCalculator::cart_total(cart),
        })
        .collect()
}

/// Most-added products across all line items
///
/// Groups by source product id (items that no longer reference a product
/// are skipped), sums quantities, and keeps the first-seen snapshot name
/// per product. Sorted by summed quantity descending; ties keep discovery
/// order. At most [`TOP_PRODUCTS_LIMIT`] entries.
pub fn top_products_by_additions(items: &[CartItem]) -> Vec<ProductAdditionCount> {
    let mut seen_order: Vec<i64> = Vec::new();
    let mut names: HashMap<i64, String> = HashMap::new();
    let mut quantities: HashMap<i64, i64> = HashMap::new();

    for item in items {
        let product_id = match item.source_product_id {
            Some(product_id) => product_id,
            None => continue,
        };
        if !quantities.contains_key(&product_id) {
            seen_order.push(product_id);
            names.insert(product_id, item.name.clone());
        }
        *quantities.entry(product_id).or_insert(0) += i64::from(item.quantity);
    }

    let mut ranked: Vec<ProductAdditionCount> = seen_order
        .into_iter()
        .map(|product_id| ProductAdditionCount {
            product_id,
            name: names.remove(&product_id).unwrap_or_default(),
            total_quantity: quantities.get(&product_id).copied().unwrap_or(0),
        })
        .collect();

    // Stable sort keeps discovery order among equal quantities
    ranked.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    ranked.truncate(TOP_PRODUCTS_LIMIT);
    ranked
}

/// Active cart count per customer
///
/// Carts without an owning customer are excluded. The email shown is the
/// one attached to the customer record; customers appear in the order
/// their first cart was discovered.
pub fn active_cart_count_per_customer(
    active_carts: &[Cart],
    customers: &[Customer],
) -> Vec<CustomerCartCount> {
    let emails: HashMap<i64, &str> = customers
        .iter()
        .map(|customer| (customer.customer_id, customer.email.as_str()))
        .collect();

    let mut seen_order: Vec<i64> = Vec::new();
    let mut counts: HashMap<i64, i64> = HashMap::new();

    for cart in active_carts {
        let customer_id = match cart.customer_id {
            Some(customer_id) => customer_id,
            None => continue,
        };
        if !counts.contains_key(&customer_id) {
            seen_order.push(customer_id);
        }
        *counts.entry(customer_id).or_insert(0) += 1;
    }

    seen_order
        .into_iter()
        .map(|customer_id| CustomerCartCount {
            customer_id,
            email: emails
                .get(&customer_id)
                .map(|email| email.to_string())
                .unwrap_or_default(),
            active_carts: counts.get(&customer_id).copied().unwrap_or(0),
        })
        .collect()
}

/// Total quantity per normalized category
///
/// Line items with no category at all are excluded; a present-but-blank
/// category groups under [`UNSPECIFIED_CATEGORY`].
pub fn category_quantity_totals(items: &[CartItem]) -> Vec<CategoryQuantity> {
    let mut seen_order: Vec<String> = Vec::new();
    let mut quantities: HashMap<String, i64> = HashMap::new();

    for item in items {
        let category = match item.category.as_deref() {
            Some(category) => normalize_category(category),
            None => continue,
        };
        if !quantities.contains_key(category) {
            seen_order.push(category.to_string());
        }
        *quantities.entry(category.to_string()).or_insert(0) += i64::from(item.quantity);
    }

    seen_order
        .into_iter()
        .map(|category| {
            let total_quantity = quantities.get(&category).copied().unwrap_or(0);
            CategoryQuantity {
                category,
                total_quantity,
            }
        })
        .collect()
}

/// Final payable totals for carts that carry a promo code
///
/// The discount respects the promo's active flag; a code that resolves to
/// no known promo discounts nothing. Final totals clamp at zero.
pub fn final_totals_with_promo(carts: &[Cart], promos: &[PromoCode]) -> Vec<CartFinalTotal> {
    let by_code: HashMap<&str, &PromoCode> = promos
        .iter()
        .map(|promo| (promo.code.as_str(), promo))
        .collect();

    carts
        .iter()
        .filter_map(|cart| {
            let code = cart.promo_code.as_deref()?;
            if code.trim().is_empty() {
                return None;
            }
            let total = PriceCalculator::cart_total(cart);
            let discount =
                PriceCalculator::promo_discount(cart, by_code.get(code).copied(), true);
            Some(CartFinalTotal {
                cart_id: cart.cart_id,
                promo_code: code.to_string(),
                final_total: (total - discount).max(Decimal::ZERO),
            })
        })
        .collect()
}

/// Active promo codes that no cart has ever used
///
/// A code counts as used when it appears (non-blank) on any cart,
/// active or not; the comparison is case-sensitive.
pub fn unused_active_promos(active_promos: &[PromoCode], carts: &[Cart]) -> Vec<PromoCode> {
    let used_codes: HashSet<&str> = carts
        .iter()
        .filter_map(|cart| cart.promo_code.as_deref())
        .filter(|code| !code.trim().is_empty())
        .collect();

    active_promos
        .iter()
        .filter(|promo| !used_codes.contains(promo.code.as_str()))
        .cloned()
        .collect()
}

/// Projected total discount per promo code if every cart used it
///
/// A what-if projection: each promo (active or not) is applied to every
/// cart regardless of the cart's actually assigned code, with the promo's
/// own active flag ignored.
pub fn promo_discount_if_applied(
    promos: &[PromoCode],
    carts: &[Cart],
) -> Vec<PromoDiscountProjection> {
    promos
        .iter()
        .map(|promo| {
            let total_discount = carts
                .iter()
                .map(|cart| PriceCalculator::promo_discount(cart, Some(promo), false))
                .sum();
            PromoDiscountProjection {
                code: promo.code.clone(),
                total_discount,
            }
        })
        .collect()
}

/// Products present in carts whose snapshot was taken while out of stock
///
/// Judged from the line item's frozen stock flag, not the live product
/// record. Deduplicated by source product id, first occurrence wins.
pub fn out_of_stock_products_in_carts(items: &[CartItem]) -> Vec<OutOfStockProduct> {
    let mut seen: HashSet<i64> = HashSet::new();

    items
        .iter()
        .filter(|item| !item.in_stock)
        .filter_map(|item| {
            let product_id = item.source_product_id?;
            if !seen.insert(product_id) {
                return None;
            }
            Some(OutOfStockProduct {
                product_id,
                name: item.name.clone(),
                category: item.category.clone(),
                unit_price: item.unit_price,
            })
        })
        .collect()
}

/// Weighted efficiency score per cart, sorted by score descending
///
/// Each cart's total value, item count, and distinct product count are
/// min-max normalized against the snapshot maxima and blended by
/// [`EfficiencyScorer::weighted_score`]. An empty snapshot yields an
/// empty result. Equal scores keep snapshot order (the sort is stable).
pub fn cart_efficiency_scores(carts: &[Cart]) -> Vec<CartEfficiency> {
    if carts.is_empty() {
        return Vec::new();
    }

    struct CartMetrics {
        cart_id: i64,
        total: Decimal,
        item_count: i64,
        distinct_products: i64,
    }

    let metrics: Vec<CartMetrics> = carts
        .iter()
        .map(|cart| {
            let distinct_products = cart
                .items
                .iter()
                .filter_map(|item| item.source_product_id)
                .collect::<HashSet<i64>>()
                .len() as i64;
            CartMetrics {
                cart_id: cart.cart_id,
                total: PriceCalculator::cart_total(cart),
                item_count: cart
                    .items
                    .iter()
                    .map(|item| i64::from(item.quantity))
                    .sum(),
                distinct_products,
            }
        })
        .collect();

    let max_total = metrics
        .iter()
        .map(|m| m.total)
        .max()
        .unwrap_or(Decimal::ZERO);
    let max_items = metrics.iter().map(|m| m.item_count).max().unwrap_or(0);
    let max_distinct = metrics
        .iter()
        .map(|m| m.distinct_products)
        .max()
        .unwrap_or(0);

    let mut scored: Vec<CartEfficiency> = metrics
        .into_iter()
        .map(|m| {
            let total_norm = EfficiencyScorer::normalize(m.total, max_total);
            let item_norm =
                EfficiencyScorer::normalize(Decimal::from(m.item_count), Decimal::from(max_items));
            let distinct_norm = EfficiencyScorer::normalize(
                Decimal::from(m.distinct_products),
                Decimal::from(max_distinct),
            );
            CartEfficiency {
                cart_id: m.cart_id,
                total: m.total,
                item_count: m.item_count,
                distinct_products: m.distinct_products,
                score: EfficiencyScorer::weighted_score(total_norm, item_norm, distinct_norm),
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::models::{DiscountType, LoyaltyLevel};

    fn item(
        cart_id: i64,
        source_product_id: Option<i64>,
        name: &str,
        category: Option<&str>,
        unit_price: Decimal,
        in_stock: bool,
        quantity: i32,
    ) -> CartItem {
        CartItem {
            cart_item_id: 0,
            cart_id,
            source_product_id,
            name: name.to_string(),
            category: category.map(|c| c.to_string()),
            unit_price,
            in_stock,
            quantity,
            added_date: Utc::now(),
        }
    }

    fn cart(
        cart_id: i64,
        customer_id: Option<i64>,
        active: bool,
        promo_code: Option<&str>,
        items: Vec<CartItem>,
    ) -> Cart {
        Cart {
            cart_id,
            customer_id,
            created_date: Utc::now(),
            active,
            promo_code: promo_code.map(|c| c.to_string()),
            items,
        }
    }

    fn promo(
        code: &str,
        discount_type: DiscountType,
        discount_value: Decimal,
        active: bool,
        applicable_category: Option<&str>,
    ) -> PromoCode {
        PromoCode {
            code: code.to_string(),
            discount_type,
            discount_value,
            active,
            applicable_category: applicable_category.map(|c| c.to_string()),
        }
    }

    fn customer(customer_id: i64, email: &str) -> Customer {
        Customer {
            customer_id,
            email: email.to_string(),
            registration_date: Utc::now().date_naive(),
            loyalty_level: LoyaltyLevel::Bronze,
        }
    }

    #[test]
    fn test_active_cart_totals() {
        let carts = vec![
            cart(1, None, true, None, vec![item(1, Some(1), "A", None, dec!(10.00), true, 2)]),
            cart(2, None, true, None, vec![]),
        ];

        let totals = active_cart_totals(&carts);
        assert_eq!(
            totals,
            vec![
                CartTotal { cart_id: 1, total: dec!(20.00) },
                CartTotal { cart_id: 2, total: Decimal::ZERO },
            ]
        );
    }

    #[test]
    fn test_top_products_sorted_desc_capped_at_five() {
        let items: Vec<CartItem> = (1..=7)
            .map(|product_id| {
                item(
                    1,
                    Some(product_id),
                    &format!("Product {}", product_id),
                    None,
                    dec!(1.00),
                    true,
                    product_id as i32,
                )
            })
            .collect();

        let top = top_products_by_additions(&items);
        assert_eq!(top.len(), TOP_PRODUCTS_LIMIT);
        assert_eq!(top[0].product_id, 7);
        assert_eq!(top[0].total_quantity, 7);
        assert_eq!(top[4].product_id, 3);
        assert!(top.windows(2).all(|w| w[0].total_quantity >= w[1].total_quantity));
    }

    #[test]
    fn test_top_products_ties_keep_discovery_order_and_first_name_wins() {
        let items = vec![
            item(1, Some(10), "First Name", None, dec!(1.00), true, 3),
            item(1, Some(20), "Other", None, dec!(1.00), true, 3),
            item(2, Some(10), "Renamed Later", None, dec!(1.00), true, 1),
            item(2, None, "Orphaned", None, dec!(1.00), true, 99),
        ];

        let top = top_products_by_additions(&items);
        assert_eq!(top.len(), 2);
        // Product 10 totals 4; product 20 totals 3
        assert_eq!(top[0].product_id, 10);
        assert_eq!(top[0].name, "First Name");
        assert_eq!(top[0].total_quantity, 4);
        assert_eq!(top[1].product_id, 20);

        // Equal quantities keep discovery order
        let tied = vec![
            item(1, Some(1), "A", None, dec!(1.00), true, 5),
            item(1, Some(2), "B", None, dec!(1.00), true, 5),
        ];
        let top = top_products_by_additions(&tied);
        assert_eq!(top[0].product_id, 1);
        assert_eq!(top[1].product_id, 2);
    }

    #[test]
    fn test_active_cart_count_per_customer_excludes_anonymous() {
        let carts = vec![
            cart(1, Some(1), true, None, vec![]),
            cart(2, Some(2), true, None, vec![]),
            cart(3, Some(1), true, None, vec![]),
            cart(4, None, true, None, vec![]),
        ];
        let customers = vec![customer(1, "alice@example.com"), customer(2, "bob@example.com")];

        let counts = active_cart_count_per_customer(&carts, &customers);
        assert_eq!(
            counts,
            vec![
                CustomerCartCount {
                    customer_id: 1,
                    email: "alice@example.com".to_string(),
                    active_carts: 2,
                },
                CustomerCartCount {
                    customer_id: 2,
                    email: "bob@example.com".to_string(),
                    active_carts: 1,
                },
            ]
        );
    }

    #[test]
    fn test_category_totals_normalize_blank_and_skip_missing() {
        let items = vec![
            item(1, Some(1), "A", Some("electronics"), dec!(1.00), true, 2),
            item(1, Some(2), "B", Some(""), dec!(1.00), true, 3),
            item(1, Some(3), "C", None, dec!(1.00), true, 100),
            item(2, Some(4), "D", Some("electronics"), dec!(1.00), true, 1),
        ];

        let totals = category_quantity_totals(&items);
        assert_eq!(
            totals,
            vec![
                CategoryQuantity {
                    category: "electronics".to_string(),
                    total_quantity: 3,
                },
                CategoryQuantity {
                    category: UNSPECIFIED_CATEGORY.to_string(),
                    total_quantity: 3,
                },
            ]
        );
    }

    #[test]
    fn test_final_totals_with_promo_end_to_end() {
        // One active percent promo and a cart totalling 125.00:
        // discount 12.50, final 112.50
        let carts = vec![cart(
            1,
            Some(1),
            true,
            Some("SAVE10"),
            vec![
                item(1, Some(1), "A", None, dec!(50.00), true, 2),
                item(1, Some(2), "B", None, dec!(25.00), true, 1),
            ],
        )];
        let promos = vec![promo("SAVE10", DiscountType::Percent, dec!(10), true, None)];

        let finals = final_totals_with_promo(&carts, &promos);
        assert_eq!(
            finals,
            vec![CartFinalTotal {
                cart_id: 1,
                promo_code: "SAVE10".to_string(),
                final_total: dec!(112.50),
            }]
        );
    }

    #[test]
    fn test_final_totals_promo_lookup_miss_discounts_nothing() {
        let carts = vec![cart(
            1,
            None,
            true,
            Some("GHOST"),
            vec![item(1, Some(1), "A", None, dec!(40.00), true, 1)],
        )];

        let finals = final_totals_with_promo(&carts, &[]);
        assert_eq!(finals[0].final_total, dec!(40.00));
    }

    #[test]
    fn test_final_totals_skip_carts_without_promo() {
        let carts = vec![
            cart(1, None, true, None, vec![]),
            cart(2, None, true, Some("   "), vec![]),
        ];
        assert!(final_totals_with_promo(&carts, &[]).is_empty());
    }

    #[test]
    fn test_final_total_clamps_at_zero() {
        let carts = vec![cart(
            1,
            None,
            true,
            Some("BIG"),
            vec![item(1, Some(1), "A", None, dec!(10.00), true, 1)],
        )];
        let promos = vec![promo("BIG", DiscountType::Fixed, dec!(999), true, None)];

        let finals = final_totals_with_promo(&carts, &promos);
        assert_eq!(finals[0].final_total, dec!(0.00));
    }

    #[test]
    fn test_unused_active_promos_case_sensitive() {
        let carts = vec![
            cart(1, None, false, Some("save10"), vec![]),
            cart(2, None, true, Some("WELCOME"), vec![]),
        ];
        let active_promos = vec![
            promo("SAVE10", DiscountType::Percent, dec!(10), true, None),
            promo("WELCOME", DiscountType::Fixed, dec!(5), true, None),
        ];

        // "save10" on a cart does not count as usage of "SAVE10";
        // usage on an inactive cart still counts
        let unused = unused_active_promos(&active_promos, &carts);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].code, "SAVE10");
    }

    #[test]
    fn test_promo_discount_if_applied_ignores_active_flags_and_assignment() {
        let carts = vec![
            cart(
                1,
                None,
                true,
                Some("OTHER"),
                vec![item(1, Some(1), "A", None, dec!(100.00), true, 1)],
            ),
            cart(
                2,
                None,
                false,
                None,
                vec![item(2, Some(2), "B", None, dec!(50.00), true, 2)],
            ),
        ];
        let promos = vec![
            promo("INACTIVE10", DiscountType::Percent, dec!(10), false, None),
            promo("FLAT30", DiscountType::Fixed, dec!(30), true, None),
        ];

        let projections = promo_discount_if_applied(&promos, &carts);
        assert_eq!(
            projections,
            vec![
                // 10% of 100.00 + 10% of 100.00, despite being inactive
                // and assigned to neither cart
                PromoDiscountProjection {
                    code: "INACTIVE10".to_string(),
                    total_discount: dec!(20.00),
                },
                PromoDiscountProjection {
                    code: "FLAT30".to_string(),
                    total_discount: dec!(60.00),
                },
            ]
        );
    }

    #[test]
    fn test_out_of_stock_dedupes_by_first_occurrence() {
        let items = vec![
            item(1, Some(1), "Lamp", Some("home"), dec!(20.00), false, 1),
            item(2, Some(1), "Lamp (renamed)", Some("home"), dec!(22.00), false, 1),
            item(1, Some(2), "Mouse", None, dec!(30.00), true, 1),
            item(1, None, "Orphan", None, dec!(5.00), false, 1),
        ];

        let products = out_of_stock_products_in_carts(&items);
        assert_eq!(
            products,
            vec![OutOfStockProduct {
                product_id: 1,
                name: "Lamp".to_string(),
                category: Some("home".to_string()),
                unit_price: dec!(20.00),
            }]
        );
    }

    #[test]
    fn test_efficiency_empty_snapshot_is_empty() {
        assert!(cart_efficiency_scores(&[]).is_empty());
    }

    #[test]
    fn test_efficiency_max_cart_scores_100() {
        let carts = vec![
            cart(
                1,
                None,
                true,
                None,
                vec![
                    item(1, Some(1), "A", None, dec!(50.00), true, 2),
                    item(1, Some(2), "B", None, dec!(25.00), true, 1),
                ],
            ),
            cart(
                2,
                None,
                true,
                None,
                vec![item(2, Some(1), "A", None, dec!(10.00), true, 1)],
            ),
        ];

        let scores = cart_efficiency_scores(&carts);
        assert_eq!(scores[0].cart_id, 1);
        assert_eq!(scores[0].score, dec!(100.00));
        assert_eq!(scores[0].total, dec!(125.00));
        assert_eq!(scores[0].item_count, 3);
        assert_eq!(scores[0].distinct_products, 2);

        for entry in &scores {
            assert!(entry.score >= Decimal::ZERO && entry.score <= dec!(100.00));
        }
    }

    #[test]
    fn test_efficiency_sorted_descending() {
        let carts = vec![
            cart(1, None, true, None, vec![item(1, Some(1), "A", None, dec!(5.00), true, 1)]),
            cart(2, None, true, None, vec![item(2, Some(1), "A", None, dec!(50.00), true, 4)]),
            cart(3, None, true, None, vec![item(3, Some(1), "A", None, dec!(20.00), true, 2)]),
        ];

        let scores = cart_efficiency_scores(&carts);
        assert_eq!(scores[0].cart_id, 2);
        assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_efficiency_all_empty_carts_score_zero() {
        // Zero maxima must not divide; they normalize to zero instead
        let carts = vec![cart(1, None, true, None, vec![]), cart(2, None, true, None, vec![])];

        let scores = cart_efficiency_scores(&carts);
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|entry| entry.score == dec!(0.00)));
    }

    #[test]
    fn test_efficiency_distinct_counts_ignore_orphaned_items() {
        let carts = vec![cart(
            1,
            None,
            true,
            None,
            vec![
                item(1, Some(1), "A", None, dec!(1.00), true, 1),
                item(1, Some(1), "A", None, dec!(1.00), true, 1),
                item(1, None, "Orphan", None, dec!(1.00), true, 1),
            ],
        )];

        let scores = cart_efficiency_scores(&carts);
        assert_eq!(scores[0].distinct_products, 1);
        assert_eq!(scores[0].item_count, 3);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("electronics"), "electronics");
        assert_eq!(normalize_category(""), UNSPECIFIED_CATEGORY);
        assert_eq!(normalize_category("   "), UNSPECIFIED_CATEGORY);
    }
}
