use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Cart, CartItem, DiscountType, PromoCode};

/// Calculator for cart totals and promo code discounts
///
/// All arithmetic is exact decimal; monetary results are rounded to
/// 2 decimal places with half-up rounding where a scale is required.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Subtotal of a single line item (unit price times quantity)
    pub fn line_subtotal(item: &CartItem) -> Decimal {
        item.unit_price * Decimal::from(item.quantity)
    }

    /// Total value of a cart
    ///
    /// Sums `unit_price * quantity` over all line items. An empty cart
    /// totals zero.
    pub fn cart_total(cart: &Cart) -> Decimal {
        cart.items.iter().map(Self::line_subtotal).sum()
    }

    /// Discount a promo code grants against a cart
    ///
    /// # Arguments
    /// * `cart` - Cart whose line items are discounted
    /// * `promo` - Promo code to apply, if any
    /// * `require_active` - When true, an inactive promo grants nothing
    ///
    /// # Returns
    /// A discount in `[0, eligible subtotal]`. A missing promo, an
    /// inactive promo under `require_active`, or an eligible subtotal of
    /// zero all yield zero rather than an error.
    pub fn promo_discount(
        cart: &Cart,
        promo: Option<&PromoCode>,
        require_active: bool,
    ) -> Decimal {
        let promo = match promo {
            Some(promo) => promo,
            None => return Decimal::ZERO,
        };
        if require_active && !promo.active {
            return Decimal::ZERO;
        }

        let eligible_subtotal: Decimal = cart
            .items
            .iter()
            .filter(|item| Self::promo_applies(promo, item))
            .map(Self::line_subtotal)
            .sum();

        if eligible_subtotal <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        match promo.discount_type {
            DiscountType::Percent => (eligible_subtotal * promo.discount_value
                / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            // A fixed discount can never exceed what it discounts
            DiscountType::Fixed => promo.discount_value.min(eligible_subtotal),
        }
    }

    /// Whether a promo code's category filter covers a line item
    ///
    /// A blank or absent filter covers everything; otherwise the item's
    /// snapshot category must match case-insensitively.
    pub fn promo_applies(promo: &PromoCode, item: &CartItem) -> bool {
        let filter = match promo.applicable_category.as_deref() {
            Some(filter) if !filter.trim().is_empty() => filter,
            _ => return true,
        };
        match item.category.as_deref() {
            Some(category) => category.to_lowercase() == filter.to_lowercase(),
            None => false,
        }
    }
}
