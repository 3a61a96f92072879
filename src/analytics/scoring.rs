use rust_decimal::{Decimal, RoundingStrategy};

/// Min-max normalizer and weighted composite scorer for the cart
/// efficiency report
///
/// Weights are fixed: 0.5 for total value, 0.3 for item count, 0.2 for
/// distinct products. They sum to exactly 1, so a cart holding every
/// snapshot maximum scores exactly 100.00.
pub struct EfficiencyScorer;

impl EfficiencyScorer {
    /// Scale a metric by the maximum observed in the snapshot
    ///
    /// Returns `value / max` at 4 decimal places, half-up. A maximum of
    /// zero (or less) normalizes to zero instead of dividing.
    pub fn normalize(value: Decimal, max: Decimal) -> Decimal {
        if max <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (value / max).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Blend the three normalized metrics into a 0-100 score
    ///
    /// Score = (0.5 * total + 0.3 * items + 0.2 * distinct) * 100,
    /// rounded to 2 decimal places, half-up.
    pub fn weighted_score(
        total_norm: Decimal,
        item_norm: Decimal,
        distinct_norm: Decimal,
    ) -> Decimal {
        let weight_total = Decimal::new(5, 1);
        let weight_items = Decimal::new(3, 1);
        let weight_distinct = Decimal::new(2, 1);

        ((total_norm * weight_total
            + item_norm * weight_items
            + distinct_norm * weight_distinct)
            * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
