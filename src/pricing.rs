//! Pricing

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};

/// Default checkout service fee.
pub const SERVICE_FEE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Breakdown of what the buyer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of price × quantity.
    pub subtotal: Decimal,

    /// Fee charged on non-empty carts.
    pub service_fee: Decimal,

    /// Coupon discount, at most the subtotal.
    pub discount: Decimal,

    /// `subtotal + service_fee - discount`.
    pub total: Decimal,
}

impl Totals {
    /// Work out the totals for a cart.
    ///
    /// `service_fee` only applies when `item_count` is non-zero, and
    /// `discount` is clamped to `0..=subtotal`. The total saturates at
    /// `Decimal::MAX`.
    #[must_use]
    pub fn compute(subtotal: Decimal, item_count: u32, service_fee: Decimal, discount: Decimal) -> Self {
        let service_fee = if item_count == 0 {
            Decimal::ZERO
        } else {
            service_fee
        };

        let discount = discount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO));

        Self {
            subtotal,
            service_fee,
            discount,
            total: subtotal.saturating_add(service_fee).saturating_sub(discount),
        }
    }
}

/// Price × quantity, saturating at `Decimal::MAX`.
#[must_use]
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price.saturating_mul(Decimal::from(quantity))
}

/// Price × quantity, or `None` if it doesn't fit in a `Decimal`.
#[must_use]
pub fn checked_line_total(price: Decimal, quantity: u32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// Sum of amounts, saturating at `Decimal::MAX`.
#[must_use]
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Format an amount as Brazilian reais, e.g. `R$80,00`.
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    Money::from_decimal(amount, iso::BRL).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_add_fee_and_subtract_discount() {
        let totals = Totals::compute(Decimal::from(200), 3, SERVICE_FEE, Decimal::from(20));

        assert_eq!(totals.service_fee, Decimal::from(15));
        assert_eq!(totals.discount, Decimal::from(20));
        assert_eq!(totals.total, Decimal::from(195));
    }

    #[test]
    fn empty_cart_has_no_fee() {
        let totals = Totals::compute(Decimal::ZERO, 0, SERVICE_FEE, Decimal::ZERO);

        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn discount_never_exceeds_subtotal() {
        let totals = Totals::compute(Decimal::from(30), 1, SERVICE_FEE, Decimal::from(50));

        assert_eq!(totals.discount, Decimal::from(30));
        assert_eq!(totals.total, Decimal::from(15));
    }

    #[test]
    fn line_total_multiplies() {
        assert_eq!(line_total(Decimal::new(8050, 2), 3), Decimal::new(24150, 2));
        assert_eq!(line_total(Decimal::from(100), 0), Decimal::ZERO);
    }

    #[test]
    fn oversized_amounts_saturate_instead_of_overflowing() {
        assert_eq!(checked_line_total(Decimal::MAX, 2), None);
        assert_eq!(line_total(Decimal::MAX, 2), Decimal::MAX);
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::ONE]), Decimal::MAX);

        let totals = Totals::compute(Decimal::MAX, 2, SERVICE_FEE, Decimal::ZERO);

        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn formats_reais() {
        let formatted = format_brl(Decimal::from(80));

        assert!(formatted.starts_with("R$"), "unexpected format: {formatted}");
        assert!(formatted.ends_with("80,00"), "unexpected format: {formatted}");
    }
}
