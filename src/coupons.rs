//! Coupons
//!
//! A small static table of promotional codes. Codes are matched after
//! trimming and upper-casing; there's no partial matching.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::discounts::{Discount, DiscountError, calculate_discount};

/// Coupon lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// No coupon has this code.
    #[error("invalid coupon code: {0}")]
    Invalid(String),

    /// The coupon's discount couldn't be applied.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// A coupon that matched, and what it's worth against a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedCoupon<'a> {
    /// Normalized code.
    pub code: &'a str,

    /// The coupon's rule.
    pub discount: Discount,

    /// Amount taken off the subtotal.
    pub amount: Decimal,
}

/// The coupon table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponBook {
    coupons: FxHashMap<String, Discount>,
}

impl CouponBook {
    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            coupons: FxHashMap::default(),
        }
    }

    /// Add (or replace) a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount value is out of range.
    pub fn insert(&mut self, code: &str, discount: Discount) -> Result<&mut Self, CouponError> {
        self.coupons.insert(normalize(code), discount.validated()?);

        Ok(self)
    }

    /// Look up a coupon by code.
    pub fn get(&self, code: &str) -> Option<Discount> {
        self.coupons.get(&normalize(code)).copied()
    }

    /// Number of coupons.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether there are no coupons.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Codes in alphabetical order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.coupons.keys().map(String::as_str).collect();

        codes.sort_unstable();

        codes
    }

    /// Discount that `code` grants on `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Invalid`] for unknown codes.
    pub fn evaluate(&self, code: &str, subtotal: Decimal) -> Result<Decimal, CouponError> {
        self.apply(code, subtotal).map(|applied| applied.amount)
    }

    /// Like [`CouponBook::evaluate`], keeping the matched coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Invalid`] for unknown codes.
    pub fn apply(&self, code: &str, subtotal: Decimal) -> Result<AppliedCoupon<'_>, CouponError> {
        let normalized = normalize(code);

        let Some((code, discount)) = self.coupons.get_key_value(&normalized) else {
            debug!(code = %normalized, "unknown coupon");

            return Err(CouponError::Invalid(normalized));
        };

        let amount = calculate_discount(discount, subtotal)?;

        Ok(AppliedCoupon {
            code,
            discount: *discount,
            amount,
        })
    }
}

impl Default for CouponBook {
    /// `WELCOME10` (10%), `SUMMER20` (20%) and `LUXE50` (50 off).
    fn default() -> Self {
        let coupons = [
            ("WELCOME10", Discount::Percentage(Decimal::from(10))),
            ("SUMMER20", Discount::Percentage(Decimal::from(20))),
            ("LUXE50", Discount::Fixed(Decimal::from(50))),
        ]
        .into_iter()
        .map(|(code, discount)| (code.to_string(), discount))
        .collect();

        Self { coupons }
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn welcome10_on_200_is_20() -> TestResult {
        let book = CouponBook::default();

        assert_eq!(book.evaluate("WELCOME10", Decimal::from(200))?, Decimal::from(20));

        Ok(())
    }

    #[test]
    fn fixed_coupon_is_capped_at_subtotal() -> TestResult {
        let book = CouponBook::default();

        assert_eq!(book.evaluate("LUXE50", Decimal::from(30))?, Decimal::from(30));

        Ok(())
    }

    #[test]
    fn codes_are_trimmed_and_case_insensitive() -> TestResult {
        let book = CouponBook::default();

        let applied = book.apply("  summer20 ", Decimal::from(100))?;

        assert_eq!(applied.code, "SUMMER20");
        assert_eq!(applied.amount, Decimal::from(20));

        Ok(())
    }

    #[test]
    fn unknown_and_partial_codes_are_invalid() {
        let book = CouponBook::default();

        assert_eq!(
            book.evaluate("WELCOME", Decimal::from(100)),
            Err(CouponError::Invalid("WELCOME".to_string()))
        );
        assert!(book.evaluate("", Decimal::from(100)).is_err());
    }

    #[test]
    fn insert_rejects_out_of_range_discounts() -> TestResult {
        let mut book = CouponBook::empty();

        book.insert("half", Discount::Percentage(Decimal::from(50)))?;

        let result = book.insert("free", Discount::Percentage(Decimal::from(120)));

        assert!(
            matches!(result, Err(CouponError::Discount(_))),
            "expected Discount error, got {result:?}"
        );
        assert_eq!(book.codes(), vec!["HALF"]);

        Ok(())
    }
}
