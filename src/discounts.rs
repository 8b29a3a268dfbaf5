//! Discounts

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    /// Discount values can't be negative.
    #[error("discount value must not be negative, got {0}")]
    NegativeValue(Decimal),

    /// Percentages are limited to `0..=100`.
    #[error("percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// The discount couldn't be represented.
    #[error("discount calculation overflowed")]
    Overflow,
}

/// A reduction of the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Discount {
    /// Take this percentage (`0..=100`) off the subtotal.
    Percentage(Decimal),

    /// Take this amount off the subtotal, never more than the subtotal itself.
    Fixed(Decimal),
}

impl Discount {
    /// A percentage discount.
    ///
    /// # Errors
    ///
    /// Returns an error if `percent` is outside `0..=100`.
    pub fn percentage(percent: Decimal) -> Result<Self, DiscountError> {
        Self::Percentage(percent).validated()
    }

    /// A fixed amount discount.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is negative.
    pub fn fixed(amount: Decimal) -> Result<Self, DiscountError> {
        Self::Fixed(amount).validated()
    }

    /// Check the value is in range, e.g. after deserializing.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or a percentage is above 100.
    pub fn validated(self) -> Result<Self, DiscountError> {
        match self {
            Self::Percentage(percent) | Self::Fixed(percent) if percent.is_sign_negative() => {
                Err(DiscountError::NegativeValue(percent))
            }
            Self::Percentage(percent) if percent > Decimal::ONE_HUNDRED => {
                Err(DiscountError::PercentageOutOfRange(percent))
            }
            _ => Ok(self),
        }
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage(percent) => write!(f, "{}% off", percent.normalize()),
            Self::Fixed(amount) => write!(f, "{} off", amount.normalize()),
        }
    }
}

/// Calculates the amount `discount` takes off `subtotal`.
///
/// The result is rounded to cents and never exceeds the subtotal.
///
/// # Errors
///
/// Returns an error if the discount is out of range or the calculation overflows.
pub fn calculate_discount(discount: &Discount, subtotal: Decimal) -> Result<Decimal, DiscountError> {
    let subtotal = subtotal.max(Decimal::ZERO);

    let amount = match discount.validated()? {
        Discount::Percentage(percent) => subtotal
            .checked_mul(percent)
            .and_then(|applied| applied.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(DiscountError::Overflow)?,
        Discount::Fixed(amount) => amount,
    };

    Ok(amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .min(subtotal))
}
