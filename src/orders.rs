//! Orders
//!
//! Immutable records of completed checkouts, kept in each member's purchase
//! history.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::CartLineItem, pricing::saturating_sum};

/// Order number, e.g. `LUXE-4821337-42`.
///
/// Built from the last seven digits of the creation time in milliseconds
/// and a random suffix below 1000, so two orders placed in the same
/// millisecond can collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate an order number for an order placed at `now`.
    pub fn generate<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> Self {
        let millis = now.as_millisecond().rem_euclid(10_000_000);
        let suffix: u16 = rng.gen_range(0..1000);

        Self(format!("LUXE-{millis:07}-{suffix}"))
    }

    /// The order number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Paid and issued.
    Confirmed,

    /// Awaiting payment.
    Pending,

    /// Called off.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        })
    }
}

/// How the buyer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit card.
    Credit,

    /// Bank slip.
    Boleto,

    /// Instant transfer.
    Pix,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [Self; 3] = [Self::Credit, Self::Boleto, Self::Pix];

    /// Lower-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Boleto => "boleto",
            Self::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised payment method name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPaymentMethod(s.to_string()))
    }
}

/// What checkout knows about a purchase besides the line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetails {
    /// How the buyer paid.
    pub payment_method: PaymentMethod,

    /// Buyer name.
    pub name: String,

    /// Buyer e-mail.
    pub email: String,

    /// Buyer phone.
    pub phone: String,

    /// Service fee charged.
    pub service_fee: Decimal,

    /// Coupon discount granted.
    pub discount: Decimal,
}

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order number.
    pub id: OrderId,

    /// When the order was placed.
    pub date: Timestamp,

    /// The cart lines as they were at checkout.
    pub items: Vec<CartLineItem>,

    /// Sum of price × quantity, before fee and discount.
    pub total: Decimal,

    /// Service fee charged on top of `total`.
    #[serde(default)]
    pub service_fee: Decimal,

    /// Discount taken off `total`.
    #[serde(default)]
    pub discount: Decimal,

    /// How the buyer paid.
    pub payment_method: PaymentMethod,

    /// Lifecycle status.
    pub status: OrderStatus,
}

impl Order {
    /// A confirmed order for `items`.
    #[must_use]
    pub fn confirmed(
        id: OrderId,
        date: Timestamp,
        items: Vec<CartLineItem>,
        details: &PurchaseDetails,
    ) -> Self {
        let total = saturating_sum(items.iter().map(CartLineItem::line_total));

        Self {
            id,
            date,
            items,
            total,
            service_fee: details.service_fee,
            discount: details.discount,
            payment_method: details.payment_method,
            status: OrderStatus::Confirmed,
        }
    }

    /// What the buyer actually paid.
    pub fn amount_paid(&self) -> Decimal {
        self.total
            .saturating_add(self.service_fee)
            .saturating_sub(self.discount)
    }

    /// Number of tickets in the order.
    pub fn ticket_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;
    use crate::cart::{LineItemId, NewLineItem};

    fn line(price: i64, quantity: u32) -> CartLineItem {
        CartLineItem::new(
            LineItemId::now_v7(),
            NewLineItem {
                event_id: 1,
                event_title: "Neon Dreams".to_string(),
                event_date: "12 May, 2025".to_string(),
                event_time: "22:00 - 05:00".to_string(),
                event_image: "/assets/images/event1.jpg".to_string(),
                ticket_type: "VIP".to_string(),
                price: Decimal::from(price),
                quantity,
            },
        )
    }

    fn details() -> PurchaseDetails {
        PurchaseDetails {
            payment_method: PaymentMethod::Pix,
            name: "Ana Souza".to_string(),
            email: "ana@luxe.com".to_string(),
            phone: "11999990000".to_string(),
            service_fee: Decimal::from(15),
            discount: Decimal::from(20),
        }
    }

    #[test]
    fn order_id_uses_last_seven_millisecond_digits() -> TestResult {
        let now = Timestamp::from_millisecond(1_747_000_123_456)?;
        let mut rng = StdRng::seed_from_u64(7);

        let id = OrderId::generate(now, &mut rng);

        let parts: Vec<&str> = id.as_str().split('-').collect();

        assert_eq!(parts.first(), Some(&"LUXE"));
        assert_eq!(parts.get(1), Some(&"0123456"));
        assert!(
            parts.get(2).and_then(|s| s.parse::<u16>().ok()).is_some_and(|n| n < 1000),
            "unexpected suffix in {id}"
        );

        Ok(())
    }

    #[test]
    fn confirmed_order_total_excludes_fee_and_discount() {
        let order = Order::confirmed(
            OrderId::from("LUXE-0000001-1"),
            Timestamp::UNIX_EPOCH,
            vec![line(100, 3), line(150, 1)],
            &details(),
        );

        assert_eq!(order.total, Decimal::from(450));
        assert_eq!(order.amount_paid(), Decimal::from(445));
        assert_eq!(order.ticket_count(), 4);
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn payment_methods_parse_case_insensitively() {
        assert_eq!("PIX".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert_eq!(" credit ".parse::<PaymentMethod>(), Ok(PaymentMethod::Credit));
        assert_eq!(
            "cash".parse::<PaymentMethod>(),
            Err(UnknownPaymentMethod("cash".to_string()))
        );
    }

    #[test]
    fn order_serializes_with_lowercase_enums() -> TestResult {
        let order = Order::confirmed(
            OrderId::from("LUXE-0000001-1"),
            Timestamp::UNIX_EPOCH,
            vec![line(100, 1)],
            &details(),
        );

        let json = serde_json::to_value(&order)?;

        assert_eq!(json["paymentMethod"], "pix");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["id"], "LUXE-0000001-1");

        Ok(())
    }
}
