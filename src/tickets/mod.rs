//! Tickets
//!
//! Individually redeemable tickets, one per unit of quantity bought, each
//! with a short code and a QR payload.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::EventId,
    orders::{Order, OrderId},
};

mod codes;
mod wallet;

pub use codes::*;
pub use wallet::*;

/// Ticket identifier: `<order id>-<event id>-<sequence within the order>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Id of the `sequence`-th ticket of an order.
    #[must_use]
    pub fn new(order_id: &OrderId, event_id: EventId, sequence: usize) -> Self {
        Self(format!("{order_id}-{event_id}-{sequence}"))
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TicketId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An issued ticket. Only `used` changes after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Identifier.
    pub id: TicketId,

    /// Short code printed on the ticket.
    pub ticket_code: String,

    /// Validation link encoded in the QR code.
    pub qr_code: String,

    /// Event the ticket admits to.
    pub event_id: EventId,

    /// Event title.
    pub event_title: String,

    /// Event display date.
    pub event_date: String,

    /// Event opening hours.
    pub event_time: String,

    /// Event cover image.
    pub event_image: String,

    /// Ticket type name.
    pub ticket_type: String,

    /// Unit price paid.
    pub price: Decimal,

    /// When it was bought.
    pub purchase_date: Timestamp,

    /// Order it was bought in.
    pub order_id: OrderId,

    /// Whether it has been redeemed.
    pub used: bool,
}

/// Tickets and the order created by a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued {
    /// Newly issued tickets.
    pub tickets: Vec<Ticket>,

    /// The order they belong to.
    pub order: Order,
}

/// Ticket store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketsError {
    /// Tickets belong to a member; nobody is signed in.
    #[error("sign in to manage tickets")]
    Unauthenticated,

    /// Nothing to issue.
    #[error("an order needs at least one line item")]
    EmptyOrder,

    /// The member already has an order with this number.
    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),

    /// The member owns no ticket with this id.
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// The member has no order with this id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// A scanned QR payload couldn't be read.
    #[error(transparent)]
    Qr(#[from] QrError),
}
