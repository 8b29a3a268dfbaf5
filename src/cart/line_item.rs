//! Cart line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Event, EventId, TicketType},
    pricing::line_total,
    uuids::TypedUuid,
};

/// Cart line identifier.
pub type LineItemId = TypedUuid<CartLineItem>;

/// One entry in the cart: an event, a ticket type and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Unique within the cart.
    pub id: LineItemId,

    /// Event the tickets are for.
    pub event_id: EventId,

    /// Event title at the time of selection.
    pub event_title: String,

    /// Event display date.
    pub event_date: String,

    /// Event opening hours.
    pub event_time: String,

    /// Event cover image.
    pub event_image: String,

    /// Ticket type name.
    pub ticket_type: String,

    /// Unit price.
    pub price: Decimal,

    /// Number of tickets, at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// Give a draft an id.
    #[must_use]
    pub fn new(id: LineItemId, draft: NewLineItem) -> Self {
        let NewLineItem {
            event_id,
            event_title,
            event_date,
            event_time,
            event_image,
            ticket_type,
            price,
            quantity,
        } = draft;

        Self {
            id,
            event_id,
            event_title,
            event_date,
            event_time,
            event_image,
            ticket_type,
            price,
            quantity,
        }
    }

    /// Price × quantity.
    pub fn line_total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }

    /// Whether this line holds the given event and ticket type.
    pub fn is_for(&self, event_id: EventId, ticket_type: &str) -> bool {
        self.event_id == event_id && self.ticket_type == ticket_type
    }
}

/// A line item that hasn't been added to the cart yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    /// Event the tickets are for.
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

    /// Unit price.
    pub price: Decimal,

    /// Number of tickets.
    pub quantity: u32,
}

impl NewLineItem {
    /// Snapshot the event and ticket type a buyer picked.
    #[must_use]
    pub fn from_selection(event: &Event, ticket_type: &TicketType, quantity: u32) -> Self {
        Self {
            event_id: event.id,
            event_title: event.title.clone(),
            event_date: event.date.clone(),
            event_time: event.time.clone(),
            event_image: event.image.clone(),
            ticket_type: ticket_type.name.clone(),
            price: ticket_type.price,
            quantity,
        }
    }
}
