//! Event catalog
//!
//! The fixed line-up of club nights and the ticket types each one sells.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::NewLineItem;

/// Event identifier.
pub type EventId = u32;

/// Catalog lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No event has this id.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// The event doesn't sell this ticket type.
    #[error("event {event_id} has no ticket type named {name:?}")]
    TicketTypeNotFound {
        /// Event that was searched.
        event_id: EventId,
        /// Requested ticket type.
        name: String,
    },

    /// The ticket type is sold out.
    #[error("{name:?} tickets for event {event_id} are unavailable")]
    TicketTypeUnavailable {
        /// Event that was searched.
        event_id: EventId,
        /// Requested ticket type.
        name: String,
    },

    /// Tickets are sold in quantities of one or more.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// A kind of ticket sold for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Display name, unique within the event.
    pub name: String,

    /// Unit price.
    pub price: Decimal,

    /// What the ticket includes.
    #[serde(default)]
    pub description: String,

    /// Whether it can still be bought.
    pub available: bool,
}

/// A club night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier.
    pub id: EventId,

    /// Title.
    pub title: String,

    /// Display date, e.g. `12 May, 2025`.
    pub date: String,

    /// Display opening hours, e.g. `22:00 - 05:00`.
    pub time: String,

    /// Headliner.
    pub dj: String,

    /// Room within the club.
    pub location: String,

    /// Music genre.
    pub category: String,

    /// Blurb.
    #[serde(default)]
    pub description: String,

    /// Cover image path.
    pub image: String,

    /// Extra image paths.
    #[serde(default)]
    pub gallery: Vec<String>,

    /// Whether the event is highlighted on the home page.
    #[serde(default)]
    pub featured: bool,

    /// Ticket types, in display order.
    pub ticket_types: Vec<TicketType>,
}

impl Event {
    /// Look up a ticket type by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TicketTypeNotFound`] if the event doesn't sell it.
    pub fn ticket_type(&self, name: &str) -> Result<&TicketType, CatalogError> {
        self.ticket_types
            .iter()
            .find(|ticket_type| ticket_type.name == name)
            .ok_or_else(|| CatalogError::TicketTypeNotFound {
                event_id: self.id,
                name: name.to_string(),
            })
    }

    /// The default selection: the first ticket type still on sale.
    pub fn first_available(&self) -> Option<&TicketType> {
        self.ticket_types.iter().find(|ticket_type| ticket_type.available)
    }

    /// Cheapest ticket type still on sale.
    pub fn starting_price(&self) -> Option<Decimal> {
        self.ticket_types
            .iter()
            .filter(|ticket_type| ticket_type.available)
            .map(|ticket_type| ticket_type.price)
            .min()
    }
}

/// All events on sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    /// Build a catalog from events.
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Every event, in catalog order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events highlighted on the home page.
    pub fn featured(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|event| event.featured)
    }

    /// Events of a genre, case-insensitively.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events
            .iter()
            .filter(move |event| event.category.eq_ignore_ascii_case(category))
    }

    /// Look up an event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] for unknown ids.
    pub fn event(&self, id: EventId) -> Result<&Event, CatalogError> {
        self.events
            .iter()
            .find(|event| event.id == id)
            .ok_or(CatalogError::EventNotFound(id))
    }

    /// Turn a ticket selection into a cart line draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the event or ticket type doesn't exist, the ticket
    /// type is unavailable, or `quantity` is zero.
    pub fn select(
        &self,
        event_id: EventId,
        ticket_type: &str,
        quantity: u32,
    ) -> Result<NewLineItem, CatalogError> {
        if quantity == 0 {
            return Err(CatalogError::ZeroQuantity);
        }

        let event = self.event(event_id)?;
        let ticket_type = event.ticket_type(ticket_type)?;

        if !ticket_type.available {
            return Err(CatalogError::TicketTypeUnavailable {
                event_id,
                name: ticket_type.name.clone(),
            });
        }

        Ok(NewLineItem::from_selection(event, ticket_type, quantity))
    }
}
