//! Cart
//!
//! The buyer's ticket selection. Every mutation writes the whole cart back
//! to the store; a failed write is logged and the in-memory cart is kept.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    pricing::{checked_line_total, saturating_sum},
    store::{CART_KEY, KeyValueStore, StoreError, load_json, save_json},
};

mod line_item;

pub use line_item::*;

/// Errors related to cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Lines hold at least one ticket.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Ticket prices can't be negative.
    #[error("price must not be negative, got {0}")]
    NegativePrice(Decimal),

    /// The merged quantity doesn't fit.
    #[error("quantity overflow")]
    QuantityOverflow,

    /// The cart subtotal doesn't fit.
    #[error("cart amount overflow")]
    AmountOverflow,
}

fn checked_subtotal<'a>(
    lines: impl IntoIterator<Item = &'a CartLineItem>,
) -> Result<Decimal, CartError> {
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, line| {
            checked_line_total(line.price, line.quantity).and_then(|total| sum.checked_add(total))
        })
        .ok_or(CartError::AmountOverflow)
}

fn subtotal_without(
    lines: &[CartLineItem],
    skip: Option<LineItemId>,
) -> Result<Decimal, CartError> {
    checked_subtotal(lines.iter().filter(|line| Some(line.id) != skip))
}

fn ensure_fits(others: Decimal, price: Decimal, quantity: u32) -> Result<(), CartError> {
    checked_line_total(price, quantity)
        .and_then(|total| others.checked_add(total))
        .map(drop)
        .ok_or(CartError::AmountOverflow)
}

/// The shopping cart.
pub struct Cart {
    store: Arc<dyn KeyValueStore>,
    lines: Mutex<Vec<CartLineItem>>,
}

impl Cart {
    /// Restore the persisted cart. Anything unreadable yields an empty cart.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let lines = match load_json::<Vec<CartLineItem>>(store.as_ref(), CART_KEY) {
            Ok(Some(lines)) => lines.into_iter().filter(|line| line.quantity >= 1).collect(),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(error = %error, "discarding unreadable cart");
                Vec::new()
            }
        };

        debug!(lines = lines.len(), "cart loaded");

        Self {
            store,
            lines: Mutex::new(lines),
        }
    }

    /// Add tickets. A line for the same event and ticket type absorbs the
    /// quantity instead of a new line being created.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero, the price is negative, the
    /// merged quantity overflows, or the cart subtotal would no longer fit
    /// in a `Decimal`.
    pub fn add_item(&self, draft: NewLineItem) -> Result<CartLineItem, CartError> {
        if draft.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if draft.price.is_sign_negative() {
            return Err(CartError::NegativePrice(draft.price));
        }

        let mut lines = self.lock();

        let merge_into = lines
            .iter()
            .find(|line| line.is_for(draft.event_id, &draft.ticket_type))
            .map(|line| line.id);

        let others = subtotal_without(&lines, merge_into)?;

        let line = if let Some(existing) =
            merge_into.and_then(|id| lines.iter_mut().find(|line| line.id == id))
        {
            let quantity = existing
                .quantity
                .checked_add(draft.quantity)
                .ok_or(CartError::QuantityOverflow)?;

            ensure_fits(others, existing.price, quantity)?;

            existing.quantity = quantity;

            existing.clone()
        } else {
            ensure_fits(others, draft.price, draft.quantity)?;

            let line = CartLineItem::new(LineItemId::now_v7(), draft);

            lines.push(line.clone());

            line
        };

        debug!(line_id = %line.id, quantity = line.quantity, "cart line added");

        self.persist(&lines);

        Ok(line)
    }

    /// Remove a line. Unknown ids are ignored.
    pub fn remove_item(&self, id: LineItemId) -> Option<CartLineItem> {
        let mut lines = self.lock();

        let index = lines.iter().position(|line| line.id == id)?;
        let removed = lines.remove(index);

        self.persist(&lines);

        Some(removed)
    }

    /// Set a line's quantity. Quantities below 1 are ignored and the line
    /// keeps its current quantity; unknown ids are ignored too.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart subtotal would no longer fit in a
    /// `Decimal`. The line keeps its current quantity.
    pub fn update_quantity(
        &self,
        id: LineItemId,
        quantity: u32,
    ) -> Result<Option<CartLineItem>, CartError> {
        if quantity < 1 {
            debug!(line_id = %id, "ignoring quantity below 1");

            return Ok(None);
        }

        let mut lines = self.lock();

        let others = subtotal_without(&lines, Some(id))?;

        let Some(line) = lines.iter_mut().find(|line| line.id == id) else {
            return Ok(None);
        };

        ensure_fits(others, line.price, quantity)?;

        line.quantity = quantity;

        let updated = line.clone();

        self.persist(&lines);

        Ok(Some(updated))
    }

    /// Empty the cart.
    pub fn clear(&self) {
        let mut lines = self.lock();

        lines.clear();

        self.persist(&lines);
    }

    /// Sum of price × quantity, saturating at `Decimal::MAX`.
    pub fn subtotal(&self) -> Decimal {
        saturating_sum(self.lock().iter().map(CartLineItem::line_total))
    }

    /// Number of tickets, not lines.
    pub fn item_count(&self) -> u32 {
        self.lock()
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// Snapshot of the lines, in the order they were added.
    pub fn lines(&self) -> Vec<CartLineItem> {
        self.lock().clone()
    }

    /// Look up a line.
    pub fn line(&self, id: LineItemId) -> Option<CartLineItem> {
        self.lock().iter().find(|line| line.id == id).cloned()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write the current cart to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot can't be written.
    pub fn flush(&self) -> Result<(), StoreError> {
        save_json(self.store.as_ref(), CART_KEY, self.lock().as_slice())
    }

    fn persist(&self, lines: &[CartLineItem]) {
        if let Err(error) = save_json(self.store.as_ref(), CART_KEY, lines) {
            warn!(error = %error, "failed to persist cart");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLineItem>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use testresult::TestResult;

    use super::*;
    use crate::store::{MemoryStore, MockKeyValueStore};

    fn draft(event_id: u32, ticket_type: &str, price: i64, quantity: u32) -> NewLineItem {
        NewLineItem {
            event_id,
            event_title: format!("Event {event_id}"),
            event_date: "12 May, 2025".to_string(),
            event_time: "22:00 - 05:00".to_string(),
            event_image: format!("/assets/images/event{event_id}.jpg"),
            ticket_type: ticket_type.to_string(),
            price: Decimal::from(price),
            quantity,
        }
    }

    fn empty_cart() -> (Arc<MemoryStore>, Cart) {
        let store = Arc::new(MemoryStore::new());
        let cart = Cart::load(store.clone());

        (store, cart)
    }

    #[test]
    fn same_event_and_type_merge_into_one_line() -> TestResult {
        let (_, cart) = empty_cart();

        let first = cart.add_item(draft(1, "VIP", 150, 1))?;
        let second = cart.add_item(draft(1, "VIP", 150, 2))?;
        cart.add_item(draft(1, "VIP", 150, 4))?;

        assert_eq!(first.id, second.id);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(7));

        Ok(())
    }

    #[test]
    fn different_types_get_their_own_lines() -> TestResult {
        let (_, cart) = empty_cart();

        let vip = cart.add_item(draft(1, "VIP", 150, 1))?;
        let standard = cart.add_item(draft(1, "Standard", 100, 1))?;
        cart.add_item(draft(2, "VIP", 140, 1))?;

        assert_ne!(vip.id, standard.id);
        assert_eq!(cart.len(), 3);

        Ok(())
    }

    #[test]
    fn zero_quantity_and_negative_price_are_rejected() {
        let (_, cart) = empty_cart();

        assert_eq!(cart.add_item(draft(1, "VIP", 150, 0)), Err(CartError::ZeroQuantity));
        assert_eq!(
            cart.add_item(draft(1, "VIP", -1, 1)),
            Err(CartError::NegativePrice(Decimal::from(-1)))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_below_one_is_ignored() -> TestResult {
        let (_, cart) = empty_cart();

        let line = cart.add_item(draft(1, "VIP", 150, 3))?;

        assert_eq!(cart.update_quantity(line.id, 0), Ok(None));
        assert_eq!(cart.line(line.id).map(|line| line.quantity), Some(3));

        let updated = cart.update_quantity(line.id, 5)?;

        assert_eq!(updated.map(|line| line.quantity), Some(5));

        Ok(())
    }

    /// More than half of `Decimal::MAX`, so two of them overflow.
    fn pricey(event_id: u32, quantity: u32) -> NewLineItem {
        NewLineItem {
            price: Decimal::from_i128_with_scale(40_000_000_000_000_000_000_000_000_000, 0),
            ..draft(event_id, "VIP", 0, quantity)
        }
    }

    #[test]
    fn amounts_that_overflow_the_subtotal_are_rejected() -> TestResult {
        let (store, cart) = empty_cart();

        assert_eq!(cart.add_item(pricey(1, 2)), Err(CartError::AmountOverflow));
        assert!(cart.is_empty());

        let line = cart.add_item(pricey(1, 1))?;

        assert_eq!(cart.add_item(pricey(1, 1)), Err(CartError::AmountOverflow));
        assert_eq!(cart.add_item(pricey(2, 1)), Err(CartError::AmountOverflow));
        assert_eq!(cart.update_quantity(line.id, 2), Err(CartError::AmountOverflow));

        assert_eq!(cart.line(line.id).map(|line| line.quantity), Some(1));
        assert_eq!(cart.subtotal(), line.price);
        assert_eq!(Cart::load(store).len(), 1);

        Ok(())
    }

    #[test]
    fn max_price_times_two_is_rejected_without_panicking() {
        let (_, cart) = empty_cart();

        let huge = NewLineItem {
            price: Decimal::MAX,
            ..draft(1, "VIP", 0, 2)
        };

        assert_eq!(cart.add_item(huge), Err(CartError::AmountOverflow));
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn oversized_snapshot_saturates_the_subtotal() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        let line = CartLineItem::new(LineItemId::now_v7(), pricey(1, 3));

        save_json(store.as_ref(), CART_KEY, &[line])?;

        let cart = Cart::load(store);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(), Decimal::MAX);
        assert_eq!(cart.add_item(draft(2, "VIP", 150, 1)), Err(CartError::AmountOverflow));

        Ok(())
    }

    #[test]
    fn remove_unknown_line_is_a_no_op() -> TestResult {
        let (_, cart) = empty_cart();

        let line = cart.add_item(draft(1, "VIP", 150, 1))?;

        assert_eq!(cart.remove_item(LineItemId::now_v7()), None);
        assert_eq!(cart.len(), 1);

        assert_eq!(cart.remove_item(line.id).map(|line| line.id), Some(line.id));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn subtotal_and_item_count() -> TestResult {
        let (_, cart) = empty_cart();

        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);

        cart.add_item(draft(1, "Standard", 100, 3))?;
        cart.add_item(draft(3, "VIP", 130, 1))?;

        assert_eq!(cart.subtotal(), Decimal::from(430));
        assert_eq!(cart.item_count(), 4);

        Ok(())
    }

    #[test]
    fn every_mutation_is_persisted() -> TestResult {
        let (store, cart) = empty_cart();

        let line = cart.add_item(draft(1, "VIP", 150, 2))?;

        let reloaded = Cart::load(store.clone());

        assert_eq!(reloaded.lines(), vec![line]);

        cart.clear();

        assert_eq!(store.get(CART_KEY)?.as_deref(), Some("[]"));
        assert!(Cart::load(store).is_empty());

        Ok(())
    }

    #[test]
    fn corrupt_snapshot_loads_as_empty_cart() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        store.set(CART_KEY, "not json")?;

        assert!(Cart::load(store).is_empty());

        Ok(())
    }

    #[test]
    fn failed_writes_keep_the_in_memory_cart() -> TestResult {
        let mut store = MockKeyValueStore::new();

        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .returning(|_, _| Err(StoreError::Io(io::Error::other("disk full"))));

        let cart = Cart::load(Arc::new(store));

        cart.add_item(draft(1, "VIP", 150, 2))?;

        assert_eq!(cart.item_count(), 2);

        Ok(())
    }
}
