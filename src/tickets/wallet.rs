//! Ticket wallet
//!
//! The signed-in member's tickets and purchase history. Both collections
//! are stored under keys scoped by [`UserId`]; nothing is kept for signed
//! out visitors.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use jiff::Timestamp;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    auth::{User, UserId},
    cart::CartLineItem,
    orders::{Order, OrderId, PurchaseDetails},
    store::{KeyValueStore, StoreError, load_json, purchases_key, save_json, tickets_key},
    tickets::{Issued, QrPayload, Ticket, TicketId, TicketsError, ticket_code},
};

#[derive(Debug, Default)]
struct WalletState {
    owner: Option<UserId>,
    tickets: Vec<Ticket>,
    history: Vec<Order>,
}

/// Tickets and orders of the signed-in member.
pub struct TicketWallet {
    store: Arc<dyn KeyValueStore>,
    qr_base_url: String,
    state: Mutex<WalletState>,
}

impl TicketWallet {
    /// An empty, signed out wallet. QR links are rendered under `qr_base_url`.
    pub fn new(store: Arc<dyn KeyValueStore>, qr_base_url: impl Into<String>) -> Self {
        Self {
            store,
            qr_base_url: qr_base_url.into(),
            state: Mutex::new(WalletState::default()),
        }
    }

    /// Switch to `user`'s tickets, or empty the wallet when `None`.
    ///
    /// Stored data that can't be read leaves both collections empty.
    pub fn load_for(&self, user: Option<&User>) {
        let state = match user {
            Some(user) => self.read(user.id()),
            None => WalletState::default(),
        };

        *self.lock() = state;
    }

    fn read(&self, owner: UserId) -> WalletState {
        let store = self.store.as_ref();

        let loaded = load_json::<Vec<Ticket>>(store, &tickets_key(owner)).and_then(|tickets| {
            let history = load_json::<Vec<Order>>(store, &purchases_key(owner))?;

            Ok((tickets, history))
        });

        match loaded {
            Ok((tickets, history)) => {
                let state = WalletState {
                    owner: Some(owner),
                    tickets: tickets.unwrap_or_default(),
                    history: history.unwrap_or_default(),
                };

                debug!(
                    user_id = %owner,
                    tickets = state.tickets.len(),
                    orders = state.history.len(),
                    "wallet loaded"
                );

                state
            }
            Err(error) => {
                warn!(user_id = %owner, error = %error, "discarding unreadable wallet");

                WalletState {
                    owner: Some(owner),
                    ..WalletState::default()
                }
            }
        }
    }

    /// Member the wallet belongs to.
    pub fn owner(&self) -> Option<UserId> {
        self.lock().owner
    }

    /// Issue one ticket per unit of quantity of every line and record the
    /// order in the purchase history.
    ///
    /// The new tickets and order are kept even if they can't be persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, `items` is empty, or the
    /// member already has an order numbered `order_id`.
    pub fn issue(
        &self,
        items: &[CartLineItem],
        order_id: OrderId,
        details: &PurchaseDetails,
    ) -> Result<Issued, TicketsError> {
        let mut state = self.lock();

        let owner = state.owner.ok_or(TicketsError::Unauthenticated)?;

        if items.is_empty() {
            return Err(TicketsError::EmptyOrder);
        }

        if state.history.iter().any(|order| order.id == order_id) {
            return Err(TicketsError::DuplicateOrder(order_id));
        }

        let now = Timestamp::now();
        let mut rng = rand::thread_rng();

        let tickets: Vec<Ticket> = items
            .iter()
            .flat_map(|item| (0..item.quantity).map(move |_| item))
            .enumerate()
            .map(|(sequence, item)| self.mint(&order_id, sequence, item, now, &mut rng))
            .collect();

        let order = Order::confirmed(order_id, now, items.to_vec(), details);

        state.tickets.extend(tickets.iter().cloned());
        state.history.push(order.clone());

        self.persist_tickets(owner, &state.tickets);
        self.persist_history(owner, &state.history);

        info!(
            user_id = %owner,
            order_id = %order.id,
            tickets = tickets.len(),
            "tickets issued"
        );

        Ok(Issued { tickets, order })
    }

    fn mint<R: Rng + ?Sized>(
        &self,
        order_id: &OrderId,
        sequence: usize,
        item: &CartLineItem,
        now: Timestamp,
        rng: &mut R,
    ) -> Ticket {
        let id = TicketId::new(order_id, item.event_id, sequence);
        let qr_code = QrPayload::issue(id.clone(), rng).to_url(&self.qr_base_url);

        Ticket {
            id,
            ticket_code: ticket_code(rng),
            qr_code,
            event_id: item.event_id,
            event_title: item.event_title.clone(),
            event_date: item.event_date.clone(),
            event_time: item.event_time.clone(),
            event_image: item.event_image.clone(),
            ticket_type: item.ticket_type.clone(),
            price: item.price,
            purchase_date: now,
            order_id: order_id.clone(),
            used: false,
        }
    }

    /// Mark a ticket as redeemed. Marking it again changes nothing.
    ///
    /// Returns `None` if nobody is signed in or the ticket isn't theirs.
    pub fn mark_used(&self, id: &TicketId) -> Option<Ticket> {
        let mut state = self.lock();

        let owner = state.owner?;
        let ticket = state.tickets.iter_mut().find(|ticket| &ticket.id == id)?;

        let newly_used = !ticket.used;

        ticket.used = true;

        let updated = ticket.clone();

        if newly_used {
            self.persist_tickets(owner, &state.tickets);

            info!(ticket_id = %id, "ticket marked as used");
        }

        Some(updated)
    }

    /// Every ticket, in issue order.
    pub fn tickets(&self) -> Vec<Ticket> {
        self.lock().tickets.clone()
    }

    /// Tickets not yet redeemed.
    pub fn active(&self) -> Vec<Ticket> {
        self.filtered(|ticket| !ticket.used)
    }

    /// Redeemed tickets.
    pub fn used(&self) -> Vec<Ticket> {
        self.filtered(|ticket| ticket.used)
    }

    /// Tickets bought in an order.
    pub fn tickets_for_order(&self, order_id: &OrderId) -> Vec<Ticket> {
        self.filtered(|ticket| &ticket.order_id == order_id)
    }

    fn filtered(&self, predicate: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        self.lock()
            .tickets
            .iter()
            .filter(|ticket| predicate(ticket))
            .cloned()
            .collect()
    }

    /// Look up a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the ticket isn't theirs.
    pub fn ticket(&self, id: &TicketId) -> Result<Ticket, TicketsError> {
        let state = self.signed_in()?;

        state
            .tickets
            .iter()
            .find(|ticket| &ticket.id == id)
            .cloned()
            .ok_or_else(|| TicketsError::TicketNotFound(id.clone()))
    }

    /// Look up an order.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the order isn't theirs.
    pub fn order(&self, id: &OrderId) -> Result<Order, TicketsError> {
        let state = self.signed_in()?;

        state
            .history
            .iter()
            .find(|order| &order.id == id)
            .cloned()
            .ok_or_else(|| TicketsError::OrderNotFound(id.clone()))
    }

    /// Whether the member has an order numbered `id`.
    pub fn has_order(&self, id: &OrderId) -> bool {
        self.lock().history.iter().any(|order| &order.id == id)
    }

    /// Orders, newest first.
    pub fn purchase_history(&self) -> Vec<Order> {
        let mut history: Vec<Order> = self.lock().history.iter().rev().cloned().collect();

        history.sort_by(|a, b| b.date.cmp(&a.date));

        history
    }

    /// Resolve a scanned QR payload to the member's ticket. The token must
    /// match the one issued with the ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed, nobody is signed in, or
    /// no ticket matches.
    pub fn find_by_qr(&self, payload: &str) -> Result<Ticket, TicketsError> {
        let scanned = QrPayload::parse(payload)?;
        let ticket = self.ticket(&scanned.ticket_id)?;

        let issued = QrPayload::parse(&ticket.qr_code).ok();

        if issued.is_some_and(|issued| issued.token == scanned.token) {
            Ok(ticket)
        } else {
            debug!(ticket_id = %scanned.ticket_id, "QR token mismatch");

            Err(TicketsError::TicketNotFound(scanned.ticket_id))
        }
    }

    /// Write both collections to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection can't be written.
    pub fn flush(&self) -> Result<(), StoreError> {
        let state = self.lock();

        let Some(owner) = state.owner else {
            return Ok(());
        };

        save_json(self.store.as_ref(), &tickets_key(owner), &state.tickets)?;
        save_json(self.store.as_ref(), &purchases_key(owner), &state.history)
    }

    fn persist_tickets(&self, owner: UserId, tickets: &[Ticket]) {
        if let Err(error) = save_json(self.store.as_ref(), &tickets_key(owner), tickets) {
            warn!(user_id = %owner, error = %error, "failed to persist tickets");
        }
    }

    fn persist_history(&self, owner: UserId, history: &[Order]) {
        if let Err(error) = save_json(self.store.as_ref(), &purchases_key(owner), history) {
            warn!(user_id = %owner, error = %error, "failed to persist purchase history");
        }
    }

    fn signed_in(&self) -> Result<MutexGuard<'_, WalletState>, TicketsError> {
        let state = self.lock();

        if state.owner.is_some() {
            Ok(state)
        } else {
            Err(TicketsError::Unauthenticated)
        }
    }

    fn lock(&self) -> MutexGuard<'_, WalletState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TicketWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketWallet")
            .field("qr_base_url", &self.qr_base_url)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
