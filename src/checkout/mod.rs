//! Checkout
//!
//! Turns the cart into a paid order and issued tickets:
//!
//! ```text
//! Editing -> Validating -> Submitting -> Confirmed
//!                                    \-> Failed
//! ```
//!
//! Nothing is retried. A failed submission can be resubmitted, which
//! validates the form again from scratch. The cart is only cleared once the
//! tickets have been issued.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::Session,
    cart::Cart,
    coupons::{CouponBook, CouponError},
    orders::{Order, OrderId, PaymentMethod, PurchaseDetails},
    pricing::Totals,
    tickets::{Ticket, TicketWallet, TicketsError},
    validation::{Field, FieldErrors},
};

mod form;
mod gateway;

pub use form::*;
pub use gateway::*;

/// Shown when the payment step fails.
pub const PAYMENT_FAILED_MESSAGE: &str =
    "There was an error processing the payment. Please try again.";

/// Shown next to an unknown coupon code.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid coupon";

/// Checkout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// There's nothing to buy.
    #[error("the cart is empty")]
    EmptyCart,

    /// The form has errors; nothing was charged.
    #[error("the checkout form has errors: {0}")]
    Invalid(FieldErrors),

    /// Tickets need an owner; nothing was charged.
    #[error("sign in to complete the purchase")]
    Unauthenticated,

    /// The payment failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Payment went through but tickets couldn't be issued. The cart is kept.
    #[error(transparent)]
    Tickets(#[from] TicketsError),
}

/// Where a checkout is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// The buyer is filling in the form.
    #[default]
    Editing,

    /// The form is being checked.
    Validating,

    /// Waiting for the payment.
    Submitting,

    /// Paid and issued.
    Confirmed(Box<Confirmation>),

    /// The last submission failed.
    Failed {
        /// User-facing explanation.
        message: String,
    },
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// The recorded order.
    pub order: Order,

    /// Issued tickets.
    pub tickets: Vec<Ticket>,

    /// What was charged.
    pub totals: Totals,

    /// Payment reference.
    pub receipt: PaymentReceipt,
}

/// Runs one checkout against the shared cart and wallet.
pub struct CheckoutProcessor {
    cart: Arc<Cart>,
    wallet: Arc<TicketWallet>,
    session: Arc<Session>,
    gateway: Arc<dyn PaymentGateway>,
    coupons: Arc<CouponBook>,
    service_fee: Decimal,
    state: CheckoutState,
    coupon: Option<String>,
    errors: FieldErrors,
}

impl CheckoutProcessor {
    /// Start a checkout in the `Editing` state.
    #[must_use]
    pub fn new(
        cart: Arc<Cart>,
        wallet: Arc<TicketWallet>,
        session: Arc<Session>,
        gateway: Arc<dyn PaymentGateway>,
        coupons: Arc<CouponBook>,
        service_fee: Decimal,
    ) -> Self {
        Self {
            cart,
            wallet,
            session,
            gateway,
            coupons,
            service_fee,
            state: CheckoutState::Editing,
            coupon: None,
            errors: FieldErrors::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Messages from the last validation or submission.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Applied coupon code.
    pub fn coupon(&self) -> Option<&str> {
        self.coupon.as_deref()
    }

    /// Apply a coupon to the current subtotal and return the discount.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown codes; any previous coupon is dropped
    /// and the discount goes back to zero.
    pub fn apply_coupon(&mut self, code: &str) -> Result<Decimal, CouponError> {
        match self.coupons.apply(code, self.cart.subtotal()) {
            Ok(applied) => {
                self.coupon = Some(applied.code.to_string());
                self.errors.clear(Field::Coupon);

                Ok(applied.amount)
            }
            Err(error) => {
                self.coupon = None;
                self.errors.insert(Field::Coupon, INVALID_COUPON_MESSAGE);

                Err(error)
            }
        }
    }

    /// Drop the applied coupon.
    pub fn remove_coupon(&mut self) {
        self.coupon = None;
        self.errors.clear(Field::Coupon);
    }

    /// Totals for the cart as it is now.
    pub fn totals(&self) -> Totals {
        let subtotal = self.cart.subtotal();

        let discount = self
            .coupon
            .as_deref()
            .and_then(|code| self.coupons.evaluate(code, subtotal).ok())
            .unwrap_or_default();

        Totals::compute(subtotal, self.cart.item_count(), self.service_fee, discount)
    }

    /// Validate `form` without submitting it.
    pub fn validate(&mut self, form: &CheckoutForm, method: PaymentMethod) -> bool {
        self.errors = form.validate(method);

        self.errors.is_empty()
    }

    /// Validate, pay, issue the tickets and clear the cart.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if there's nothing to buy.
    /// - [`CheckoutError::Invalid`] if the form has errors.
    /// - [`CheckoutError::Unauthenticated`] if nobody is signed in.
    /// - [`CheckoutError::Payment`] if the payment fails.
    /// - [`CheckoutError::Tickets`] if the tickets can't be issued.
    pub async fn submit(
        &mut self,
        form: &CheckoutForm,
        method: PaymentMethod,
    ) -> Result<Confirmation, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.state = CheckoutState::Validating;

        if !self.validate(form, method) {
            self.state = CheckoutState::Editing;

            return Err(CheckoutError::Invalid(self.errors.clone()));
        }

        let Some(user) = self.session.current_user() else {
            self.state = CheckoutState::Editing;

            return Err(CheckoutError::Unauthenticated);
        };

        if self.wallet.owner() != Some(user.id()) {
            self.wallet.load_for(Some(&user));
        }

        self.state = CheckoutState::Submitting;

        let lines = self.cart.lines();
        let totals = self.totals();

        let request = PaymentRequest {
            amount: totals.total,
            method,
            payer_name: form.name.trim().to_string(),
            payer_email: form.email.trim().to_string(),
        };

        let receipt = match self.gateway.charge(request).await {
            Ok(receipt) => receipt,
            Err(error) => {
                warn!(error = %error, "payment failed");

                self.fail(PAYMENT_FAILED_MESSAGE);

                return Err(error.into());
            }
        };

        let order_id = self.fresh_order_id();

        let details = PurchaseDetails {
            payment_method: method,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            service_fee: totals.service_fee,
            discount: totals.discount,
        };

        let issued = match self.wallet.issue(&lines, order_id, &details) {
            Ok(issued) => issued,
            Err(error) => {
                warn!(
                    error = %error,
                    transaction_id = %receipt.transaction_id,
                    "ticket issuance failed after payment"
                );

                self.fail(PAYMENT_FAILED_MESSAGE);

                return Err(error.into());
            }
        };

        self.cart.clear();
        self.coupon = None;

        info!(
            order_id = %issued.order.id,
            tickets = issued.tickets.len(),
            total = %totals.total,
            "checkout confirmed"
        );

        let confirmation = Confirmation {
            order: issued.order,
            tickets: issued.tickets,
            totals,
            receipt,
        };

        self.state = CheckoutState::Confirmed(Box::new(confirmation.clone()));

        Ok(confirmation)
    }

    fn fresh_order_id(&self) -> OrderId {
        let mut rng = rand::thread_rng();

        loop {
            let id = OrderId::generate(jiff::Timestamp::now(), &mut rng);

            if !self.wallet.has_order(&id) {
                break id;
            }
        }
    }

    fn fail(&mut self, message: &str) {
        self.errors.insert(Field::Submit, message);
        self.state = CheckoutState::Failed {
            message: message.to_string(),
        };
    }
}

impl fmt::Debug for CheckoutProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutProcessor")
            .field("state", &self.state)
            .field("coupon", &self.coupon)
            .field("service_fee", &self.service_fee)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
