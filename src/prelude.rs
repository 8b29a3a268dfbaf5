//! LUXE prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    auth::{
        AuthError, AuthService, LoginForm, Registration, Session, SimulatedAuthService, User,
        UserId,
    },
    cart::{Cart, CartError, CartLineItem, LineItemId, NewLineItem},
    catalog::{Catalog, CatalogError, Event, EventId, TicketType},
    checkout::{
        CheckoutError, CheckoutForm, CheckoutProcessor, CheckoutState, Confirmation,
        PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedPaymentGateway,
    },
    context::{AppContext, AppInitError, StorefrontConfig},
    coupons::{AppliedCoupon, CouponBook, CouponError},
    discounts::{Discount, DiscountError, calculate_discount},
    fixtures::{Fixture, FixtureError},
    orders::{Order, OrderId, OrderStatus, PaymentMethod, PurchaseDetails},
    pricing::{Totals, format_brl},
    receipt::ReceiptError,
    store::{FileStore, KeyValueStore, MemoryStore, StoreError},
    tickets::{Issued, QrPayload, Ticket, TicketId, TicketWallet, TicketsError},
    validation::{Field, FieldErrors},
};
