use std::{fmt, io};

use clap::Subcommand;
use luxe::{auth::User, context::AppContext};

mod account;
mod cart;
mod checkout;
mod events;
mod orders;
mod tickets;

/// Storefront commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List events on sale
    Events(events::EventsArgs),

    /// Show an event and its ticket types
    Event(events::EventArgs),

    /// Show or change the cart
    Cart(cart::CartCommand),

    /// Preview a coupon against the cart
    Coupon(cart::CouponArgs),

    /// Sign in
    Login(account::LoginArgs),

    /// Create a member account
    Register(account::RegisterArgs),

    /// Sign out
    Logout,

    /// Show the signed-in member
    Whoami,

    /// Pay for the cart and issue tickets
    Checkout(checkout::CheckoutArgs),

    /// List, show, redeem or verify tickets
    Tickets(tickets::TicketsCommand),

    /// Show the purchase history or one order
    Orders(orders::OrdersArgs),
}

impl Command {
    /// Run the command against `context`, writing results to `out`.
    ///
    /// # Errors
    ///
    /// Returns a message for the user when the command fails.
    pub async fn run(self, context: &AppContext, out: &mut impl io::Write) -> Result<(), String> {
        match self {
            Self::Events(args) => events::list(context, &args, out),
            Self::Event(args) => events::show(context, &args, out),
            Self::Cart(command) => cart::run(context, command, out),
            Self::Coupon(args) => cart::coupon(context, &args, out),
            Self::Login(args) => account::login(context, args, out).await,
            Self::Register(args) => account::register(context, args, out).await,
            Self::Logout => account::logout(context, out),
            Self::Whoami => account::whoami(context, out),
            Self::Checkout(args) => checkout::run(context, args, out).await,
            Self::Tickets(command) => tickets::run(context, command, out),
            Self::Orders(args) => orders::run(context, &args, out),
        }
    }
}

fn output_error(error: impl fmt::Display) -> String {
    format!("failed to write output: {error}")
}

fn signed_in(context: &AppContext) -> Result<User, String> {
    context
        .session
        .current_user()
        .ok_or_else(|| "sign in first with `luxe login`".to_string())
}
