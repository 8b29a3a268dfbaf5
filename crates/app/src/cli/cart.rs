use std::io;

use clap::{Args, Subcommand};
use luxe::{
    cart::CartLineItem,
    catalog::EventId,
    context::AppContext,
    receipt,
};

use super::output_error;

#[derive(Debug, Args)]
pub struct CartCommand {
    #[command(subcommand)]
    command: Option<CartSubcommand>,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart (default)
    Show,

    /// Add tickets for an event
    Add(AddArgs),

    /// Remove a line
    Remove(LineArgs),

    /// Change a line's quantity
    Set(SetArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Event id
    event_id: EventId,

    /// Ticket type; the first one on sale when omitted
    ticket_type: Option<String>,

    /// Number of tickets
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct LineArgs {
    /// Line number as shown by `luxe cart`
    line: usize,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Line number as shown by `luxe cart`
    line: usize,

    /// New quantity, at least 1
    quantity: u32,
}

#[derive(Debug, Args)]
pub struct CouponArgs {
    /// Coupon code, any case
    code: String,
}

pub(crate) fn run(
    context: &AppContext,
    command: CartCommand,
    out: &mut impl io::Write,
) -> Result<(), String> {
    match command.command.unwrap_or(CartSubcommand::Show) {
        CartSubcommand::Show => show(context, out),
        CartSubcommand::Add(args) => add(context, &args, out),
        CartSubcommand::Remove(args) => remove(context, &args, out),
        CartSubcommand::Set(args) => set(context, &args, out),
        CartSubcommand::Clear => {
            context.cart.clear();

            writeln!(out, "Cart cleared.").map_err(output_error)
        }
    }
}

fn show(context: &AppContext, out: &mut impl io::Write) -> Result<(), String> {
    let totals = context.checkout().totals();

    receipt::write_cart(out, &context.cart.lines(), &totals).map_err(output_error)
}

fn add(context: &AppContext, args: &AddArgs, out: &mut impl io::Write) -> Result<(), String> {
    let ticket_type = match &args.ticket_type {
        Some(name) => name.clone(),
        None => context
            .catalog
            .event(args.event_id)
            .map_err(|error| error.to_string())?
            .first_available()
            .map(|ticket_type| ticket_type.name.clone())
            .ok_or_else(|| format!("event {} is sold out", args.event_id))?,
    };

    let draft = context
        .catalog
        .select(args.event_id, &ticket_type, args.quantity)
        .map_err(|error| error.to_string())?;

    let line = context.cart.add_item(draft).map_err(|error| error.to_string())?;

    writeln!(
        out,
        "{} × {} for {} ({} in cart)",
        args.quantity,
        line.ticket_type,
        line.event_title,
        context.cart.item_count()
    )
    .map_err(output_error)
}

fn line_at(context: &AppContext, line: usize) -> Result<CartLineItem, String> {
    line.checked_sub(1)
        .and_then(|idx| context.cart.lines().into_iter().nth(idx))
        .ok_or_else(|| format!("no line {line} in the cart"))
}

fn remove(context: &AppContext, args: &LineArgs, out: &mut impl io::Write) -> Result<(), String> {
    let id = line_at(context, args.line)?.id;

    let removed = context
        .cart
        .remove_item(id)
        .ok_or_else(|| format!("no line {} in the cart", args.line))?;

    writeln!(out, "Removed {} for {}.", removed.ticket_type, removed.event_title)
        .map_err(output_error)
}

fn set(context: &AppContext, args: &SetArgs, out: &mut impl io::Write) -> Result<(), String> {
    let id = line_at(context, args.line)?.id;

    let updated = context
        .cart
        .update_quantity(id, args.quantity)
        .map_err(|error| error.to_string())?
        .ok_or_else(|| "quantity must be at least 1".to_string())?;

    writeln!(
        out,
        "{} × {} for {}.",
        updated.quantity, updated.ticket_type, updated.event_title
    )
    .map_err(output_error)
}

pub(crate) fn coupon(
    context: &AppContext,
    args: &CouponArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let mut checkout = context.checkout();

    checkout
        .apply_coupon(&args.code)
        .map_err(|error| error.to_string())?;

    writeln!(out, "Coupon {} applies to this cart.", args.code.trim().to_uppercase())
        .map_err(output_error)?;

    receipt::write_totals(out, &checkout.totals()).map_err(output_error)
}
