use std::io;

use clap::{Args, Subcommand};
use luxe::{context::AppContext, receipt, tickets::TicketId};

use super::{output_error, signed_in};

#[derive(Debug, Args)]
pub struct TicketsCommand {
    #[command(subcommand)]
    command: Option<TicketsSubcommand>,
}

#[derive(Debug, Subcommand)]
enum TicketsSubcommand {
    /// List tickets (default)
    List(ListArgs),

    /// Show a ticket and its QR payload
    Show(TicketArgs),

    /// Mark a ticket as used at the door
    Use(TicketArgs),

    /// Look up a ticket from a scanned QR payload
    Verify(VerifyArgs),
}

#[derive(Debug, Default, Args)]
struct ListArgs {
    /// Only tickets not yet used
    #[arg(long, conflicts_with = "used")]
    active: bool,

    /// Only used tickets
    #[arg(long)]
    used: bool,
}

#[derive(Debug, Args)]
struct TicketArgs {
    /// Ticket id
    id: String,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// QR payload, e.g. https://luxe.com/validate/<ticket id>/<token>
    payload: String,
}

pub(crate) fn run(
    context: &AppContext,
    command: TicketsCommand,
    out: &mut impl io::Write,
) -> Result<(), String> {
    signed_in(context)?;

    match command
        .command
        .unwrap_or(TicketsSubcommand::List(ListArgs::default()))
    {
        TicketsSubcommand::List(args) => list(context, &args, out),
        TicketsSubcommand::Show(args) => show(context, &args, out),
        TicketsSubcommand::Use(args) => redeem(context, &args, out),
        TicketsSubcommand::Verify(args) => verify(context, &args, out),
    }
}

fn list(context: &AppContext, args: &ListArgs, out: &mut impl io::Write) -> Result<(), String> {
    let tickets = if args.active {
        context.wallet.active()
    } else if args.used {
        context.wallet.used()
    } else {
        context.wallet.tickets()
    };

    receipt::write_tickets(out, &tickets).map_err(output_error)
}

fn show(context: &AppContext, args: &TicketArgs, out: &mut impl io::Write) -> Result<(), String> {
    let ticket = context
        .wallet
        .ticket(&TicketId::from(args.id.as_str()))
        .map_err(|error| error.to_string())?;

    receipt::write_ticket(out, &ticket).map_err(output_error)
}

fn redeem(context: &AppContext, args: &TicketArgs, out: &mut impl io::Write) -> Result<(), String> {
    let id = TicketId::from(args.id.as_str());

    let ticket = context
        .wallet
        .mark_used(&id)
        .ok_or_else(|| format!("ticket {id} not found"))?;

    writeln!(out, "Ticket {} for {} is now used.", ticket.id, ticket.event_title)
        .map_err(output_error)
}

fn verify(context: &AppContext, args: &VerifyArgs, out: &mut impl io::Write) -> Result<(), String> {
    let ticket = context
        .wallet
        .find_by_qr(&args.payload)
        .map_err(|error| error.to_string())?;

    let verdict = if ticket.used {
        "ALREADY USED"
    } else {
        "VALID"
    };

    writeln!(out, "{verdict}").map_err(output_error)?;

    receipt::write_ticket(out, &ticket).map_err(output_error)
}
