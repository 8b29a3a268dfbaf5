//! Receipt
//!
//! Plain-text tables for the cart, events, orders and tickets.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLineItem,
    catalog::Event,
    orders::Order,
    pricing::{Totals, format_brl},
    tickets::Ticket,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    right_aligned: std::ops::Range<usize>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(right_aligned), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_width: usize,
    value_width: usize,
) -> Result<(), ReceiptError> {
    writeln!(out, " {label:<label_width$} {value:>value_width$}")?;

    Ok(())
}

/// Write the cart lines followed by the totals.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_cart(
    out: &mut impl io::Write,
    lines: &[CartLineItem],
    totals: &Totals,
) -> Result<(), ReceiptError> {
    if lines.is_empty() {
        writeln!(out, "Your cart is empty.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Event", "Date", "Ticket", "Price", "Qty", "Line total"]);

    for (idx, line) in lines.iter().enumerate() {
        builder.push_record([
            (idx + 1).to_string(),
            line.event_title.clone(),
            line.event_date.clone(),
            line.ticket_type.clone(),
            format_brl(line.price),
            line.quantity.to_string(),
            format_brl(line.line_total()),
        ]);
    }

    write_table(out, builder, 4..7)?;
    write_totals(out, totals)
}

/// Write subtotal, fee, discount and total.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_totals(out: &mut impl io::Write, totals: &Totals) -> Result<(), ReceiptError> {
    let mut rows = vec![
        ("Subtotal:", format_brl(totals.subtotal)),
        ("Service fee:", format_brl(totals.service_fee)),
    ];

    if !totals.discount.is_zero() {
        rows.push(("Discount:", format!("-{}", format_brl(totals.discount))));
    }

    rows.push(("Total:", format_brl(totals.total)));

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.chars().count()).max().unwrap_or(0);

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    Ok(())
}

/// Write a list of events.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<'a>(
    out: &mut impl io::Write,
    events: impl IntoIterator<Item = &'a Event>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Event", "Date", "Time", "DJ", "Genre", "From"]);

    for event in events {
        builder.push_record([
            event.id.to_string(),
            event.title.clone(),
            event.date.clone(),
            event.time.clone(),
            event.dj.clone(),
            event.category.clone(),
            event
                .starting_price()
                .map_or_else(|| "Sold out".to_string(), format_brl),
        ]);
    }

    write_table(out, builder, 6..7)
}

/// Write an event's details and ticket types.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_event(out: &mut impl io::Write, event: &Event) -> Result<(), ReceiptError> {
    writeln!(out, "{} with {}", event.title, event.dj)?;
    writeln!(out, "{} · {} · {}", event.date, event.time, event.location)?;

    if !event.description.is_empty() {
        writeln!(out, "\n{}\n", event.description)?;
    }

    let mut builder = Builder::default();

    builder.push_record(["Ticket", "Price", "Available", "Includes"]);

    for ticket_type in &event.ticket_types {
        builder.push_record([
            ticket_type.name.clone(),
            format_brl(ticket_type.price),
            if ticket_type.available { "yes" } else { "no" }.to_string(),
            ticket_type.description.clone(),
        ]);
    }

    write_table(out, builder, 1..2)
}

/// Write a list of tickets.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tickets(out: &mut impl io::Write, tickets: &[Ticket]) -> Result<(), ReceiptError> {
    if tickets.is_empty() {
        writeln!(out, "No tickets.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Ticket", "Code", "Event", "Date", "Type", "Price", "Status"]);

    for ticket in tickets {
        builder.push_record([
            ticket.id.to_string(),
            ticket.ticket_code.clone(),
            ticket.event_title.clone(),
            ticket.event_date.clone(),
            ticket.ticket_type.clone(),
            format_brl(ticket.price),
            if ticket.used { "used" } else { "active" }.to_string(),
        ]);
    }

    write_table(out, builder, 5..6)
}

/// Write a single ticket with its QR payload.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ticket(out: &mut impl io::Write, ticket: &Ticket) -> Result<(), ReceiptError> {
    writeln!(out, "{} ({})", ticket.event_title, ticket.ticket_type)?;
    writeln!(out, "{} · {}", ticket.event_date, ticket.event_time)?;
    writeln!(out, "Code:   {}", ticket.ticket_code)?;
    writeln!(out, "Order:  {}", ticket.order_id)?;
    writeln!(out, "Bought: {}", ticket.purchase_date)?;
    writeln!(out, "Status: {}", if ticket.used { "used" } else { "active" })?;
    writeln!(out, "QR:     {}", ticket.qr_code)?;

    Ok(())
}

/// Write the purchase history.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_orders(out: &mut impl io::Write, orders: &[Order]) -> Result<(), ReceiptError> {
    if orders.is_empty() {
        writeln!(out, "No orders yet.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Order", "Date", "Tickets", "Payment", "Paid", "Status"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.date.strftime("%Y-%m-%d %H:%M").to_string(),
            order.ticket_count().to_string(),
            order.payment_method.to_string(),
            format_brl(order.amount_paid()),
            order.status.to_string(),
        ]);
    }

    write_table(out, builder, 4..5)
}

/// Write an order confirmation.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_confirmation(
    out: &mut impl io::Write,
    order: &Order,
    totals: &Totals,
    tickets: &[Ticket],
) -> Result<(), ReceiptError> {
    writeln!(out, "Order #{} confirmed.", order.id)?;

    write_cart(out, &order.items, totals)?;
    writeln!(out)?;
    write_tickets(out, tickets)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        cart::{LineItemId, NewLineItem},
        fixtures::Fixture,
        pricing::SERVICE_FEE,
    };

    fn line() -> CartLineItem {
        CartLineItem::new(
            LineItemId::now_v7(),
            NewLineItem {
                event_id: 1,
                event_title: "Neon Dreams".to_string(),
                event_date: "12 May, 2025".to_string(),
                event_time: "22:00 - 05:00".to_string(),
                event_image: "/assets/images/event1.jpg".to_string(),
                ticket_type: "VIP".to_string(),
                price: Decimal::from(150),
                quantity: 2,
            },
        )
    }

    fn render(
        write: impl FnOnce(&mut Vec<u8>) -> Result<(), ReceiptError>,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        write(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn cart_table_lists_lines_and_totals() -> TestResult {
        let totals = Totals::compute(Decimal::from(300), 2, SERVICE_FEE, Decimal::from(30));

        let text = render(|out| write_cart(out, &[line()], &totals))?;

        assert!(text.contains("Neon Dreams"), "missing event in {text}");
        assert!(text.contains("Service fee:"), "missing fee in {text}");
        assert!(text.contains("Discount:"), "missing discount in {text}");

        Ok(())
    }

    #[test]
    fn empty_cart_is_reported() -> TestResult {
        let text = render(|out| write_cart(out, &[], &Totals::default()))?;

        assert_eq!(text, "Your cart is empty.\n");

        Ok(())
    }

    #[test]
    fn sold_out_events_have_no_starting_price() -> TestResult {
        let catalog = Fixture::builtin()?.catalog();

        let text = render(|out| write_events(out, catalog.events()))?;

        assert!(text.contains("Techno Revolution"), "missing event in {text}");
        assert!(!text.contains("Sold out"), "unexpected sold out event in {text}");

        Ok(())
    }

    #[test]
    fn ticket_details_include_qr_payload() -> TestResult {
        let ticket = Ticket {
            id: "LUXE-1-1-1-0".into(),
            ticket_code: "LUXEAB12CD".to_string(),
            qr_code: "https://luxe.com/validate/LUXE-1-1-1-0/abc123".to_string(),
            event_id: 1,
            event_title: "Neon Dreams".to_string(),
            event_date: "12 May, 2025".to_string(),
            event_time: "22:00 - 05:00".to_string(),
            event_image: "/assets/images/event1.jpg".to_string(),
            ticket_type: "VIP".to_string(),
            price: Decimal::from(150),
            purchase_date: Timestamp::UNIX_EPOCH,
            order_id: "LUXE-1-1".into(),
            used: false,
        };

        let text = render(|out| write_ticket(out, &ticket))?;

        assert!(text.contains("LUXEAB12CD"), "missing code in {text}");
        assert!(text.contains("/validate/LUXE-1-1-1-0/abc123"), "missing QR in {text}");
        assert!(text.contains("active"), "missing status in {text}");

        Ok(())
    }
}
