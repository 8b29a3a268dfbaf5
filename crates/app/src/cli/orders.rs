use std::io;

use clap::Args;
use luxe::{context::AppContext, orders::OrderId, pricing::Totals, receipt};

use super::{output_error, signed_in};

#[derive(Debug, Args)]
pub struct OrdersArgs {
    /// Show this order and its tickets
    id: Option<String>,
}

pub(crate) fn run(
    context: &AppContext,
    args: &OrdersArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    signed_in(context)?;

    let Some(id) = args.id.as_deref() else {
        return receipt::write_orders(out, &context.wallet.purchase_history())
            .map_err(output_error);
    };

    let id = OrderId::from(id);
    let order = context.wallet.order(&id).map_err(|error| error.to_string())?;

    let totals = Totals {
        subtotal: order.total,
        service_fee: order.service_fee,
        discount: order.discount,
        total: order.amount_paid(),
    };

    writeln!(
        out,
        "Order #{} · {} · {}",
        order.id,
        order.date.strftime("%Y-%m-%d %H:%M"),
        order.payment_method
    )
    .map_err(output_error)?;

    receipt::write_cart(out, &order.items, &totals).map_err(output_error)?;
    writeln!(out).map_err(output_error)?;
    receipt::write_tickets(out, &context.wallet.tickets_for_order(&id)).map_err(output_error)
}
