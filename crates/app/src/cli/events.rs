use std::io;

use clap::Args;
use luxe::{
    catalog::{Event, EventId},
    context::AppContext,
    receipt,
};

use super::output_error;

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Only featured events
    #[arg(long)]
    featured: bool,

    /// Only events of this genre
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Args)]
pub struct EventArgs {
    /// Event id
    id: EventId,
}

pub(crate) fn list(
    context: &AppContext,
    args: &EventsArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let events: Vec<&Event> = match args.category.as_deref() {
        Some(category) => context
            .catalog
            .by_category(category)
            .filter(|event| !args.featured || event.featured)
            .collect(),
        None if args.featured => context.catalog.featured().collect(),
        None => context.catalog.events().iter().collect(),
    };

    if events.is_empty() {
        return writeln!(out, "No events found.").map_err(output_error);
    }

    receipt::write_events(out, events).map_err(output_error)
}

pub(crate) fn show(
    context: &AppContext,
    args: &EventArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let event = context.catalog.event(args.id).map_err(|error| error.to_string())?;

    receipt::write_event(out, event).map_err(output_error)
}
