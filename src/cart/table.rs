//! Cart table rendering for terminal output.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{cart::models::Cart, prices::Price};

/// Writes the cart as a table followed by its item count and total.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_cart_table(mut out: impl io::Write, cart: &Cart) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["Kind", "Id", "Title", "Artist", "Price"]);

    for track in cart.tracks() {
        builder.push_record([
            "track".to_string(),
            track.id.to_string(),
            track.title.clone(),
            track.artist.name.clone(),
            price_cell(&track.price),
        ]);
    }

    for collection in cart.collections() {
        builder.push_record([
            "collection".to_string(),
            collection.id.to_string(),
            collection.name.clone(),
            collection.artist.name.clone(),
            price_cell(&collection.price),
        ]);
    }

    let mut table = builder.build();

    table
        .with(Style::rounded())
        .modify(Columns::last(), Alignment::right());

    writeln!(out, "{table}")?;

    let total = cart
        .formatted_total()
        .unwrap_or_else(|error| format!("unavailable ({error})"));

    if cart.is_persisted() {
        writeln!(out, "Cart #{}", cart.id())?;
    } else {
        writeln!(out, "Cart (not saved yet)")?;
    }

    writeln!(out, "Items: {}", cart.total_item_count())?;
    writeln!(out, "Total: {total}")?;

    Ok(())
}

fn price_cell(price: &Price) -> String {
    if price.is_free() {
        return "free".to_string();
    }

    price
        .formatted()
        .unwrap_or_else(|_| format!("{} {}", price.amount(), price.currency_code()))
}
