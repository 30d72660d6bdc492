use clap::Args;
use soundcart::{
    cart::{ArtistId, ArtistRef, TrackId, TrackLineItem},
    config::ClientConfig,
    prices::Price,
};

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub(crate) struct AddTrackArgs {
    /// Track id
    #[arg(long)]
    id: u64,

    /// Track title
    #[arg(long)]
    title: String,

    /// Price in minor units, e.g. 300 for $3.00
    #[arg(long)]
    price: i64,

    /// ISO currency code of the price
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Artist id
    #[arg(long)]
    artist_id: u64,

    /// Artist name
    #[arg(long)]
    artist_name: String,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveTrackArgs {
    /// Track id
    #[arg(long)]
    id: u64,
}

pub(crate) async fn add(config: &ClientConfig, args: AddTrackArgs) -> Result<(), String> {
    let context = Context::open(config).await?;

    context
        .cart
        .add_track(TrackLineItem {
            id: TrackId::new(args.id),
            title: args.title,
            price: Price::new(args.price, args.currency),
            artist: ArtistRef {
                id: ArtistId::new(args.artist_id),
                name: args.artist_name,
            },
        })
        .await
        .map_err(|error| format!("failed to add track: {}", error.user_message()))?;

    context.print_cart()
}

pub(crate) async fn remove(config: &ClientConfig, args: RemoveTrackArgs) -> Result<(), String> {
    let context = Context::open(config).await?;

    context
        .cart
        .remove_track(TrackId::new(args.id))
        .await
        .map_err(|error| format!("failed to remove track: {}", error.user_message()))?;

    context.print_cart()
}
