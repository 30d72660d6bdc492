use clap::Args;
use soundcart::{
    cart::{ArtistId, ArtistRef, CollectionId, CollectionLineItem},
    config::ClientConfig,
    prices::Price,
};

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub(crate) struct AddCollectionArgs {
    /// Collection id
    #[arg(long)]
    id: u64,

    /// Collection name
    #[arg(long)]
    name: String,

    /// Price in minor units, e.g. 900 for $9.00
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
pub(crate) struct RemoveCollectionArgs {
    /// Collection id
    #[arg(long)]
    id: u64,
}

pub(crate) async fn add(config: &ClientConfig, args: AddCollectionArgs) -> Result<(), String> {
    let context = Context::open(config).await?;

    context
        .cart
        .add_collection(CollectionLineItem {
            id: CollectionId::new(args.id),
            name: args.name,
            price: Price::new(args.price, args.currency),
            artist: ArtistRef {
                id: ArtistId::new(args.artist_id),
                name: args.artist_name,
            },
        })
        .await
        .map_err(|error| format!("failed to add collection: {}", error.user_message()))?;

    context.print_cart()
}

pub(crate) async fn remove(
    config: &ClientConfig,
    args: RemoveCollectionArgs,
) -> Result<(), String> {
    let context = Context::open(config).await?;

    context
        .cart
        .remove_collection(CollectionId::new(args.id))
        .await
        .map_err(|error| format!("failed to remove collection: {}", error.user_message()))?;

    context.print_cart()
}
