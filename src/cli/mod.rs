use clap::{Parser, Subcommand};
use soundcart::{config::ClientConfig, observability};

mod checkout;
mod collection;
mod context;
mod login;
mod show;
mod track;

#[derive(Debug, Parser)]
#[command(name = "soundcart", about = "Music marketplace cart", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add a track to the cart
    AddTrack(track::AddTrackArgs),
    /// Remove a track from the cart
    RemoveTrack(track::RemoveTrackArgs),
    /// Add a collection to the cart
    AddCollection(collection::AddCollectionArgs),
    /// Remove a collection from the cart
    RemoveCollection(collection::RemoveCollectionArgs),
    /// Sign in and merge the guest cart into the account cart
    Login,
    /// Place the order for the current cart
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_logging(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Show => show::run(&self.config).await,
            Commands::AddTrack(args) => track::add(&self.config, args).await,
            Commands::RemoveTrack(args) => track::remove(&self.config, args).await,
            Commands::AddCollection(args) => collection::add(&self.config, args).await,
            Commands::RemoveCollection(args) => collection::remove(&self.config, args).await,
            Commands::Login => login::run(&self.config).await,
            Commands::Checkout(args) => checkout::run(&self.config, args).await,
        }
    }
}
