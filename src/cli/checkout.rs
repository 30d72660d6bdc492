use std::sync::Arc;

use clap::Args;
use soundcart::{
    checkout::{CheckoutController, CheckoutPhase, UnavailablePaymentGateway, UserProfile},
    config::ClientConfig,
};
use tracing::info;

use crate::cli::context::Context;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Billing first name
    #[arg(long)]
    first_name: String,

    /// Billing last name
    #[arg(long)]
    last_name: String,

    /// Billing email address
    #[arg(long)]
    email: String,
}

/// Places the order. Carts that need a card payment are refused; free carts
/// complete without one.
pub(crate) async fn run(config: &ClientConfig, args: CheckoutArgs) -> Result<(), String> {
    let context = Context::open(config).await?;

    context.print_cart()?;

    let checkout = CheckoutController::new(
        Arc::clone(&context.cart),
        Arc::clone(&context.gateway),
        Arc::new(UnavailablePaymentGateway),
        Arc::clone(&context.notifier),
    );

    checkout.begin(&UserProfile {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
    });

    checkout
        .initialize()
        .await
        .map_err(|error| format!("failed to start checkout: {error}"))?;

    if checkout.session().phase == CheckoutPhase::Idle {
        return Err("cart is empty or has not been saved yet".to_string());
    }

    if let Err(error) = checkout.checkout().await {
        let session = checkout.session();
        let reason = session
            .payment_error()
            .map_or_else(|| error.to_string(), str::to_string);

        return Err(format!("checkout failed: {reason}"));
    }

    info!("order placed");

    context.print_cart()
}
