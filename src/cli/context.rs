use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    io,
    sync::Arc,
};

use soundcart::{
    cart::write_cart_table,
    config::ClientConfig,
    gateway::{CartGateway, HttpCartGateway},
    notices::{Notifier, TracingNotifier},
    sync::CartSync,
};

/// Collaborators shared by every command, with the cart already restored.
pub(crate) struct Context {
    pub(crate) gateway: Arc<dyn CartGateway>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) cart: Arc<CartSync>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Context")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Connects to the API and restores the cart for this session.
    pub(crate) async fn open(config: &ClientConfig) -> Result<Self, String> {
        let gateway: Arc<dyn CartGateway> = Arc::new(
            HttpCartGateway::new(config.api.gateway_config())
                .map_err(|error| format!("failed to build API client: {error}"))?,
        );
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        let cart = Arc::new(CartSync::new(
            Arc::clone(&gateway),
            Arc::new(config.state.store()),
            Arc::clone(&notifier),
        ));

        cart.start(config.api.is_authenticated())
            .await
            .map_err(|error| format!("failed to load cart: {}", error.user_message()))?;

        Ok(Self {
            gateway,
            notifier,
            cart,
        })
    }

    /// Prints the cart to stdout.
    pub(crate) fn print_cart(&self) -> Result<(), String> {
        write_cart_table(io::stdout().lock(), &self.cart.cart())
            .map_err(|error| format!("failed to write cart: {error}"))
    }
}
