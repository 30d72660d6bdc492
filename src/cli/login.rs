use soundcart::config::ClientConfig;

use crate::cli::context::Context;

/// Opening a signed-in session merges any remembered guest cart.
pub(crate) async fn run(config: &ClientConfig) -> Result<(), String> {
    if !config.api.is_authenticated() {
        return Err("login requires --access-token or SOUNDCART_ACCESS_TOKEN".to_string());
    }

    Context::open(config).await?.print_cart()
}
