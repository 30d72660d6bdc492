use soundcart::config::ClientConfig;

use crate::cli::context::Context;

pub(crate) async fn run(config: &ClientConfig) -> Result<(), String> {
    Context::open(config).await?.print_cart()
}
