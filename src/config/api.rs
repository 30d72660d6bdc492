//! API Config

use std::time::Duration;

use clap::Args;

use crate::gateway::GatewayConfig;

/// Marketplace API settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Marketplace API base URL
    #[arg(long, env = "SOUNDCART_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Access token of the signed-in user; omit to shop as a guest
    #[arg(long, env = "SOUNDCART_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SOUNDCART_REQUEST_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    /// Whether requests are made on behalf of a signed-in user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Settings for [`crate::gateway::HttpCartGateway`].
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.api_url.clone(),
            access_token: self.token().map(str::to_string),
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }

    fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
