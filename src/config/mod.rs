//! Client configuration module

use clap::Args;

use crate::config::{api::ApiConfig, logging::LoggingConfig, state::StateConfig};

pub mod api;
pub mod logging;
pub mod state;

pub use logging::LogFormat;

/// soundcart client configuration
#[derive(Debug, Args)]
pub struct ClientConfig {
    /// Marketplace API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Local state settings.
    #[command(flatten)]
    pub state: StateConfig,
}

/// Load `.env` from the working directory if present.
pub fn load_dotenv() {
    _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ClientConfig,
    }

    #[test]
    fn explicit_arguments_build_gateway_config() -> TestResult {
        let cli = TestCli::try_parse_from([
            "soundcart",
            "--api-url",
            "https://api.example.com",
            "--access-token",
            "tok",
            "--request-timeout-seconds",
            "3",
            "--state-file",
            "/tmp/cart.json",
            "--log-format",
            "json",
        ])?;

        let gateway = cli.config.api.gateway_config();

        assert_eq!(gateway.base_url, "https://api.example.com");
        assert_eq!(gateway.access_token.as_deref(), Some("tok"));
        assert_eq!(gateway.timeout, Duration::from_secs(3));
        assert!(cli.config.api.is_authenticated());
        assert!(matches!(cli.config.logging.log_format, LogFormat::Json));
        assert_eq!(
            cli.config.state.store().path(),
            std::path::Path::new("/tmp/cart.json")
        );

        Ok(())
    }

    #[test]
    fn blank_access_token_counts_as_signed_out() -> TestResult {
        let cli = TestCli::try_parse_from(["soundcart", "--access-token", "  "])?;

        assert!(!cli.config.api.is_authenticated());
        assert_eq!(cli.config.api.gateway_config().access_token, None);

        Ok(())
    }
}
