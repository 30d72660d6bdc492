//! Gateway errors.

use thiserror::Error;

/// Message shown to users when the backend gives no usable reason.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again.";

/// Cart gateway error variants.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Cart was not found.
    #[error("cart not found")]
    NotFound,

    /// Backend answered with a non-success status.
    #[error("backend rejected the request with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,

        /// Backend's own explanation, if it sent one.
        message: Option<String>,
    },

    /// No access token was configured for an authenticated request.
    #[error("authenticated request attempted without an access token")]
    MissingCredentials,

    /// Request could not be sent or its response could not be read.
    #[error("http error")]
    Http(#[from] reqwest::Error),
}

impl GatewayError {
    /// Text suitable for a user-facing notice: the backend's own message when it
    /// sent one, otherwise [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::NotFound
            | Self::Rejected { .. }
            | Self::MissingCredentials
            | Self::Http(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Whether the addressed cart no longer exists on the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
