//! Cart synchronization errors.

use thiserror::Error;

use crate::{gateway::GatewayError, storage::StoreError};

/// Cart sync error variants.
#[derive(Debug, Error)]
pub enum CartSyncError {
    /// Backend request failed.
    #[error("cart request failed")]
    Gateway(#[from] GatewayError),

    /// Anonymous cart id could not be read or written.
    #[error("anonymous cart storage failed")]
    Store(#[from] StoreError),
}

impl CartSyncError {
    /// Text suitable for a user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(error) => error.user_message(),
            Self::Store(error) => error.to_string(),
        }
    }
}
