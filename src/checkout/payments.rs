//! Card payment seam.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::checkout::models::BillingDetails;

/// A card payment the gateway confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub payment_intent_id: String,
}

/// Payment gateway failure, carrying the message to show next to the card form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PaymentGatewayError {
    pub message: String,
}

impl PaymentGatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirms the card payment for the session identified by `client_secret`.
    async fn confirm_card_payment(
        &self,
        client_secret: String,
        billing: BillingDetails,
    ) -> Result<PaymentConfirmation, PaymentGatewayError>;
}

/// Payment gateway for environments with no card form, e.g. the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePaymentGateway;

#[async_trait]
impl PaymentGateway for UnavailablePaymentGateway {
    async fn confirm_card_payment(
        &self,
        _client_secret: String,
        _billing: BillingDetails,
    ) -> Result<PaymentConfirmation, PaymentGatewayError> {
        Err(PaymentGatewayError::new(
            "Card payment is not available here. Complete this purchase in the web store.",
        ))
    }
}
