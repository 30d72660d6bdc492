//! Checkout errors.

use thiserror::Error;

use crate::{
    checkout::{models::CheckoutPhase, payments::PaymentGatewayError},
    gateway::GatewayError,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session is not in a phase that accepts the requested step.
    #[error("checkout cannot continue while {0:?}")]
    NotReady(CheckoutPhase),

    /// Payment is required but the backend issued no payment session.
    #[error("no payment session was opened for this cart")]
    MissingClientSecret,

    #[error("card payment failed")]
    Payment(#[from] PaymentGatewayError),

    #[error("checkout request failed")]
    Gateway(#[from] GatewayError),
}
