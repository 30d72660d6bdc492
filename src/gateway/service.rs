//! Cart gateway service.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{Cart, CartId, CartPayload},
    gateway::errors::GatewayError,
};

/// Who a cart request is made on behalf of.
///
/// Anonymous requests address a guest cart purely by id; authenticated requests
/// carry the signed-in user's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requestor {
    /// Guest, no credentials sent.
    Anonymous,

    /// Signed-in user, bearer token sent.
    Authenticated,
}

impl Requestor {
    #[must_use]
    pub fn from_authenticated(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

/// Payment session opened for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutIntent {
    /// False when the cart totals zero and no card payment is needed.
    pub payment_required: bool,

    /// Opaque payment-gateway session token.
    #[serde(
        rename = "stripeClientSecret",
        alias = "stripClientSecret",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub client_secret: Option<String>,
}

/// Order finalisation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
}

#[automock]
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Creates a cart holding the given items.
    async fn create_cart(
        &self,
        payload: CartPayload,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError>;

    /// Retrieves a cart by id.
    async fn get_cart_by_id(&self, id: CartId, requestor: Requestor)
    -> Result<Cart, GatewayError>;

    /// Retrieves the signed-in user's cart.
    async fn get_cart_by_requestor(&self) -> Result<Cart, GatewayError>;

    /// Replaces the contents of an existing cart.
    async fn update_cart(
        &self,
        id: CartId,
        payload: CartPayload,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError>;

    /// Opens a payment session for the cart.
    async fn initialize_checkout(
        &self,
        cart: CartId,
        requestor: Requestor,
    ) -> Result<CheckoutIntent, GatewayError>;

    /// Finalises the order for the cart.
    async fn checkout(
        &self,
        cart: CartId,
        request: CheckoutRequest,
        requestor: Requestor,
    ) -> Result<(), GatewayError>;
}
