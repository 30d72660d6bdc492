//! HTTP client for the marketplace cart endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartId, CartPayload, CartRecord},
    gateway::{
        errors::GatewayError,
        service::{CartGateway, CheckoutIntent, CheckoutRequest, Requestor},
    },
};

/// Configuration for connecting to the marketplace API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API base address, e.g. `"https://api.example.com"`.
    pub base_url: String,

    /// Bearer token sent with authenticated requests.
    pub access_token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// [`CartGateway`] backed by the marketplace REST API.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    config: GatewayConfig,
    http: Client,
}

impl HttpCartGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        requestor: Requestor,
    ) -> Result<RequestBuilder, GatewayError> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let builder = self.http.request(method, url);

        match requestor {
            Requestor::Anonymous => Ok(builder),
            Requestor::Authenticated => {
                let token = self
                    .config
                    .access_token
                    .as_deref()
                    .ok_or(GatewayError::MissingCredentials)?;

                Ok(builder.bearer_auth(token))
            }
        }
    }

    async fn fetch_cart(&self, builder: RequestBuilder) -> Result<Cart, GatewayError> {
        let record: CartRecord = read_json(builder.send().await?).await?;

        Ok(record.into())
    }
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    async fn create_cart(
        &self,
        payload: CartPayload,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError> {
        debug!(?requestor, items = payload.track_ids.len() + payload.collection_ids.len(), "creating cart");

        let builder = self.request(Method::POST, "/cart", requestor)?.json(&payload);

        self.fetch_cart(builder).await
    }

    async fn get_cart_by_id(
        &self,
        id: CartId,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError> {
        debug!(cart = %id, ?requestor, "fetching cart");

        let builder = self.request(Method::GET, &format!("/cart/{id}"), requestor)?;

        self.fetch_cart(builder).await
    }

    async fn get_cart_by_requestor(&self) -> Result<Cart, GatewayError> {
        debug!("fetching cart of signed-in user");

        let builder = self.request(Method::GET, "/cart", Requestor::Authenticated)?;

        self.fetch_cart(builder).await
    }

    async fn update_cart(
        &self,
        id: CartId,
        payload: CartPayload,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError> {
        debug!(cart = %id, ?requestor, "updating cart");

        let builder = self
            .request(Method::PUT, &format!("/cart/{id}"), requestor)?
            .json(&payload);

        self.fetch_cart(builder).await
    }

    async fn initialize_checkout(
        &self,
        cart: CartId,
        requestor: Requestor,
    ) -> Result<CheckoutIntent, GatewayError> {
        debug!(%cart, ?requestor, "initializing checkout");

        let response = self
            .request(
                Method::POST,
                &format!("/cart/{cart}/checkout/initialize"),
                requestor,
            )?
            .send()
            .await?;

        read_json(response).await
    }

    async fn checkout(
        &self,
        cart: CartId,
        request: CheckoutRequest,
        requestor: Requestor,
    ) -> Result<(), GatewayError> {
        debug!(%cart, ?requestor, "submitting checkout");

        let response = self
            .request(Method::POST, &format!("/cart/{cart}/checkout"), requestor)?
            .json(&request)
            .send()
            .await?;

        check_status(response).await?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message);

    warn!(status = status.as_u16(), ?message, "cart request rejected");

    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    Ok(check_status(response).await?.json().await?)
}
