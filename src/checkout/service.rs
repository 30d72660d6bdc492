//! Checkout session controller.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as FlightLock, watch};
use tracing::{debug, error, info, warn};

use crate::{
    checkout::{
        errors::CheckoutError,
        models::{BillingDetails, CheckoutFailure, CheckoutPhase, CheckoutSession, UserProfile},
        payments::PaymentGateway,
    },
    gateway::{CartGateway, CheckoutRequest, Requestor},
    notices::{Notice, Notifier},
    sync::CartSync,
};

/// Notice shown once an order has gone through.
pub const ORDER_COMPLETE_MESSAGE: &str = "Thank you! Your order is complete.";

/// Drives a checkout for the cart held by a [`CartSync`].
pub struct CheckoutController {
    cart: Arc<CartSync>,
    gateway: Arc<dyn CartGateway>,
    payments: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    session: Mutex<CheckoutSession>,
    flight: FlightLock<()>,
    events: watch::Sender<CheckoutSession>,
}

impl Debug for CheckoutController {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CheckoutController")
            .field("cart", &self.cart)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl CheckoutController {
    #[must_use]
    pub fn new(
        cart: Arc<CartSync>,
        gateway: Arc<dyn CartGateway>,
        payments: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = watch::channel(CheckoutSession::default());

        Self {
            cart,
            gateway,
            payments,
            notifier,
            session: Mutex::new(CheckoutSession::default()),
            flight: FlightLock::new(()),
            events,
        }
    }

    /// Current session.
    pub fn session(&self) -> CheckoutSession {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receives the session after every change.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutSession> {
        self.events.subscribe()
    }

    /// Starts a fresh checkout with billing details taken from the user's profile.
    pub fn begin(&self, profile: &UserProfile) {
        self.update_session(|session| *session = CheckoutSession::for_profile(profile));
    }

    /// Replaces the billing details.
    pub fn set_billing(&self, billing: BillingDetails) {
        self.update_session(|session| session.billing = billing);
    }

    /// Opens a payment session for the cart.
    ///
    /// Does nothing while the cart is unsaved or empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend refuses to open the session.
    pub async fn initialize(&self) -> Result<(), CheckoutError> {
        let _flight = self.flight.lock().await;

        let snapshot = self.cart.snapshot();

        if !snapshot.cart.is_persisted() || snapshot.cart.is_empty() {
            debug!(cart = %snapshot.cart.id(), "cart not ready for checkout");

            return Ok(());
        }

        self.update_session(|session| {
            session.phase = CheckoutPhase::Initializing;
            session.error = None;
        });

        let cart_id = snapshot.cart.id();
        let requestor = Requestor::from_authenticated(snapshot.authenticated);

        match self.gateway.initialize_checkout(cart_id, requestor).await {
            Ok(intent) => {
                info!(
                    cart = %cart_id,
                    payment_required = intent.payment_required,
                    "checkout initialized"
                );

                self.update_session(|session| {
                    session.client_secret = intent.client_secret;
                    session.payment_required = intent.payment_required;
                    session.phase = CheckoutPhase::AwaitingPayment;
                });

                Ok(())
            }
            Err(error) => {
                error!(cart = %cart_id, %error, "failed to initialize checkout");

                let message = error.user_message();

                self.update_session(|session| {
                    session.phase = CheckoutPhase::Idle;
                    session.error = Some(CheckoutFailure::Backend(message.clone()));
                });
                self.notifier.notify(Notice::error(message));

                Err(error.into())
            }
        }
    }

    /// Pays for the cart if needed and places the order.
    ///
    /// A declined card leaves the error on the session and allows another attempt.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotReady`]: no payment session is awaiting submission, or
    ///   the cart it was opened for has since been discarded.
    /// - [`CheckoutError::MissingClientSecret`]: payment is required but no session secret was issued.
    /// - [`CheckoutError::Payment`]: the payment gateway did not confirm the card.
    /// - [`CheckoutError::Gateway`]: the backend rejected the order.
    pub async fn checkout(&self) -> Result<(), CheckoutError> {
        let _flight = self.flight.lock().await;

        let session = self.session();

        if !session.can_submit() {
            return Err(CheckoutError::NotReady(session.phase));
        }

        let snapshot = self.cart.snapshot();

        if !snapshot.cart.is_persisted() {
            warn!("cart was discarded after checkout was initialized");

            self.update_session(|session| {
                session.phase = CheckoutPhase::Idle;
                session.client_secret = None;
            });

            return Err(CheckoutError::NotReady(CheckoutPhase::Idle));
        }

        self.update_session(|session| {
            session.phase = CheckoutPhase::Submitting;
            session.error = None;
        });

        let cart_id = snapshot.cart.id();
        let requestor = Requestor::from_authenticated(snapshot.authenticated);

        let payment_intent_id = if session.payment_required {
            Some(self.confirm_payment(&session).await?)
        } else {
            debug!(cart = %cart_id, "no payment required");

            None
        };

        let request = CheckoutRequest {
            first_name: session.billing.first_name,
            last_name: session.billing.last_name,
            email: session.billing.email,
            payment_intent_id,
        };

        if let Err(error) = self.gateway.checkout(cart_id, request, requestor).await {
            error!(cart = %cart_id, %error, "checkout rejected");

            let message = error.user_message();

            self.update_session(|session| {
                session.phase = CheckoutPhase::AwaitingPayment;
                session.error = Some(CheckoutFailure::Backend(message.clone()));
            });
            self.notifier.notify(Notice::error(message));

            return Err(error.into());
        }

        info!(cart = %cart_id, "order complete");

        if let Err(error) = self.cart.clear_after_checkout().await {
            warn!(cart = %cart_id, %error, "failed to forget purchased cart");
        }

        self.update_session(|session| {
            session.phase = CheckoutPhase::Succeeded;
            session.client_secret = None;
        });
        self.notifier.notify(Notice::success(ORDER_COMPLETE_MESSAGE));

        Ok(())
    }

    /// Confirms the card payment. Failures stay on the session without a notice.
    async fn confirm_payment(&self, session: &CheckoutSession) -> Result<String, CheckoutError> {
        let Some(client_secret) = session.client_secret.clone() else {
            warn!("payment required but no client secret was issued");

            self.return_to_payment(CheckoutFailure::Payment(
                CheckoutError::MissingClientSecret.to_string(),
            ));

            return Err(CheckoutError::MissingClientSecret);
        };

        match self
            .payments
            .confirm_card_payment(client_secret, session.billing.clone())
            .await
        {
            Ok(confirmation) => {
                debug!(payment_intent = %confirmation.payment_intent_id, "card payment confirmed");

                Ok(confirmation.payment_intent_id)
            }
            Err(error) => {
                warn!(%error, "card payment failed");

                self.return_to_payment(CheckoutFailure::Payment(error.message.clone()));

                Err(error.into())
            }
        }
    }

    fn return_to_payment(&self, failure: CheckoutFailure) {
        self.update_session(|session| {
            session.phase = CheckoutPhase::AwaitingPayment;
            session.error = Some(failure);
        });
    }

    fn update_session(&self, update: impl FnOnce(&mut CheckoutSession)) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        update(&mut session);

        self.events.send_replace(session.clone());
    }
}
