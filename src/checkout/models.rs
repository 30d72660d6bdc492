//! Checkout Models

/// Billing details sent with the order and to the payment gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// The signed-in user's profile, used to pre-fill billing details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&UserProfile> for BillingDetails {
    fn from(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
        }
    }
}

/// Checkout Phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// No payment session is open.
    #[default]
    Idle,

    /// The payment session is being opened.
    Initializing,

    /// Waiting for the buyer to submit.
    AwaitingPayment,

    /// Payment and order finalisation are in flight.
    Submitting,

    /// The order went through.
    Succeeded,
}

/// Why the last checkout step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutFailure {
    /// The payment gateway declined or could not confirm the card.
    Payment(String),

    /// The backend rejected the request.
    Backend(String),
}

impl CheckoutFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::Payment(message) | Self::Backend(message) => message,
        }
    }
}

/// Checkout Session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub billing: BillingDetails,

    /// Opaque payment-gateway session token.
    pub client_secret: Option<String>,

    /// False when the cart totals zero.
    pub payment_required: bool,

    pub phase: CheckoutPhase,

    /// Error from the last failed step, cleared when the next step starts.
    pub error: Option<CheckoutFailure>,
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self {
            billing: BillingDetails::default(),
            client_secret: None,
            payment_required: true,
            phase: CheckoutPhase::Idle,
            error: None,
        }
    }
}

impl CheckoutSession {
    /// Session for a new checkout, pre-filled from the user's profile.
    pub fn for_profile(profile: &UserProfile) -> Self {
        Self {
            billing: profile.into(),
            ..Self::default()
        }
    }

    /// Whether a request is outstanding.
    pub fn payment_in_progress(&self) -> bool {
        matches!(
            self.phase,
            CheckoutPhase::Initializing | CheckoutPhase::Submitting
        )
    }

    pub fn payment_success(&self) -> bool {
        self.phase == CheckoutPhase::Succeeded
    }

    /// Message of the last failed step.
    pub fn payment_error(&self) -> Option<&str> {
        self.error.as_ref().map(CheckoutFailure::message)
    }

    /// Whether the buyer can submit the order.
    pub fn can_submit(&self) -> bool {
        self.phase == CheckoutPhase::AwaitingPayment
    }
}
