//! Checkout
//!
//! Opens a payment session for the synced cart, confirms the card payment when
//! one is needed and finalises the order.

pub mod errors;
pub mod models;
pub mod payments;
pub mod service;

pub use errors::CheckoutError;
pub use models::*;
pub use payments::*;
pub use service::CheckoutController;
