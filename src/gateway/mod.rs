//! Cart persistence gateway.

pub mod client;
pub mod errors;
pub mod service;

pub use client::{GatewayConfig, HttpCartGateway};
pub use errors::GatewayError;
pub use service::*;
