//! Cart synchronization.

pub mod errors;
pub mod service;
pub mod state;

pub use errors::CartSyncError;
pub use service::CartSync;
pub use state::{CartSnapshot, CartState};
