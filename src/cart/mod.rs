//! Carts

pub mod models;
pub mod records;
mod table;

pub use models::*;
pub use records::{CartPayload, CartRecord};
pub use table::write_cart_table;
