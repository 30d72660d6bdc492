//! soundcart
//!
//! soundcart is the cart and checkout core of a music marketplace client. It keeps a
//! local cart in step with the marketplace REST API, folds a guest cart into the
//! signed-in user's cart, opens payment sessions and places orders.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod gateway;
pub mod ids;
pub mod notices;
pub mod observability;
pub mod prelude;
pub mod prices;
pub mod storage;
pub mod sync;
pub mod uploads;
