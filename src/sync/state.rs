//! Cart synchronization state.

use crate::cart::Cart;

/// Where the local cart stands relative to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CartState {
    /// No backend cart is known.
    #[default]
    Empty,

    /// A cart is being fetched.
    Loading,

    /// The local cart reflects the last backend response.
    Synced,

    /// A guest cart is being folded into the signed-in user's cart.
    Merging { pending: Cart },

    /// The last create or update was rejected; the local cart was kept as-is.
    Failed { message: String },
}

/// Published on every change to the cart or its state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub cart: Cart,
    pub state: CartState,
    pub authenticated: bool,
}
