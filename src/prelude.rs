//! soundcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        ArtistRef, Cart, CartId, CartPayload, CollectionId, CollectionLineItem, TrackId,
        TrackLineItem,
    },
    checkout::{
        BillingDetails, CheckoutController, CheckoutError, CheckoutPhase, CheckoutSession,
        PaymentGateway, UserProfile,
    },
    gateway::{CartGateway, GatewayConfig, GatewayError, HttpCartGateway, Requestor},
    notices::{Notice, NoticeLevel, Notifier, TracingNotifier},
    prices::{Price, PriceError},
    storage::{AnonymousCartStore, FileCartStore, MemoryCartStore, StoreError},
    sync::{CartSnapshot, CartState, CartSync, CartSyncError},
};
