//! Cart synchronization service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as FlightLock, watch};
use tracing::{debug, error, info, warn};

use crate::{
    cart::{Cart, CartId, CollectionId, CollectionLineItem, TrackId, TrackLineItem},
    gateway::{CartGateway, GatewayError, Requestor},
    notices::{Notice, Notifier},
    storage::AnonymousCartStore,
    sync::{
        errors::CartSyncError,
        state::{CartSnapshot, CartState},
    },
};

/// Keeps the local cart in step with the backend.
///
/// Local edits apply immediately and are published to subscribers before any
/// request is sent. Requests run one at a time in call order; a queued write
/// whose changes were already carried by an earlier write is skipped.
pub struct CartSync {
    gateway: Arc<dyn CartGateway>,
    store: Arc<dyn AnonymousCartStore>,
    notifier: Arc<dyn Notifier>,
    local: Mutex<Local>,
    flight: FlightLock<()>,
    events: watch::Sender<CartSnapshot>,
}

#[derive(Debug, Default)]
struct Local {
    cart: Cart,
    state: CartState,
    authenticated: bool,

    /// Bumped by every local edit that changes the cart's id lists.
    revision: u64,

    /// Highest revision the backend has acknowledged.
    synced_revision: u64,
}

impl Local {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart: self.cart.clone(),
            state: self.state.clone(),
            authenticated: self.authenticated,
        }
    }

    fn requestor(&self) -> Requestor {
        Requestor::from_authenticated(self.authenticated)
    }

    fn is_dirty(&self) -> bool {
        self.synced_revision < self.revision
    }
}

impl Debug for CartSync {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSync")
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

impl CartSync {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CartGateway>,
        store: Arc<dyn AnonymousCartStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = watch::channel(CartSnapshot::default());

        Self {
            gateway,
            store,
            notifier,
            local: Mutex::new(Local::default()),
            flight: FlightLock::new(()),
            events,
        }
    }

    /// Current cart, state and authentication flag.
    pub fn snapshot(&self) -> CartSnapshot {
        self.read_local(Local::snapshot)
    }

    /// Current cart.
    pub fn cart(&self) -> Cart {
        self.read_local(|local| local.cart.clone())
    }

    /// Receives a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.events.subscribe()
    }

    /// Restores the cart at the start of a session.
    ///
    /// Guests get back the cart remembered in the anonymous store, if any. Signed-in
    /// users get their account cart; a guest cart left over from before sign-in is
    /// merged into it.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read or a non-recoverable request
    /// fails. The cart is reset to empty in the latter case.
    pub async fn start(&self, authenticated: bool) -> Result<(), CartSyncError> {
        let _flight = self.flight.lock().await;

        self.update_local(|local| local.authenticated = authenticated);

        match (authenticated, self.store.load()?) {
            (false, None) => {
                debug!("no anonymous cart to restore");

                Ok(())
            }
            (false, Some(id)) => self.restore_anonymous(id).await,
            (true, Some(id)) => {
                if let Err(error) = self.restore_anonymous(id).await {
                    warn!(cart = %id, %error, "could not restore guest cart before merge");
                }

                self.sign_in().await
            }
            (true, None) => self.sign_in().await,
        }
    }

    /// Switches to the signed-in user's cart, merging any guest cart into it.
    ///
    /// # Errors
    ///
    /// Returns an error when the account cart cannot be fetched, merged or created.
    pub async fn login(&self) -> Result<(), CartSyncError> {
        let _flight = self.flight.lock().await;

        self.sign_in().await
    }

    /// Discards the cart when the user signs out.
    pub async fn logout(&self) {
        let _flight = self.flight.lock().await;

        self.update_local(|local| local.authenticated = false);
        self.reset();

        info!("cart discarded on logout");
    }

    /// Adds a track snapshot and saves the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the change. The track stays in
    /// the local cart.
    pub async fn add_track(&self, track: TrackLineItem) -> Result<(), CartSyncError> {
        self.edit(|cart| cart.add_track(track)).await
    }

    /// Removes a track and saves the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the change.
    pub async fn remove_track(&self, id: TrackId) -> Result<(), CartSyncError> {
        self.edit(|cart| cart.remove_track(id)).await
    }

    /// Adds a collection snapshot and saves the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the change. The collection stays
    /// in the local cart.
    pub async fn add_collection(&self, collection: CollectionLineItem) -> Result<(), CartSyncError> {
        self.edit(|cart| cart.add_collection(collection)).await
    }

    /// Removes a collection and saves the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the change.
    pub async fn remove_collection(&self, id: CollectionId) -> Result<(), CartSyncError> {
        self.edit(|cart| cart.remove_collection(id)).await
    }

    /// Creates the cart on the backend if it has no id yet, otherwise updates it.
    ///
    /// Does nothing when the backend already has every local change.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the new guest cart id cannot be
    /// stored.
    pub async fn create_or_update(&self) -> Result<(), CartSyncError> {
        let _flight = self.flight.lock().await;

        let Some((base, revision, requestor)) = self.read_local(|local| {
            local
                .is_dirty()
                .then(|| (local.cart.clone(), local.revision, local.requestor()))
        }) else {
            debug!("cart already saved");

            return Ok(());
        };

        let id = base.id();
        let payload = base.payload();

        let result = if base.is_persisted() {
            debug!(cart = %id, revision, "updating cart");

            self.gateway.update_cart(id, payload, requestor).await
        } else {
            debug!(revision, "creating cart");

            self.gateway.create_cart(payload, requestor).await
        };

        self.finish_write(result, revision, &base, requestor)
    }

    /// Forgets the purchased cart once an order has gone through.
    pub(crate) async fn clear_after_checkout(&self) -> Result<(), CartSyncError> {
        let _flight = self.flight.lock().await;

        self.reset();
        self.store.clear()?;

        Ok(())
    }

    async fn edit(&self, apply: impl FnOnce(&mut Cart)) -> Result<(), CartSyncError> {
        self.update_local(|local| {
            let before = local.cart.payload();

            apply(&mut local.cart);

            if local.cart.payload() != before {
                local.revision += 1;
            }
        });

        self.create_or_update().await
    }

    /// Fetches a guest cart by its remembered id. Any failure forgets the id and
    /// empties the cart; only failures other than "not found" are reported.
    async fn restore_anonymous(&self, id: CartId) -> Result<(), CartSyncError> {
        let (base, revision) = self.update_local(|local| {
            local.state = CartState::Loading;

            (local.cart.clone(), local.revision)
        });

        match self.gateway.get_cart_by_id(id, Requestor::Anonymous).await {
            Ok(cart) => {
                debug!(cart = %id, items = cart.total_item_count(), "restored guest cart");

                self.apply_fetch(cart, revision, &base);

                Ok(())
            }
            Err(error) if error.is_not_found() => {
                info!(cart = %id, "remembered guest cart no longer exists");

                self.reset();
                self.store.clear()?;

                Ok(())
            }
            Err(error) => {
                error!(cart = %id, %error, "failed to restore guest cart");

                self.reset();
                self.store.clear()?;
                self.notifier.notify(Notice::error(error.user_message()));

                Err(error.into())
            }
        }
    }

    /// Loads the signed-in user's cart. A non-empty local cart is merged into it,
    /// or becomes the account cart when the user has none.
    async fn sign_in(&self) -> Result<(), CartSyncError> {
        let (base, revision) = self.update_local(|local| {
            local.authenticated = true;
            local.state = if local.cart.is_empty() {
                CartState::Loading
            } else {
                CartState::Merging {
                    pending: local.cart.clone(),
                }
            };

            (local.cart.clone(), local.revision)
        });
        let pending = (!base.is_empty()).then(|| base.clone());

        // Signed-in users never keep a guest cart reference, even an empty one.
        self.store.clear()?;

        let fetched = self.gateway.get_cart_by_requestor().await;

        match (fetched, pending) {
            (Ok(account), Some(pending)) => {
                let payload = pending.payload().merged(&account.payload());

                info!(
                    cart = %account.id(),
                    tracks = payload.track_ids.len(),
                    collections = payload.collection_ids.len(),
                    "merging guest cart into account cart"
                );

                let result = self
                    .gateway
                    .update_cart(account.id(), payload, Requestor::Authenticated)
                    .await;

                self.finish_merge(result, revision, &base)
            }
            (Err(error), Some(pending)) => {
                info!(%error, "no account cart to merge into, creating one from guest cart");

                let result = self
                    .gateway
                    .create_cart(pending.payload(), Requestor::Authenticated)
                    .await;

                self.finish_merge(result, revision, &base)
            }
            (Ok(account), None) => {
                debug!(cart = %account.id(), "loaded account cart");

                self.apply_fetch(account, revision, &base);

                Ok(())
            }
            (Err(error), None) if error.is_not_found() => {
                debug!("signed-in user has no cart yet");

                self.reset();

                Ok(())
            }
            (Err(error), None) => {
                error!(%error, "failed to load account cart");

                self.reset();
                self.notifier.notify(Notice::error(error.user_message()));

                Err(error.into())
            }
        }
    }

    fn finish_merge(
        &self,
        result: Result<Cart, GatewayError>,
        revision: u64,
        base: &Cart,
    ) -> Result<(), CartSyncError> {
        let outcome = self.finish_write(result, revision, base, Requestor::Authenticated);

        if outcome.is_err() {
            // The guest cart id is gone, so a retry must save the items as a new
            // account cart.
            self.update_local(|local| {
                local.cart.set_id(CartId::default());
                local.revision += 1;
            });
        }

        outcome
    }

    fn finish_write(
        &self,
        result: Result<Cart, GatewayError>,
        revision: u64,
        base: &Cart,
        requestor: Requestor,
    ) -> Result<(), CartSyncError> {
        match result {
            Ok(cart) => {
                let id = cart.id();

                self.apply_write(cart, revision, base);

                if requestor == Requestor::Anonymous {
                    self.store.save(id)?;
                }

                Ok(())
            }
            Err(error) => {
                error!(%error, revision, "failed to save cart");

                let message = error.user_message();

                self.update_local(|local| {
                    local.state = CartState::Failed {
                        message: message.clone(),
                    };
                });
                self.notifier.notify(Notice::error(message));

                Err(error.into())
            }
        }
    }

    /// Applies a create/update response sent at `revision`, when the cart
    /// looked like `base`. Edits made since then are replayed onto the response
    /// and left for the queued write.
    fn apply_write(&self, server: Cart, revision: u64, base: &Cart) {
        self.update_local(|local| {
            local.synced_revision = local.synced_revision.max(revision);
            local.cart = rebase(server, revision, base, local);
            local.state = CartState::Synced;
        });
    }

    /// Applies a fetched cart. Edits made while the fetch was in flight are
    /// replayed onto it and left dirty for the next write.
    fn apply_fetch(&self, server: Cart, revision: u64, base: &Cart) {
        self.update_local(|local| {
            if local.revision == revision {
                local.synced_revision = revision;
            }

            local.cart = rebase(server, revision, base, local);
            local.state = CartState::Synced;
        });
    }

    fn reset(&self) {
        self.update_local(|local| {
            local.cart = Cart::new();
            local.state = CartState::Empty;
            local.synced_revision = local.revision;
        });
    }

    fn read_local<R>(&self, read: impl FnOnce(&Local) -> R) -> R {
        read(&self.local.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn update_local<R>(&self, update: impl FnOnce(&mut Local) -> R) -> R {
        let mut local = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        let result = update(&mut local);

        self.events.send_replace(local.snapshot());

        result
    }
}

/// The cart to keep after a response for `revision`: the response itself, or
/// the response with any later local edits replayed onto it.
fn rebase(server: Cart, revision: u64, base: &Cart, local: &Local) -> Cart {
    if local.revision == revision {
        return server;
    }

    let mut cart = server;

    cart.replay_edits(base, &local.cart);

    cart
}
