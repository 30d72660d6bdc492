//! In-memory marketplace backend shared by the integration tests.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use soundcart::{
    cart::{
        ArtistId, ArtistRef, Cart, CartId, CartPayload, CollectionId, CollectionLineItem, TrackId,
        TrackLineItem,
    },
    gateway::{CartGateway, CheckoutIntent, CheckoutRequest, GatewayError, Requestor},
    notices::{Notice, Notifier},
    prices::Price,
};

/// A request the backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(Requestor, Vec<u64>),
    GetById(u64),
    GetByRequestor,
    Update(u64, Requestor, Vec<u64>),
    InitializeCheckout(u64),
    Checkout(u64, Option<String>),
}

#[derive(Debug, Default)]
struct State {
    tracks: BTreeMap<TrackId, TrackLineItem>,
    collections: BTreeMap<CollectionId, CollectionLineItem>,
    carts: BTreeMap<u64, CartPayload>,
    account_cart: Option<u64>,
    next_id: u64,
    calls: Vec<Call>,
    orders: Vec<(u64, CheckoutRequest)>,
}

/// Cart backend holding carts and a small catalogue in memory.
///
/// Every call yields to the runtime once before answering, so concurrent
/// callers interleave the way they would against a real server.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

fn artist() -> ArtistRef {
    ArtistRef {
        id: ArtistId::new(3),
        name: "Low Tide".to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();

        backend.with_state(|state| state.next_id = 100);

        backend
    }

    pub fn with_track(self, id: u64, cents: i64) -> Self {
        self.with_state(|state| {
            state.tracks.insert(TrackId::new(id), track(id, cents));
        });

        self
    }

    pub fn with_collection(self, id: u64, cents: i64) -> Self {
        self.with_state(|state| {
            state
                .collections
                .insert(CollectionId::new(id), collection(id, cents));
        });

        self
    }

    /// Gives the signed-in user an existing cart holding `track_ids`.
    pub fn with_account_cart(self, id: u64, track_ids: &[u64]) -> Self {
        self.with_state(|state| {
            state.carts.insert(
                id,
                CartPayload {
                    track_ids: track_ids.iter().copied().map(TrackId::new).collect(),
                    collection_ids: Vec::new(),
                },
            );
            state.account_cart = Some(id);
        });

        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|state| state.calls.clone())
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Create(..)))
            .count()
    }

    pub fn account_cart(&self) -> Option<u64> {
        self.with_state(|state| state.account_cart)
    }

    pub fn orders(&self) -> Vec<(u64, CheckoutRequest)> {
        self.with_state(|state| state.orders.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn render(state: &State, id: u64) -> Result<Cart, GatewayError> {
        let payload = state.carts.get(&id).ok_or(GatewayError::NotFound)?;

        let tracks = payload
            .track_ids
            .iter()
            .map(|track| state.tracks.get(track).cloned().ok_or_else(|| not_for_sale(*track)))
            .collect::<Result<Vec<_>, _>>()?;

        let collections = payload
            .collection_ids
            .iter()
            .filter_map(|collection| state.collections.get(collection).cloned())
            .collect::<Vec<_>>();

        Ok(Cart::with_items(CartId::new(id), tracks, collections))
    }

    fn store(state: &mut State, id: u64, payload: CartPayload) -> Result<Cart, GatewayError> {
        if let Some(track) = payload
            .track_ids
            .iter()
            .find(|track| !state.tracks.contains_key(track))
        {
            return Err(not_for_sale(*track));
        }

        state.carts.insert(id, payload);

        Self::render(state, id)
    }
}

pub fn track(id: u64, cents: i64) -> TrackLineItem {
    TrackLineItem {
        id: TrackId::new(id),
        title: format!("Track {id}"),
        price: Price::usd(cents),
        artist: artist(),
    }
}

pub fn collection(id: u64, cents: i64) -> CollectionLineItem {
    CollectionLineItem {
        id: CollectionId::new(id),
        name: format!("Collection {id}"),
        price: Price::usd(cents),
        artist: artist(),
    }
}

fn not_for_sale(track: TrackId) -> GatewayError {
    GatewayError::Rejected {
        status: 422,
        message: Some(format!("Track {track} is not for sale")),
    }
}

fn track_ids(payload: &CartPayload) -> Vec<u64> {
    payload.track_ids.iter().map(|id| id.get()).collect()
}

#[async_trait]
impl CartGateway for FakeBackend {
    async fn create_cart(
        &self,
        payload: CartPayload,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError> {
        tokio::task::yield_now().await;

        self.with_state(|state| -> Result<Cart, GatewayError> {
            state
                .calls
                .push(Call::Create(requestor, track_ids(&payload)));

            state.next_id += 1;
            let id = state.next_id;
            let cart = Self::store(state, id, payload)?;

            if requestor == Requestor::Authenticated {
                state.account_cart = Some(id);
            }

            Ok(cart)
        })
    }

    async fn get_cart_by_id(&self, id: CartId, _requestor: Requestor) -> Result<Cart, GatewayError> {
        tokio::task::yield_now().await;

        self.with_state(|state| {
            state.calls.push(Call::GetById(id.get()));

            Self::render(state, id.get())
        })
    }

    async fn get_cart_by_requestor(&self) -> Result<Cart, GatewayError> {
        tokio::task::yield_now().await;

        self.with_state(|state| -> Result<Cart, GatewayError> {
            state.calls.push(Call::GetByRequestor);

            let id = state.account_cart.ok_or(GatewayError::NotFound)?;

            Self::render(state, id)
        })
    }

    async fn update_cart(
        &self,
        id: CartId,
        payload: CartPayload,
        requestor: Requestor,
    ) -> Result<Cart, GatewayError> {
        tokio::task::yield_now().await;

        self.with_state(|state| {
            state
                .calls
                .push(Call::Update(id.get(), requestor, track_ids(&payload)));

            if !state.carts.contains_key(&id.get()) {
                return Err(GatewayError::NotFound);
            }

            Self::store(state, id.get(), payload)
        })
    }

    async fn initialize_checkout(
        &self,
        cart: CartId,
        _requestor: Requestor,
    ) -> Result<CheckoutIntent, GatewayError> {
        tokio::task::yield_now().await;

        self.with_state(|state| -> Result<CheckoutIntent, GatewayError> {
            state.calls.push(Call::InitializeCheckout(cart.get()));

            let total = Self::render(state, cart.get())?
                .cart_total()
                .map_err(|error| GatewayError::Rejected {
                    status: 422,
                    message: Some(error.to_string()),
                })?;

            let payment_required = !total.is_zero();

            Ok(CheckoutIntent {
                payment_required,
                client_secret: payment_required.then(|| format!("pi_{cart}_secret")),
            })
        })
    }

    async fn checkout(
        &self,
        cart: CartId,
        request: CheckoutRequest,
        _requestor: Requestor,
    ) -> Result<(), GatewayError> {
        tokio::task::yield_now().await;

        self.with_state(|state| -> Result<(), GatewayError> {
            state.calls.push(Call::Checkout(
                cart.get(),
                request.payment_intent_id.clone(),
            ));

            state.carts.remove(&cart.get()).ok_or(GatewayError::NotFound)?;

            if state.account_cart == Some(cart.get()) {
                state.account_cart = None;
            }

            state.orders.push((cart.get(), request));

            Ok(())
        })
    }
}

/// Notifier that keeps every notice for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
