//! Cart Models

use std::collections::BTreeMap;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    cart::records::CartPayload,
    ids::TypedId,
    prices::{Price, PriceError, total_price},
};

/// Cart id. Zero means the cart has not been persisted by the backend yet.
pub type CartId = TypedId<Cart>;

/// Track id.
pub type TrackId = TypedId<TrackLineItem>;

/// Collection id.
pub type CollectionId = TypedId<CollectionLineItem>;

/// Artist id.
pub type ArtistId = TypedId<ArtistRef>;

/// The artist a line item is credited to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: ArtistId,
    pub name: String,
}

/// Track line item, a snapshot of the track taken when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLineItem {
    pub id: TrackId,
    pub title: String,
    pub price: Price,
    pub artist: ArtistRef,
}

/// Collection line item, a snapshot of the collection taken when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLineItem {
    pub id: CollectionId,
    pub name: String,
    pub price: Price,
    pub artist: ArtistRef,
}

/// Cart Model
///
/// Each track and collection id appears at most once. Line items are owned
/// values, so later changes to the catalogue entry they were built from never
/// reach the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    id: CartId,
    tracks: BTreeMap<TrackId, TrackLineItem>,
    collections: BTreeMap<CollectionId, CollectionLineItem>,
}

impl Cart {
    /// Creates an empty, unpersisted cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cart with the given backend id and line items.
    #[must_use]
    pub fn with_items(
        id: CartId,
        tracks: impl IntoIterator<Item = TrackLineItem>,
        collections: impl IntoIterator<Item = CollectionLineItem>,
    ) -> Self {
        let mut cart = Self {
            id,
            ..Self::default()
        };

        tracks.into_iter().for_each(|track| cart.add_track(track));
        collections
            .into_iter()
            .for_each(|collection| cart.add_collection(collection));

        cart
    }

    /// Backend id of this cart.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Whether the backend has assigned this cart an id.
    pub fn is_persisted(&self) -> bool {
        self.id.get() != 0
    }

    pub(crate) fn set_id(&mut self, id: CartId) {
        self.id = id;
    }

    /// Adds a track, replacing any line item with the same id.
    pub fn add_track(&mut self, track: TrackLineItem) {
        self.tracks.insert(track.id, track);
    }

    /// Removes a track if present.
    pub fn remove_track(&mut self, id: TrackId) {
        self.tracks.remove(&id);
    }

    /// Adds a collection, replacing any line item with the same id.
    pub fn add_collection(&mut self, collection: CollectionLineItem) {
        self.collections.insert(collection.id, collection);
    }

    /// Removes a collection if present.
    pub fn remove_collection(&mut self, id: CollectionId) {
        self.collections.remove(&id);
    }

    /// Whether the track is in the cart.
    pub fn contains_track(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }

    /// Whether the collection is in the cart.
    pub fn contains_collection(&self, id: CollectionId) -> bool {
        self.collections.contains_key(&id)
    }

    /// Track line items ordered by id.
    pub fn tracks(&self) -> impl Iterator<Item = &TrackLineItem> {
        self.tracks.values()
    }

    /// Collection line items ordered by id.
    pub fn collections(&self) -> impl Iterator<Item = &CollectionLineItem> {
        self.collections.values()
    }

    /// Number of tracks and collections in the cart.
    pub fn total_item_count(&self) -> usize {
        self.tracks.len() + self.collections.len()
    }

    /// Whether the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.total_item_count() == 0
    }

    /// Sum of all line-item prices.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when line items use different or unknown currencies.
    pub fn cart_total(&self) -> Result<Money<'static, Currency>, PriceError> {
        total_price(
            self.tracks
                .values()
                .map(|track| &track.price)
                .chain(self.collections.values().map(|collection| &collection.price)),
        )
    }

    /// Display string of [`Cart::cart_total`], e.g. `$3.00`.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when line items use different or unknown currencies.
    pub fn formatted_total(&self) -> Result<String, PriceError> {
        Ok(self.cart_total()?.to_string())
    }

    /// Request body for creating or updating this cart.
    pub fn payload(&self) -> CartPayload {
        CartPayload {
            track_ids: self.tracks.keys().copied().collect(),
            collection_ids: self.collections.keys().copied().collect(),
        }
    }

    /// Applies the edits that turned `base` into `edited` to this cart.
    ///
    /// Line items added to (or replaced in) `edited` are added here; ids present
    /// in `base` but gone from `edited` are removed. Everything else in this cart
    /// is left alone.
    pub fn replay_edits(&mut self, base: &Cart, edited: &Cart) {
        edited
            .tracks()
            .filter(|track| base.tracks.get(&track.id) != Some(*track))
            .for_each(|track| self.add_track(track.clone()));
        edited
            .collections()
            .filter(|collection| base.collections.get(&collection.id) != Some(*collection))
            .for_each(|collection| self.add_collection(collection.clone()));

        base.tracks
            .keys()
            .filter(|id| !edited.contains_track(**id))
            .for_each(|id| self.remove_track(*id));
        base.collections
            .keys()
            .filter(|id| !edited.contains_collection(**id))
            .for_each(|id| self.remove_collection(*id));
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn artist() -> ArtistRef {
        ArtistRef {
            id: ArtistId::new(9),
            name: "Low Tide".to_string(),
        }
    }

    pub(crate) fn track(id: u64, cents: i64) -> TrackLineItem {
        TrackLineItem {
            id: TrackId::new(id),
            title: format!("Track {id}"),
            price: Price::usd(cents),
            artist: artist(),
        }
    }

    /// Cart of one-dollar tracks.
    pub(crate) fn cart(id: u64, track_ids: &[u64]) -> Cart {
        let mut cart = Cart::new();

        cart.set_id(CartId::new(id));
        track_ids
            .iter()
            .for_each(|track_id| cart.add_track(track(*track_id, 100)));

        cart
    }

    pub(crate) fn collection(id: u64, cents: i64) -> CollectionLineItem {
        CollectionLineItem {
            id: CollectionId::new(id),
            name: format!("Collection {id}"),
            price: Price::usd(cents),
            artist: artist(),
        }
    }
}
