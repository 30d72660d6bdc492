//! Cart Records

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cart::models::{Cart, CartId, CollectionId, CollectionLineItem, TrackId, TrackLineItem};

/// Cart as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub id: CartId,

    #[serde(default)]
    pub tracks: Vec<TrackLineItem>,

    #[serde(default)]
    pub collections: Vec<CollectionLineItem>,
}

impl From<CartRecord> for Cart {
    fn from(record: CartRecord) -> Self {
        Cart::with_items(record.id, record.tracks, record.collections)
    }
}

/// Create/update request body. The backend replaces the cart contents with
/// these id lists on both `POST /cart` and `PUT /cart/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub track_ids: Vec<TrackId>,
    pub collection_ids: Vec<CollectionId>,
}

impl CartPayload {
    /// Union of two carts' id lists, used when a guest cart is merged into an
    /// account cart. Ids present in both are sent once, in ascending order.
    #[must_use]
    pub fn merged(&self, other: &CartPayload) -> CartPayload {
        let track_ids: BTreeSet<TrackId> = self
            .track_ids
            .iter()
            .chain(&other.track_ids)
            .copied()
            .collect();

        let collection_ids: BTreeSet<CollectionId> = self
            .collection_ids
            .iter()
            .chain(&other.collection_ids)
            .copied()
            .collect();

        CartPayload {
            track_ids: track_ids.into_iter().collect(),
            collection_ids: collection_ids.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn payload(tracks: &[u64], collections: &[u64]) -> CartPayload {
        CartPayload {
            track_ids: tracks.iter().copied().map(TrackId::new).collect(),
            collection_ids: collections.iter().copied().map(CollectionId::new).collect(),
        }
    }

    #[test]
    fn payload_serializes_camel_case_id_lists() -> TestResult {
        let body = serde_json::to_value(payload(&[1, 2], &[5]))?;

        assert_eq!(body, json!({ "trackIds": [1, 2], "collectionIds": [5] }));

        Ok(())
    }

    #[test]
    fn merged_payload_sends_shared_ids_once() {
        let guest = payload(&[1, 2], &[]);
        let account = payload(&[2, 3], &[8]);

        assert_eq!(guest.merged(&account), payload(&[1, 2, 3], &[8]));
    }

    #[test]
    fn record_deserializes_into_cart() -> TestResult {
        let record: CartRecord = serde_json::from_value(json!({
            "id": 7,
            "tracks": [{
                "id": 42,
                "title": "Undertow",
                "price": { "amount": 300, "currency": "USD" },
                "artist": { "id": 3, "name": "Low Tide" }
            }]
        }))?;

        let cart = Cart::from(record);

        assert_eq!(cart.id(), CartId::new(7));
        assert_eq!(cart.total_item_count(), 1);
        assert!(cart.contains_track(TrackId::new(42)));
        assert_eq!(cart.formatted_total()?, "$3.00");

        Ok(())
    }

    #[test]
    fn duplicate_ids_in_record_collapse_to_one_line_item() -> TestResult {
        let track = json!({
            "id": 42,
            "title": "Undertow",
            "price": { "amount": 300, "currency": "USD" },
            "artist": { "id": 3, "name": "Low Tide" }
        });

        let record: CartRecord =
            serde_json::from_value(json!({ "id": 7, "tracks": [track.clone(), track] }))?;

        assert_eq!(Cart::from(record).total_item_count(), 1);

        Ok(())
    }
}
