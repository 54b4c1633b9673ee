//! Inventory sub-service.
//!
//! The bootstrap only needs two things from an inventory: "take this
//! decoded response" and "what's the newest timestamp you know". The
//! [`InventoryLedger`] trait is exactly that; [`Inventories`] is the
//! default keyed-by-item implementation.

use std::collections::HashMap;

use trailhead_protocol::{GetInventoryResponse, InventoryItem};

use crate::DecodeRejected;

/// What the bootstrap needs from an inventory.
pub trait InventoryLedger: Send + Sync + 'static {
    /// Merges a decoded inventory response.
    ///
    /// Must be all-or-nothing: a rejected response leaves the ledger
    /// untouched.
    ///
    /// # Errors
    /// [`DecodeRejected`] if the response decoded but makes no sense.
    fn update_from_decoded(
        &mut self,
        response: GetInventoryResponse,
    ) -> Result<(), DecodeRejected>;

    /// The newest inventory timestamp seen so far (0 before any sync).
    fn last_inventory_timestamp(&self) -> i64;
}

/// Default inventory: the latest version of every item, by key.
#[derive(Debug, Default)]
pub struct Inventories {
    items: HashMap<String, InventoryItem>,
    last_update_ms: i64,
}

impl Inventories {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an item by key.
    pub fn item(&self, key: &str) -> Option<&InventoryItem> {
        self.items.get(key)
    }

    /// Iterates over all items, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the inventory holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl InventoryLedger for Inventories {
    fn update_from_decoded(
        &mut self,
        response: GetInventoryResponse,
    ) -> Result<(), DecodeRejected> {
        if !response.success {
            return Err(DecodeRejected(
                "server flagged the inventory response as unsuccessful".into(),
            ));
        }
        let delta = response.inventory_delta;
        if delta.new_timestamp_ms < 0 {
            return Err(DecodeRejected(format!(
                "negative inventory timestamp {}",
                delta.new_timestamp_ms
            )));
        }

        // Validation is done; from here on nothing can fail.
        let count = delta.inventory_items.len();
        for item in delta.inventory_items {
            if item.deleted {
                self.items.remove(&item.key);
            } else {
                self.items.insert(item.key.clone(), item);
            }
        }
        self.last_update_ms = self.last_update_ms.max(delta.new_timestamp_ms);

        tracing::debug!(
            changed = count,
            held = self.items.len(),
            last_update_ms = self.last_update_ms,
            "inventory updated"
        );
        Ok(())
    }

    fn last_inventory_timestamp(&self) -> i64 {
        self.last_update_ms
    }
}

#[cfg(test)]
mod tests {
    use trailhead_protocol::InventoryDelta;

    use super::*;

    fn item(key: &str, at: i64, deleted: bool) -> InventoryItem {
        InventoryItem {
            key: key.into(),
            modified_timestamp_ms: at,
            deleted,
            data: Vec::new(),
        }
    }

    fn response(new_ts: i64, items: Vec<InventoryItem>) -> GetInventoryResponse {
        GetInventoryResponse {
            success: true,
            inventory_delta: InventoryDelta {
                original_timestamp_ms: 0,
                new_timestamp_ms: new_ts,
                inventory_items: items,
            },
        }
    }

    #[test]
    fn test_update_baseline_populates_items_and_timestamp() {
        let mut inv = Inventories::new();

        inv.update_from_decoded(response(
            500,
            vec![item("ball", 400, false), item("potion", 500, false)],
        ))
        .unwrap();

        assert_eq!(inv.len(), 2);
        assert_eq!(inv.last_inventory_timestamp(), 500);
    }

    #[test]
    fn test_update_delta_replaces_and_deletes() {
        let mut inv = Inventories::new();
        inv.update_from_decoded(response(
            500,
            vec![item("ball", 400, false), item("potion", 500, false)],
        ))
        .unwrap();

        inv.update_from_decoded(response(
            900,
            vec![item("ball", 900, false), item("potion", 850, true)],
        ))
        .unwrap();

        assert_eq!(inv.item("ball").unwrap().modified_timestamp_ms, 900);
        assert!(inv.item("potion").is_none());
        assert_eq!(inv.last_inventory_timestamp(), 900);
    }

    #[test]
    fn test_update_older_delta_keeps_newest_timestamp() {
        let mut inv = Inventories::new();
        inv.update_from_decoded(response(900, vec![])).unwrap();

        inv.update_from_decoded(response(300, vec![])).unwrap();

        assert_eq!(inv.last_inventory_timestamp(), 900);
    }

    #[test]
    fn test_update_unsuccessful_response_is_rejected_untouched() {
        let mut inv = Inventories::new();
        let mut bad = response(100, vec![item("ball", 100, false)]);
        bad.success = false;

        assert!(inv.update_from_decoded(bad).is_err());
        assert!(inv.is_empty());
        assert_eq!(inv.last_inventory_timestamp(), 0);
    }

    #[test]
    fn test_update_negative_timestamp_is_rejected() {
        let mut inv = Inventories::new();
        assert!(inv.update_from_decoded(response(-1, vec![])).is_err());
    }
}
