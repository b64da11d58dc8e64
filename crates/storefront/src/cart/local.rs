//! The locally persisted, desired cart.
//!
//! A `LocalCart` is the user's intent: an ordered list of
//! `(merchandise id, quantity)` pairs. It carries no server identifiers and
//! is the source of truth the remote cart is reconciled towards.

use serde::{Deserialize, Deserializer, Serialize};
use storefront_cart_core::MerchandiseId;

/// One desired line: a variant and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    /// Product variant ID.
    pub merchandise_id: MerchandiseId,
    /// Desired quantity. Zero is kept, not pruned.
    pub quantity: u32,
}

impl StoredItem {
    #[must_use]
    pub fn new(merchandise_id: impl Into<MerchandiseId>, quantity: u32) -> Self {
        Self {
            merchandise_id: merchandise_id.into(),
            quantity,
        }
    }
}

/// Ordered collection of stored items, at most one per merchandise id.
///
/// Serialized as a bare JSON array of `{ "merchandiseId", "quantity" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalCart {
    items: Vec<StoredItem>,
}

impl LocalCart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items, collapsing duplicate merchandise ids.
    ///
    /// The first occurrence keeps its position; the last occurrence's
    /// quantity wins.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = StoredItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.set_quantity(item.merchandise_id, item.quantity);
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[StoredItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up the stored item for a variant.
    #[must_use]
    pub fn get(&self, merchandise_id: &MerchandiseId) -> Option<&StoredItem> {
        self.items
            .iter()
            .find(|item| &item.merchandise_id == merchandise_id)
    }

    /// Whether the cart mentions the variant at all (including quantity 0).
    #[must_use]
    pub fn contains(&self, merchandise_id: &MerchandiseId) -> bool {
        self.get(merchandise_id).is_some()
    }

    /// Overwrite the quantity for a variant, appending it if absent.
    pub fn set_quantity(&mut self, merchandise_id: MerchandiseId, quantity: u32) {
        match self
            .items
            .iter_mut()
            .find(|item| item.merchandise_id == merchandise_id)
        {
            Some(item) => item.quantity = quantity,
            None => self.items.push(StoredItem {
                merchandise_id,
                quantity,
            }),
        }
    }

    /// Increment the quantity for a variant, appending it if absent.
    ///
    /// Saturates at `u32::MAX`.
    pub fn add(&mut self, merchandise_id: MerchandiseId, quantity: u32) {
        let current = self.get(&merchandise_id).map_or(0, |item| item.quantity);
        self.set_quantity(merchandise_id, current.saturating_add(quantity));
    }

    /// Drop a variant entirely. Returns whether it was present.
    pub fn remove(&mut self, merchandise_id: &MerchandiseId) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| &item.merchandise_id != merchandise_id);
        self.items.len() != before
    }

    /// Items with a positive quantity, in order.
    pub fn purchasable(&self) -> impl Iterator<Item = &StoredItem> {
        self.items.iter().filter(|item| item.quantity > 0)
    }

    /// Sum of all stored quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl<'de> Deserialize<'de> for LocalCart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<StoredItem>::deserialize(deserializer).map(Self::from_items)
    }
}

impl FromIterator<StoredItem> for LocalCart {
    fn from_iter<I: IntoIterator<Item = StoredItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> MerchandiseId {
        MerchandiseId::new(s)
    }

    #[test]
    fn test_set_quantity_overwrites_in_place() {
        let mut cart = LocalCart::new();
        cart.set_quantity(id("A"), 1);
        cart.set_quantity(id("B"), 2);
        cart.set_quantity(id("A"), 5);

        assert_eq!(
            cart.items(),
            &[StoredItem::new("A", 5), StoredItem::new("B", 2)]
        );
    }

    #[test]
    fn test_set_quantity_zero_is_kept() {
        let mut cart = LocalCart::new();
        cart.set_quantity(id("A"), 0);
        assert!(cart.contains(&id("A")));
        assert_eq!(cart.purchasable().count(), 0);
    }

    #[test]
    fn test_add_increments() {
        let mut cart = LocalCart::new();
        cart.add(id("A"), 1);
        cart.add(id("A"), 2);
        assert_eq!(cart.get(&id("A")).unwrap().quantity, 3);
    }

    #[test]
    fn test_add_saturates() {
        let mut cart = LocalCart::new();
        cart.set_quantity(id("A"), u32::MAX);
        cart.add(id("A"), 1);
        assert_eq!(cart.get(&id("A")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_remove() {
        let mut cart = LocalCart::from_items([StoredItem::new("A", 1), StoredItem::new("B", 1)]);
        assert!(cart.remove(&id("A")));
        assert!(!cart.remove(&id("A")));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_serializes_as_camel_case_array() {
        let cart = LocalCart::from_items([StoredItem::new("gid://shopify/ProductVariant/1", 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 2 }
            ])
        );
    }

    #[test]
    fn test_deserialize_collapses_duplicates() {
        let json = r#"[
            {"merchandiseId": "A", "quantity": 1},
            {"merchandiseId": "B", "quantity": 4},
            {"merchandiseId": "A", "quantity": 3}
        ]"#;
        let cart: LocalCart = serde_json::from_str(json).unwrap();

        assert_eq!(
            cart.items(),
            &[StoredItem::new("A", 3), StoredItem::new("B", 4)]
        );
    }

    #[test]
    fn test_deserialize_rejects_negative_quantity() {
        let json = r#"[{"merchandiseId": "A", "quantity": -1}]"#;
        assert!(serde_json::from_str::<LocalCart>(json).is_err());
    }

    #[test]
    fn test_total_quantity() {
        let cart = LocalCart::from_items([StoredItem::new("A", 2), StoredItem::new("B", 3)]);
        assert_eq!(cart.total_quantity(), 5);
    }
}
