//! Per-session reconciliation state.

use storefront_cart_core::CartId;

use super::storage::{CartStorage, StorageError};
use super::store::LocalCartStore;
use crate::shopify::types::Cart;

/// The cached remote cart ID and the last snapshot a pass produced.
///
/// One context per browsing session. Only a successful reconciliation pass
/// changes it; a failed pass leaves both fields as they were.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartContext {
    cached_cart_id: Option<CartId>,
    last_snapshot: Option<Cart>,
}

impl CartContext {
    /// A context with no cached cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cached_cart_id: None,
            last_snapshot: None,
        }
    }

    /// A context resuming a known cart ID, with no snapshot yet.
    #[must_use]
    pub const fn with_cart_id(cart_id: CartId) -> Self {
        Self {
            cached_cart_id: Some(cart_id),
            last_snapshot: None,
        }
    }

    /// Load the cached cart ID from the local cart store.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn load<S: CartStorage>(store: &LocalCartStore<S>) -> Result<Self, StorageError> {
        Ok(Self {
            cached_cart_id: store.cached_cart_id().await?,
            last_snapshot: None,
        })
    }

    #[must_use]
    pub const fn cached_cart_id(&self) -> Option<&CartId> {
        self.cached_cart_id.as_ref()
    }

    #[must_use]
    pub const fn last_snapshot(&self) -> Option<&Cart> {
        self.last_snapshot.as_ref()
    }

    /// Record a successful pass.
    pub(crate) fn commit(&mut self, cart: Cart) {
        self.cached_cart_id = Some(cart.id.clone());
        self.last_snapshot = Some(cart);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::storage::MemoryStorage;
    use crate::cart::testing::cart;

    #[test]
    fn test_commit_sets_id_and_snapshot() {
        let mut ctx = CartContext::new();
        ctx.commit(cart("gid://shopify/Cart/1", vec![]));

        assert_eq!(ctx.cached_cart_id(), Some(&CartId::new("gid://shopify/Cart/1")));
        assert_eq!(
            ctx.last_snapshot().map(|c| c.checkout_url.as_str()),
            Some("https://shop.example/checkout/gid://shopify/Cart/1")
        );
    }

    #[tokio::test]
    async fn test_load_from_store() {
        let store = LocalCartStore::new(MemoryStorage::new());
        assert_eq!(CartContext::load(&store).await.unwrap(), CartContext::new());

        store.cache_cart_id(&CartId::new("gid://shopify/Cart/2")).await.unwrap();
        let ctx = CartContext::load(&store).await.unwrap();
        assert_eq!(ctx.cached_cart_id(), Some(&CartId::new("gid://shopify/Cart/2")));
        assert!(ctx.last_snapshot().is_none());
    }
}
