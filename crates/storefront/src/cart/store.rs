//! Local cart persistence with staleness expiry.

use chrono::{DateTime, TimeDelta, Utc};
use storefront_cart_core::CartId;
use tracing::{debug, warn};

use super::local::LocalCart;
use super::storage::{CartStorage, StorageError, keys};

/// Stored carts older than this are discarded on read.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 14;

/// Reads and writes the [`LocalCart`] and cached cart ID in a [`CartStorage`].
///
/// Concurrent writers are not coordinated; the last write wins.
#[derive(Debug, Clone)]
pub struct LocalCartStore<S> {
    storage: S,
    stale_after: TimeDelta,
}

impl<S: CartStorage> LocalCartStore<S> {
    /// A store with the default 14-day expiry.
    pub fn new(storage: S) -> Self {
        Self::with_stale_after_days(storage, DEFAULT_STALE_AFTER_DAYS)
    }

    /// A store whose carts expire after `days`.
    pub fn with_stale_after_days(storage: S, days: i64) -> Self {
        Self {
            storage,
            stale_after: TimeDelta::try_days(days).unwrap_or(TimeDelta::MAX),
        }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the stored cart as of now.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn read(&self) -> Result<LocalCart, StorageError> {
        self.read_at(Utc::now()).await
    }

    /// Read the stored cart as of `now`.
    ///
    /// Returns an empty cart if nothing is stored, the blob cannot be
    /// parsed, or it was written more than the expiry window before `now`.
    /// Expired and corrupt entries are cleared. A blob without a timestamp
    /// never expires.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn read_at(&self, now: DateTime<Utc>) -> Result<LocalCart, StorageError> {
        if let Some(stored_at) = self.storage.get(keys::STORED_CART_AT).await? {
            match DateTime::parse_from_rfc3339(&stored_at) {
                Ok(stored_at) if now - stored_at.with_timezone(&Utc) > self.stale_after => {
                    debug!(%stored_at, "Stored cart expired, clearing");
                    self.clear().await?;
                    return Ok(LocalCart::new());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, value = %stored_at, "Unreadable cart timestamp, clearing");
                    self.clear().await?;
                    return Ok(LocalCart::new());
                }
            }
        }

        let Some(blob) = self.storage.get(keys::STORED_CART).await? else {
            return Ok(LocalCart::new());
        };

        match serde_json::from_str::<LocalCart>(&blob) {
            Ok(cart) => Ok(cart),
            Err(e) => {
                warn!(error = %e, "Corrupt stored cart, clearing");
                self.clear().await?;
                Ok(LocalCart::new())
            }
        }
    }

    /// Persist the cart, stamping it with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage backend fails.
    pub async fn write(&self, cart: &LocalCart) -> Result<(), StorageError> {
        self.write_at(cart, Utc::now()).await
    }

    /// Persist the cart, stamping it with `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage backend fails.
    pub async fn write_at(&self, cart: &LocalCart, now: DateTime<Utc>) -> Result<(), StorageError> {
        let blob = serde_json::to_string(cart)?;
        // Blob first: a failed write must not extend the old cart's lifetime
        self.storage.set(keys::STORED_CART, blob).await?;
        self.storage
            .set(keys::STORED_CART_AT, now.to_rfc3339())
            .await
    }

    /// Remove the stored cart and its timestamp.
    ///
    /// The cached cart ID is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::STORED_CART).await?;
        self.storage.remove(keys::STORED_CART_AT).await
    }

    /// The cached remote cart ID, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn cached_cart_id(&self) -> Result<Option<CartId>, StorageError> {
        Ok(self
            .storage
            .get(keys::CART_ID)
            .await?
            .filter(|id| !id.is_empty())
            .map(CartId::from))
    }

    /// Cache the remote cart ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn cache_cart_id(&self, cart_id: &CartId) -> Result<(), StorageError> {
        self.storage
            .set(keys::CART_ID, cart_id.as_str().to_string())
            .await
    }
}
