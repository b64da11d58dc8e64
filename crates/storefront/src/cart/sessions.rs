//! One [`CartSync`] per browser session.
//!
//! Every request of a session goes through the same driver, so passes stay
//! single-flight across concurrent requests and edits share one debounce
//! timer. Drivers idle for the staleness window are evicted with their cart.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use super::gateway::CartGateway;
use super::reconciler::Reconciler;
use super::storage::{MemoryStorage, StorageError};
use super::store::LocalCartStore;
use super::sync::CartSync;
use crate::config::CartConfig;

/// Upper bound on live cart sessions.
const MAX_SESSIONS: u64 = 100_000;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// The driver of one session's cart.
pub type SessionCart<G> = CartSync<G, MemoryStorage>;

/// Registry of per-session cart drivers.
pub struct CartSessions<G> {
    gateway: G,
    drivers: Cache<String, SessionCart<G>>,
    stale_after_days: i64,
    debounce: Duration,
}

impl<G> CartSessions<G>
where
    G: CartGateway + Clone + 'static,
{
    #[must_use]
    pub fn new(gateway: G, config: &CartConfig) -> Self {
        let days = u64::try_from(config.stale_after_days).unwrap_or(1);
        let drivers = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY)))
            .build();

        Self {
            gateway,
            drivers,
            stale_after_days: config.stale_after_days,
            debounce: config.sync_debounce,
        }
    }

    /// The driver for `key`, started on first use.
    ///
    /// Concurrent first requests for one key share a single driver.
    ///
    /// # Errors
    ///
    /// Returns an error if a new driver cannot read its storage.
    pub async fn get(&self, key: &str) -> Result<SessionCart<G>, Arc<StorageError>> {
        self.drivers
            .try_get_with(key.to_string(), async {
                debug!("Starting cart session");
                CartSync::start(
                    Reconciler::new(self.gateway.clone()),
                    LocalCartStore::with_stale_after_days(
                        MemoryStorage::new(),
                        self.stale_after_days,
                    ),
                    self.debounce,
                )
                .await
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storefront_cart_core::MerchandiseId;

    use super::*;
    use crate::cart::testing::RecordingGateway;

    fn sessions(gateway: &RecordingGateway) -> CartSessions<RecordingGateway> {
        CartSessions::new(
            gateway.clone(),
            &CartConfig {
                stale_after_days: 14,
                sync_debounce: Duration::from_secs(60),
            },
        )
    }

    #[tokio::test]
    async fn test_same_key_shares_a_driver() {
        let gateway = RecordingGateway::new();
        let sessions = sessions(&gateway);

        let first = sessions.get("session-a").await.unwrap();
        first
            .set_quantity(MerchandiseId::new("A"), 2)
            .await
            .unwrap();

        let again = sessions.get("session-a").await.unwrap();
        assert_eq!(again.local_cart().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let gateway = RecordingGateway::new();
        let sessions = sessions(&gateway);

        sessions
            .get("session-a")
            .await
            .unwrap()
            .set_quantity(MerchandiseId::new("A"), 2)
            .await
            .unwrap();

        let other = sessions.get("session-b").await.unwrap();
        assert!(other.local_cart().await.unwrap().is_empty());
    }
}
