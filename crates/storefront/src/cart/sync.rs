//! Debounced, single-flight reconciliation driver.
//!
//! Every edit writes the local cart, disables checkout, and (re)arms a timer.
//! When the timer fires after a quiet interval, one reconciliation pass runs.
//! Passes never overlap: a pass that fires while another is in flight waits
//! for it, and is skipped if a newer edit has been made in the meantime
//! (the newer edit's own timer will run the pass).
//!
//! In-flight remote calls are never cancelled; only timers that have not
//! fired yet are.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_cart_core::MerchandiseId;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::context::CartContext;
use super::gateway::CartGateway;
use super::local::LocalCart;
use super::reconciler::{ReconcileError, Reconciler};
use super::storage::{CartStorage, StorageError};
use super::store::LocalCartStore;
use crate::shopify::types::Cart;

/// Default quiet interval before a pass fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Where the driver is in its edit/sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No pass has run yet.
    Idle,
    /// Local edits are waiting for the debounce timer.
    Pending,
    /// A pass is in flight.
    Syncing,
    /// The last pass succeeded and no edit has happened since.
    Synced,
    /// The last pass failed; the displayed cart is the previous snapshot.
    Failed,
}

/// Observable driver state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub status: SyncStatus,
    /// The last successfully reconciled cart.
    pub cart: Option<Cart>,
    pub checkout_enabled: bool,
    /// Message of the last failed pass, cleared on success.
    pub last_error: Option<String>,
}

impl SyncState {
    const fn initial() -> Self {
        Self {
            status: SyncStatus::Idle,
            cart: None,
            checkout_enabled: false,
            last_error: None,
        }
    }
}

/// Errors from a driver operation.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Drives reconciliation for one cart session.
///
/// Cheap to clone; clones drive the same session.
pub struct CartSync<G, S> {
    inner: Arc<Inner<G, S>>,
}

impl<G, S> Clone for CartSync<G, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<G, S> {
    reconciler: Reconciler<G>,
    store: LocalCartStore<S>,
    debounce: Duration,
    /// Held for the whole of a pass.
    context: tokio::sync::Mutex<CartContext>,
    state: watch::Sender<SyncState>,
    /// Bumped on every edit and explicit sync.
    generation: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<G, S> CartSync<G, S>
where
    G: CartGateway + 'static,
    S: CartStorage + 'static,
{
    /// Create a driver, resuming the cart ID cached in `store`.
    ///
    /// No pass runs until an edit or [`sync_now`](Self::sync_now).
    ///
    /// # Errors
    ///
    /// Returns an error if the cached cart ID cannot be read.
    pub async fn start(
        reconciler: Reconciler<G>,
        store: LocalCartStore<S>,
        debounce: Duration,
    ) -> Result<Self, StorageError> {
        let context = CartContext::load(&store).await?;
        let (state, _) = watch::channel(SyncState::initial());

        Ok(Self {
            inner: Arc::new(Inner {
                reconciler,
                store,
                debounce,
                context: tokio::sync::Mutex::new(context),
                state,
                generation: AtomicU64::new(0),
                pending: Mutex::new(None),
            }),
        })
    }

    /// Current driver state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    /// Watch driver state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// The checkout URL, only while the cart is known to be in sync.
    #[must_use]
    pub fn checkout_url(&self) -> Option<String> {
        let state = self.inner.state.borrow();
        if !state.checkout_enabled {
            return None;
        }
        state.cart.as_ref().map(|c| c.checkout_url.clone())
    }

    /// The current local cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn local_cart(&self) -> Result<LocalCart, StorageError> {
        self.inner.store.read().await
    }

    /// Overwrite the quantity of a variant and schedule a pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the local cart cannot be persisted.
    pub async fn set_quantity(
        &self,
        merchandise_id: MerchandiseId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        self.edit(|cart| cart.set_quantity(merchandise_id, quantity))
            .await
    }

    /// Add to the quantity of a variant and schedule a pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the local cart cannot be persisted.
    pub async fn add_item(
        &self,
        merchandise_id: MerchandiseId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        self.edit(|cart| cart.add(merchandise_id, quantity)).await
    }

    /// Drop a variant and schedule a pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the local cart cannot be persisted.
    pub async fn remove_item(&self, merchandise_id: &MerchandiseId) -> Result<(), StorageError> {
        self.edit(|cart| {
            cart.remove(merchandise_id);
        })
        .await
    }

    /// Cancel any pending timer and run a pass now.
    ///
    /// Waits for an in-flight pass to finish first.
    ///
    /// # Errors
    ///
    /// Returns an error if the pass fails; cart state is then unchanged.
    pub async fn sync_now(&self) -> Result<Cart, SyncError> {
        self.inner.cancel_pending();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.run_pass(generation).await
    }

    async fn edit(&self, f: impl FnOnce(&mut LocalCart)) -> Result<(), StorageError> {
        let mut cart = self.inner.store.read().await?;
        f(&mut cart);
        self.inner.store.write(&cart).await?;
        self.schedule();
        Ok(())
    }

    fn schedule(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|state| {
            state.status = SyncStatus::Pending;
            state.checkout_enabled = false;
        });

        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // Detached so aborting a later timer cannot cancel this pass
            tokio::spawn(async move {
                if let Err(e) = inner.run_scheduled(generation).await {
                    warn!(error = %e, "Scheduled cart sync failed");
                }
            });
        });

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }
}

impl<G, S> Inner<G, S>
where
    G: CartGateway,
    S: CartStorage,
{
    fn cancel_pending(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run_scheduled(&self, generation: u64) -> Result<(), SyncError> {
        // Queue behind an in-flight pass; the check below runs under the lock
        let context = self.context.lock().await;
        if !self.is_current(generation) {
            debug!(generation, "Skipping superseded cart sync");
            return Ok(());
        }
        self.pass(context, generation).await.map(|_| ())
    }

    async fn run_pass(&self, generation: u64) -> Result<Cart, SyncError> {
        let context = self.context.lock().await;
        self.pass(context, generation).await
    }

    #[instrument(skip(self, context))]
    async fn pass(
        &self,
        mut context: tokio::sync::MutexGuard<'_, CartContext>,
        generation: u64,
    ) -> Result<Cart, SyncError> {
        self.state.send_modify(|state| {
            state.status = SyncStatus::Syncing;
            state.checkout_enabled = false;
        });

        let result = self.reconcile(&mut context).await;
        let current = self.is_current(generation);

        match &result {
            Ok(cart) => self.state.send_modify(|state| {
                state.cart = Some(cart.clone());
                state.last_error = None;
                state.status = if current {
                    SyncStatus::Synced
                } else {
                    SyncStatus::Pending
                };
                state.checkout_enabled = current;
            }),
            Err(e) => self.state.send_modify(|state| {
                state.last_error = Some(e.to_string());
                state.status = if current {
                    SyncStatus::Failed
                } else {
                    SyncStatus::Pending
                };
                state.checkout_enabled = false;
            }),
        }

        result
    }

    async fn reconcile(&self, context: &mut CartContext) -> Result<Cart, SyncError> {
        let local = self.store.read().await?;
        let cart = self.reconciler.reconcile(context, &local).await?;
        self.store.cache_cart_id(&cart.id).await?;
        Ok(cart)
    }
}
