//! Local cart persistence and reconciliation against the remote cart.
//!
//! # Architecture
//!
//! - [`LocalCart`]: the user's desired items, persisted by [`LocalCartStore`]
//!   in any [`CartStorage`]
//! - [`CartGateway`]: remote cart calls, implemented by the Storefront client
//! - [`Reconciler`]: diffs local against remote and applies the delta
//! - [`CartContext`]: cached cart ID and last snapshot for one session
//! - [`CartSync`]: debounced single-flight driver with a checkout gate
//! - [`CartSessions`]: one driver per browser session

pub mod context;
pub mod diff;
pub mod gateway;
pub mod local;
pub mod reconciler;
pub mod sessions;
pub mod storage;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use context::CartContext;
pub use diff::{CartDelta, creation_lines, diff};
pub use gateway::{CartGateway, GatewayError};
pub use local::{LocalCart, StoredItem};
pub use reconciler::{ReconcileError, ReconcileStage, Reconciler};
pub use sessions::{CartSessions, SessionCart};
pub use storage::{CartStorage, MemoryStorage, StorageError};
pub use store::LocalCartStore;
pub use sync::{CartSync, SyncError, SyncState, SyncStatus};
