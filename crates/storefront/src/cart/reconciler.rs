//! Cart reconciliation: converge the remote cart onto the local cart.
//!
//! One pass:
//! 1. Resolve the remote cart. A cached ID is fetched; a missing ID, or one
//!    the remote no longer knows, creates a new cart seeded from the local
//!    cart. Creation is the only path that makes a remote cart.
//! 2. On the fetched path, diff by merchandise ID and apply the delta as
//!    remove, then update, then add. Empty parts issue no call. Each call
//!    returns the snapshot the next one builds on.
//! 3. Commit the final snapshot to the [`CartContext`].
//!
//! A failure at any step aborts the pass and leaves the context untouched.
//! There are no automatic retries.

use std::fmt;

use storefront_cart_core::CartId;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::context::CartContext;
use super::diff::{creation_lines, diff};
use super::gateway::{CartGateway, GatewayError};
use super::local::LocalCart;
use crate::shopify::types::Cart;

/// The step of a pass that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStage {
    Fetch,
    Create,
    Remove,
    Update,
    Add,
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Add => "add",
        })
    }
}

/// A reconciliation pass failed; cart state is unchanged.
#[derive(Debug, Error)]
#[error("cart reconciliation failed at {stage} step, state unchanged: {source}")]
pub struct ReconcileError {
    pub stage: ReconcileStage,
    #[source]
    pub source: GatewayError,
}

impl ReconcileError {
    #[must_use]
    pub const fn new(stage: ReconcileStage, source: GatewayError) -> Self {
        Self { stage, source }
    }
}

fn at(stage: ReconcileStage) -> impl FnOnce(GatewayError) -> ReconcileError {
    move |source| ReconcileError::new(stage, source)
}

/// Runs reconciliation passes against a [`CartGateway`].
#[derive(Debug, Clone)]
pub struct Reconciler<G> {
    gateway: G,
}

impl<G: CartGateway> Reconciler<G> {
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Run one pass and commit the result to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` naming the failed step. `ctx` is not
    /// modified on error.
    #[instrument(
        skip_all,
        fields(cart_id = ?ctx.cached_cart_id().map(CartId::as_str), items = local.len())
    )]
    pub async fn reconcile(
        &self,
        ctx: &mut CartContext,
        local: &LocalCart,
    ) -> Result<Cart, ReconcileError> {
        let cart = self.converge(ctx.cached_cart_id(), local).await?;
        ctx.commit(cart.clone());
        Ok(cart)
    }

    async fn converge(
        &self,
        cached_cart_id: Option<&CartId>,
        local: &LocalCart,
    ) -> Result<Cart, ReconcileError> {
        let fetched = match cached_cart_id {
            Some(cart_id) => match self.gateway.fetch_by_id(cart_id).await {
                Ok(cart) => Some(cart),
                Err(GatewayError::NotFound(_)) => {
                    info!(cart_id = %cart_id, "Cached cart no longer exists, creating a new one");
                    None
                }
                Err(e) => return Err(ReconcileError::new(ReconcileStage::Fetch, e)),
            },
            None => None,
        };

        let Some(mut cart) = fetched else {
            let lines = creation_lines(local);
            debug!(lines = lines.len(), "Creating cart");
            return self
                .gateway
                .create_with_lines(lines)
                .await
                .map_err(at(ReconcileStage::Create));
        };

        let delta = diff(local, &cart);
        debug!(
            remove = delta.to_remove.len(),
            update = delta.to_update.len(),
            add = delta.to_add.len(),
            "Computed cart delta"
        );

        if !delta.to_remove.is_empty() {
            cart = self
                .gateway
                .remove_lines(&cart.id, delta.to_remove)
                .await
                .map_err(at(ReconcileStage::Remove))?;
        }
        if !delta.to_update.is_empty() {
            cart = self
                .gateway
                .update_lines(&cart.id, delta.to_update)
                .await
                .map_err(at(ReconcileStage::Update))?;
        }
        if !delta.to_add.is_empty() {
            cart = self
                .gateway
                .add_lines(&cart.id, delta.to_add)
                .await
                .map_err(at(ReconcileStage::Add))?;
        }

        Ok(cart)
    }
}
