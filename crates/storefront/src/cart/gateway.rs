//! Remote cart operations as seen by the reconciler.
//!
//! [`CartGateway`] is the seam between reconciliation and the Storefront
//! API. Every mutating call returns the full updated cart.

use std::sync::Arc;

use async_trait::async_trait;
use storefront_cart_core::{CartId, CartLineId};
use thiserror::Error;

use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};
use crate::shopify::{ShopifyError, StorefrontClient};

/// Failure of a remote cart call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure (connection, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with errors, user errors, or an unexpected shape.
    #[error("api error: {0}")]
    Api(String),

    /// The cart ID no longer resolves (expired or completed).
    #[error("cart not found: {0}")]
    NotFound(String),
}

impl From<ShopifyError> for GatewayError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::Http(e) => Self::Network(e.to_string()),
            ShopifyError::NotFound(cart_id) => Self::NotFound(cart_id.into_inner()),
            other @ (ShopifyError::RateLimited(_)
            | ShopifyError::Status { .. }
            | ShopifyError::GraphQL(_)
            | ShopifyError::UserErrors { .. }
            | ShopifyError::InvalidResponse(_)) => Self::Api(other.to_string()),
        }
    }
}

/// Create, read, and mutate a remote cart.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Fetch a cart by ID.
    async fn fetch_by_id(&self, cart_id: &CartId) -> Result<Cart, GatewayError>;

    /// Create a new cart seeded with `lines`.
    async fn create_with_lines(&self, lines: Vec<CartLineInput>) -> Result<Cart, GatewayError>;

    /// Add new lines.
    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError>;

    /// Change quantities of existing lines.
    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, GatewayError>;

    /// Remove lines by line ID.
    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError>;
}

#[async_trait]
impl<T: CartGateway + ?Sized> CartGateway for Arc<T> {
    async fn fetch_by_id(&self, cart_id: &CartId) -> Result<Cart, GatewayError> {
        (**self).fetch_by_id(cart_id).await
    }

    async fn create_with_lines(&self, lines: Vec<CartLineInput>) -> Result<Cart, GatewayError> {
        (**self).create_with_lines(lines).await
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError> {
        (**self).add_lines(cart_id, lines).await
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, GatewayError> {
        (**self).update_lines(cart_id, lines).await
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError> {
        (**self).remove_lines(cart_id, line_ids).await
    }
}

#[async_trait]
impl CartGateway for StorefrontClient {
    async fn fetch_by_id(&self, cart_id: &CartId) -> Result<Cart, GatewayError> {
        Ok(self.get_cart(cart_id).await?)
    }

    async fn create_with_lines(&self, lines: Vec<CartLineInput>) -> Result<Cart, GatewayError> {
        Ok(self.create_cart(lines).await?)
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError> {
        Ok(self.add_to_cart(cart_id, lines).await?)
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, GatewayError> {
        Ok(self.update_cart(cart_id, lines).await?)
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError> {
        Ok(self.remove_from_cart(cart_id, line_ids).await?)
    }
}
