//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{CartGateway, CartSessions};
use crate::config::StorefrontConfig;
use crate::shopify::{ShopifyError, StorefrontClient};

/// Gateway shared by every request.
pub type SharedGateway = Arc<dyn CartGateway>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the per-session cart drivers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    carts: CartSessions<SharedGateway>,
}

impl AppState {
    /// Create application state over an explicit cart gateway.
    #[must_use]
    pub fn new(config: StorefrontConfig, gateway: SharedGateway) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                carts: CartSessions::new(gateway, &config.cart),
                config,
            }),
        }
    }

    /// Create application state backed by the Shopify Storefront API.
    ///
    /// # Errors
    ///
    /// Returns an error if the Storefront HTTP client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, ShopifyError> {
        let client = StorefrontClient::new(&config.shopify)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the per-session cart drivers.
    #[must_use]
    pub fn carts(&self) -> &CartSessions<SharedGateway> {
        &self.inner.carts
    }
}
