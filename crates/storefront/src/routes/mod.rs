//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart (JSON)
//! GET  /cart                   - Reconcile and return the cart
//! POST /cart/items             - Set an item's quantity (debounced sync)
//! POST /cart/add               - Add to an item's quantity, default 1 (debounced sync)
//! POST /cart/remove            - Remove an item (debounced sync)
//! POST /cart/sync              - Reconcile now ("Update Cart")
//!
//! # Checkout
//! GET  /checkout               - Redirect to Shopify checkout when in sync
//! ```

pub mod cart;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the main application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::set_quantity))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/sync", post(cart::sync))
        .route("/checkout", get(cart::checkout))
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
