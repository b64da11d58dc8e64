//! Cart route handlers.
//!
//! The session cookie only names the shopper's cart driver; the local cart,
//! cached Shopify cart ID and last snapshot live in that driver. Edits are
//! persisted at once and reconciled after a quiet interval, so checkout stays
//! disabled until the next pass settles. Opening the cart or asking for a
//! sync runs a pass immediately, queued behind any pass already in flight.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use storefront_cart_core::MerchandiseId;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::cart::storage::keys;
use crate::cart::{SessionCart, StorageError, StoredItem, SyncStatus};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::shopify::types::Cart;
use crate::state::{AppState, SharedGateway};

// =============================================================================
// Request / Response Types
// =============================================================================

/// Cart state returned by every cart endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    /// Desired items as stored for the session.
    pub items: Vec<StoredItem>,
    /// Last reconciled Shopify cart, if any.
    pub cart: Option<Cart>,
    pub status: SyncStatus,
    /// Whether the cart is in sync and checkout may proceed.
    pub checkout_enabled: bool,
}

/// Set quantity request body.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub merchandise_id: MerchandiseId,
    pub quantity: u32,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub merchandise_id: MerchandiseId,
    pub quantity: Option<u32>,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub merchandise_id: MerchandiseId,
}

fn require_id(merchandise_id: &MerchandiseId) -> Result<()> {
    if merchandise_id.as_str().trim().is_empty() {
        return Err(AppError::BadRequest("merchandise_id is required".to_string()));
    }
    Ok(())
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The cart driver of the request's session, created on first use.
async fn session_cart(state: &AppState, session: &Session) -> Result<SessionCart<SharedGateway>> {
    let existing = session
        .get::<String>(keys::CART_SESSION)
        .await
        .map_err(StorageError::from)?;
    let key = match existing {
        Some(key) => key,
        None => {
            let key = Uuid::new_v4().to_string();
            session
                .insert(keys::CART_SESSION, &key)
                .await
                .map_err(StorageError::from)?;
            key
        }
    };

    state
        .carts()
        .get(&key)
        .await
        .map_err(|e| AppError::Internal(format!("cart session unavailable: {e}")))
}

async fn respond(cart: &SessionCart<SharedGateway>) -> Result<Json<CartResponse>> {
    let local = cart.local_cart().await?;
    let state = cart.state();
    Ok(Json(CartResponse {
        items: local.items().to_vec(),
        cart: state.cart,
        status: state.status,
        checkout_enabled: state.checkout_enabled,
    }))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart, reconciling it first.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartResponse>> {
    let cart = session_cart(&state, &session).await?;
    cart.sync_now().await?;
    respond(&cart).await
}

/// Explicit reconcile ("Update Cart").
#[instrument(skip(state, session))]
pub async fn sync(State(state): State<AppState>, session: Session) -> Result<Json<CartResponse>> {
    add_breadcrumb("cart", "Requested cart sync", None);
    let cart = session_cart(&state, &session).await?;
    cart.sync_now().await?;
    respond(&cart).await
}

/// Overwrite the quantity of an item.
#[instrument(skip(state, session))]
pub async fn set_quantity(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartResponse>> {
    require_id(&request.merchandise_id)?;
    add_breadcrumb(
        "cart",
        "Set item quantity",
        Some(&[("merchandise_id", request.merchandise_id.as_str())]),
    );

    let cart = session_cart(&state, &session).await?;
    cart.set_quantity(request.merchandise_id, request.quantity)
        .await?;
    respond(&cart).await
}

/// Add an item, incrementing its quantity if already present.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    require_id(&request.merchandise_id)?;
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }
    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("merchandise_id", request.merchandise_id.as_str())]),
    );

    let cart = session_cart(&state, &session).await?;
    cart.add_item(request.merchandise_id, quantity).await?;
    respond(&cart).await
}

/// Remove an item entirely.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartResponse>> {
    require_id(&request.merchandise_id)?;
    add_breadcrumb(
        "cart",
        "Removed item",
        Some(&[("merchandise_id", request.merchandise_id.as_str())]),
    );

    let cart = session_cart(&state, &session).await?;
    cart.remove_item(&request.merchandise_id).await?;
    respond(&cart).await
}

/// Redirect to Shopify checkout.
///
/// Only an in-sync cart goes to checkout; anything else is sent back to the
/// cart page to reconcile first.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = session_cart(&state, &session).await?;

    match cart.checkout_url() {
        Some(url) => Ok(Redirect::to(&url).into_response()),
        None => Ok(Redirect::to("/cart").into_response()),
    }
}
