//! Domain types for Shopify Storefront cart data.
//!
//! These are the crate's own representations of API responses, decoupled
//! from the `graphql_client`-generated types (one set per operation).

use serde::{Deserialize, Serialize};
use storefront_cart_core::{CartId, CartLineId, MerchandiseId, Price};

// =============================================================================
// Image Types
// =============================================================================

/// Variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// CDN URL.
    pub url: String,
    /// Alt text.
    pub alt_text: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product variant referenced by a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: MerchandiseId,
    /// Variant title ("Default Title" for single-variant products).
    pub title: String,
    /// Variant image.
    pub image: Option<Image>,
    /// Parent product handle.
    pub product_handle: String,
    /// Parent product title.
    pub product_title: String,
}

/// Cost for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineCost {
    /// Price per unit.
    pub amount_per_quantity: Price,
    /// Line subtotal (before discounts).
    pub subtotal: Price,
}

/// A line item in the remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Server-assigned line ID, required for update/remove.
    pub id: CartLineId,
    /// Quantity.
    pub quantity: i64,
    /// Line cost.
    pub cost: CartLineCost,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

impl CartLine {
    /// The merchandise (variant) ID this line holds.
    #[must_use]
    pub const fn merchandise_id(&self) -> &MerchandiseId {
        &self.merchandise.id
    }
}

/// Cart cost summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    pub subtotal: Price,
    /// Total amount.
    pub total: Price,
}

/// A snapshot of the server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Hosted checkout URL.
    pub checkout_url: String,
    /// Created timestamp (RFC 3339).
    pub created_at: String,
    /// Updated timestamp (RFC 3339).
    pub updated_at: String,
    /// Sum of line quantities.
    pub total_quantity: i64,
    /// Cost summary.
    pub cost: CartCost,
    /// Cart lines in server order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Find the first line holding the given merchandise.
    #[must_use]
    pub fn line_for(&self, merchandise_id: &MerchandiseId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.merchandise_id() == merchandise_id)
    }
}

/// User error returned from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    /// Error code.
    pub code: Option<String>,
    /// Field that caused the error.
    pub field: Option<Vec<String>>,
    /// Error message.
    pub message: String,
}

/// Input for adding a line to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: MerchandiseId,
    /// Quantity to add.
    pub quantity: i64,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: CartLineId,
    /// Product variant ID (unchanged; sent so the line keeps its merchandise).
    pub merchandise_id: Option<MerchandiseId>,
    /// New quantity.
    pub quantity: Option<i64>,
}
