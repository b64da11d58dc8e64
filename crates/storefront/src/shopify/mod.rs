//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Uses `graphql-client` crate for type-safe GraphQL queries
//! - Shopify owns the cart; this service only holds a cart ID and the last
//!   snapshot it was handed back
//! - Cart operations are never cached (mutable state)
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_cart::shopify::{CartLineInput, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify)?;
//!
//! // Create a cart and add items
//! let cart = client.create_cart(Vec::new()).await?;
//! let cart = client.add_to_cart(&cart.id, vec![CartLineInput {
//!     merchandise_id: "gid://shopify/ProductVariant/1".into(),
//!     quantity: 1,
//! }]).await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::*;

use storefront_cart_core::CartId;
use thiserror::Error;

/// Errors from a Storefront cart call.
///
/// Only [`Http`](Self::Http) (the request never got an answer) and
/// [`NotFound`](Self::NotFound) (the cart ID no longer resolves) are told
/// apart by callers; everything else means the API answered with something
/// other than a cart.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Connect, timeout or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Throttled; carries the `Retry-After` seconds.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status other than 429.
    #[error("Storefront API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Top-level `errors` of the GraphQL response.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// A cart mutation answered with `userErrors` instead of a cart.
    #[error("{operation} rejected: {}", format_user_errors(.errors))]
    UserErrors {
        operation: &'static str,
        errors: Vec<CartUserError>,
    },

    /// `cart(id:)` resolved to null: expired or already checked out.
    #[error("Cart not found: {0}")]
    NotFound(CartId),

    /// The body was not the shape the cart operations expect.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One line per error: message, then code and offending input field.
fn format_user_errors(errors: &[CartUserError]) -> String {
    errors
        .iter()
        .map(|e| {
            let code = e
                .code
                .as_deref()
                .map(|code| format!(" [{code}]"))
                .unwrap_or_default();
            let field = e
                .field
                .as_ref()
                .filter(|field| !field.is_empty())
                .map(|field| format!(" at {}", field.join(".")))
                .unwrap_or_default();
            format!("{}{code}{field}", e.message)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render a GraphQL error with the response path it points at.
fn describe_graphql_error(error: &graphql_client::Error) -> String {
    let path = error
        .path
        .as_deref()
        .filter(|path| !path.is_empty())
        .map(|path| {
            path.iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(key) => key.clone(),
                    graphql_client::PathFragment::Index(i) => i.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        });

    match path {
        Some(path) => format!("{} (at {path})", error.message),
        None => error.message.clone(),
    }
}
