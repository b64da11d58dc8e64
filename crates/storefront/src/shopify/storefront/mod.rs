//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` for type-safe queries with `reqwest` 0.13 for HTTP.
//! Cart state is never cached here; every call is a round-trip.

mod conversions;

pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use secrecy::{ExposeSecret, SecretString};
use storefront_cart_core::{CartId, CartLineId};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};

use conversions::{CartData, UserErrorData, convert_cart};
use queries::{
    AddToCart, CreateCart, GetCart, RemoveFromCart, UpdateCartLines, add_to_cart, create_cart,
    get_cart, remove_from_cart, update_cart_lines,
};

/// Per-request timeout for Storefront API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API cart operations.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        Self::with_endpoint(config.endpoint(), config.storefront_private_token.clone())
    }

    /// Create a client against an explicit GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        access_token: SecretString,
    ) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: endpoint.into(),
                access_token,
            }),
        })
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            // See: https://shopify.dev/docs/storefronts/headless/building-with-the-storefront-api/getting-started
            .header(
                "Shopify-Storefront-Private-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::InvalidResponse(format!("unparseable body: {e}")));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.iter().map(super::describe_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::InvalidResponse("no data in response".to_string())
        })
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart seeded with the given lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput {
                lines: Some(
                    lines
                        .into_iter()
                        .map(|line| create_cart::CartLineInput {
                            merchandise_id: line.merchandise_id.into_inner(),
                            quantity: Some(line.quantity),
                        })
                        .collect(),
                ),
                note: None,
            },
        };

        let data = self.execute::<CreateCart>(variables).await?;

        let result = data.cart_create.ok_or_else(|| missing_payload("cartCreate"))?;
        mutation_cart("cartCreate", result.cart, result.user_errors)
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart no longer exists (expired
    /// or completed), or another error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        let cart = data
            .cart
            .ok_or_else(|| ShopifyError::NotFound(cart_id.clone()))?;
        convert_cart(cart)
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, line_count = lines.len()))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_to_cart::Variables {
            cart_id: cart_id.to_string(),
            lines: lines
                .into_iter()
                .map(|line| add_to_cart::CartLineInput {
                    merchandise_id: line.merchandise_id.into_inner(),
                    quantity: Some(line.quantity),
                })
                .collect(),
        };

        let data = self.execute::<AddToCart>(variables).await?;

        let result = data.cart_lines_add.ok_or_else(|| missing_payload("cartLinesAdd"))?;
        mutation_cart("cartLinesAdd", result.cart, result.user_errors)
    }

    /// Update cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, line_count = lines.len()))]
    pub async fn update_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: lines
                .into_iter()
                .map(|line| update_cart_lines::CartLineUpdateInput {
                    id: line.id.into_inner(),
                    merchandise_id: line.merchandise_id.map(|m| m.into_inner()),
                    quantity: line.quantity,
                })
                .collect(),
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;

        let result = data.cart_lines_update.ok_or_else(|| missing_payload("cartLinesUpdate"))?;
        mutation_cart("cartLinesUpdate", result.cart, result.user_errors)
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id, line_count = line_ids.len()))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_from_cart::Variables {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.into_iter().map(CartLineId::into_inner).collect(),
        };

        let data = self.execute::<RemoveFromCart>(variables).await?;

        let result = data.cart_lines_remove.ok_or_else(|| missing_payload("cartLinesRemove"))?;
        mutation_cart("cartLinesRemove", result.cart, result.user_errors)
    }
}

/// A mutation answered with a null payload.
fn missing_payload(operation: &str) -> ShopifyError {
    ShopifyError::InvalidResponse(format!("{operation} returned no payload"))
}

/// The cart of a mutation payload, unless Shopify rejected the input.
fn mutation_cart<C: CartData, E: UserErrorData>(
    operation: &'static str,
    cart: Option<C>,
    user_errors: Vec<E>,
) -> Result<Cart, ShopifyError> {
    if !user_errors.is_empty() {
        return Err(ShopifyError::UserErrors {
            operation,
            errors: user_errors
                .into_iter()
                .map(UserErrorData::into_user_error)
                .collect(),
        });
    }
    let cart = cart.ok_or_else(|| {
        ShopifyError::InvalidResponse(format!("{operation} returned neither cart nor user errors"))
    })?;
    convert_cart(cart)
}
