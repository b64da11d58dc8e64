//! Cart type conversion functions.
//!
//! `graphql_client` generates a separate copy of every fragment type per
//! operation module, so the conversions are stamped out once per operation.

use storefront_cart_core::{CartId, CartLineId, MerchandiseId, Price};

use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartMerchandise, CartUserError, Image,
};

use super::queries::{add_to_cart, create_cart, get_cart, remove_from_cart, update_cart_lines};

// =============================================================================
// Conversion Traits
// =============================================================================

/// Generated `CartFields` fragment of one operation.
pub trait CartData {
    fn try_into_cart(self) -> Result<Cart, ShopifyError>;
}

/// Generated `CartUserErrorFields` fragment of one operation.
pub trait UserErrorData {
    fn into_user_error(self) -> CartUserError;
}

trait MoneyData {
    fn try_into_price(self) -> Result<Price, ShopifyError>;
}

pub fn convert_cart<T: CartData>(cart: T) -> Result<Cart, ShopifyError> {
    cart.try_into_cart()
}

/// Lines fetched per cart; see `lines(first:)` in `cart.graphql`.
const LINE_PAGE_SIZE: usize = 250;

fn parse_price(amount: &str, currency_code: &str) -> Result<Price, ShopifyError> {
    Price::parse(amount, currency_code)
        .map_err(|e| ShopifyError::InvalidResponse(format!("money {amount} {currency_code}: {e}")))
}

// =============================================================================
// Per-operation Implementations
// =============================================================================

macro_rules! impl_cart_data {
    ($($op:ident),+ $(,)?) => {$(
        impl MoneyData for $op::MoneyFields {
            fn try_into_price(self) -> Result<Price, ShopifyError> {
                let currency_code = match self.currency_code {
                    $op::CurrencyCode::Other(code) => code,
                    known => format!("{known:?}"),
                };
                parse_price(&self.amount, &currency_code)
            }
        }

        impl CartData for $op::CartFields {
            fn try_into_cart(self) -> Result<Cart, ShopifyError> {
                // A partial line list would re-add whatever is off the page
                if self.lines.page_info.has_next_page {
                    return Err(ShopifyError::InvalidResponse(format!(
                        "cart {} has more than {LINE_PAGE_SIZE} lines",
                        self.id
                    )));
                }

                let lines = self
                    .lines
                    .edges
                    .into_iter()
                    .map(|edge| -> Result<CartLine, ShopifyError> {
                        let line = edge.node;
                        let $op::CartLineFieldsMerchandise::ProductVariant(variant) =
                            line.merchandise;
                        Ok(CartLine {
                            id: CartLineId::new(line.id),
                            quantity: line.quantity,
                            cost: CartLineCost {
                                amount_per_quantity: line.cost.amount_per_quantity.try_into_price()?,
                                subtotal: line.cost.subtotal_amount.try_into_price()?,
                            },
                            merchandise: CartMerchandise {
                                id: MerchandiseId::new(variant.id),
                                title: variant.title,
                                image: variant.image.map(|i| Image {
                                    url: i.url,
                                    alt_text: i.alt_text,
                                }),
                                product_handle: variant.product.handle,
                                product_title: variant.product.title,
                            },
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Cart {
                    id: CartId::new(self.id),
                    checkout_url: self.checkout_url,
                    created_at: self.created_at,
                    updated_at: self.updated_at,
                    total_quantity: self.total_quantity,
                    cost: CartCost {
                        subtotal: self.cost.subtotal_amount.try_into_price()?,
                        total: self.cost.total_amount.try_into_price()?,
                    },
                    lines,
                })
            }
        }
    )+};
}

macro_rules! impl_user_error_data {
    ($($op:ident),+ $(,)?) => {$(
        impl UserErrorData for $op::CartUserErrorFields {
            fn into_user_error(self) -> CartUserError {
                CartUserError {
                    code: self.code.map(|c| format!("{c:?}")),
                    field: self.field,
                    message: self.message,
                }
            }
        }
    )+};
}

impl_cart_data!(get_cart, create_cart, add_to_cart, update_cart_lines, remove_from_cart);
impl_user_error_data!(create_cart, add_to_cart, update_cart_lines, remove_from_cart);
