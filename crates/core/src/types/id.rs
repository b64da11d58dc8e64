//! Newtype IDs for type-safe Shopify references.
//!
//! Shopify identifies every resource with an opaque global ID string
//! (`gid://shopify/ProductVariant/123`). Use the `define_gid!` macro to create
//! wrappers that prevent accidentally passing a cart line ID where a
//! merchandise ID is expected.

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use storefront_cart_core::define_gid;
/// define_gid!(VariantGid);
/// define_gid!(OrderGid);
///
/// let variant = VariantGid::new("gid://shopify/ProductVariant/1");
/// let order = OrderGid::new("gid://shopify/Order/1");
///
/// // These are different types, so this won't compile:
/// // let _: VariantGid = order;
/// # let _ = (variant, order);
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the ID string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Purchasable product variant (the `merchandiseId` of a cart line input).
define_gid!(MerchandiseId);
// Remote cart resource.
define_gid!(CartId);
// Server-assigned line within a remote cart.
define_gid!(CartLineId);
