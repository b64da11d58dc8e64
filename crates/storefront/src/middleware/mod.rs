//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, names the cart driver)

pub mod session;

pub use session::{SESSION_COOKIE_NAME, create_session_layer};
