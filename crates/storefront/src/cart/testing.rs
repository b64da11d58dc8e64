//! Test doubles for the cart modules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use storefront_cart_core::{CartId, CartLineId, MerchandiseId, Price};

use super::gateway::{CartGateway, GatewayError};
use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartLineInput, CartLineUpdateInput, CartMerchandise,
};

pub fn line(line_id: &str, merchandise_id: &str, quantity: i64) -> CartLine {
    CartLine {
        id: CartLineId::new(line_id),
        quantity,
        cost: CartLineCost {
            amount_per_quantity: Price::zero("USD"),
            subtotal: Price::zero("USD"),
        },
        merchandise: CartMerchandise {
            id: MerchandiseId::new(merchandise_id),
            title: "Default Title".to_string(),
            image: None,
            product_handle: merchandise_id.to_lowercase(),
            product_title: merchandise_id.to_string(),
        },
    }
}

pub fn cart(cart_id: &str, lines: Vec<CartLine>) -> Cart {
    Cart {
        id: CartId::new(cart_id),
        checkout_url: format!("https://shop.example/checkout/{cart_id}"),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
        total_quantity: lines.iter().map(|l| l.quantity).sum(),
        cost: CartCost {
            subtotal: Price::zero("USD"),
            total: Price::zero("USD"),
        },
        lines,
    }
}

/// A gateway call as recorded by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(CartId),
    Create(Vec<CartLineInput>),
    Add(CartId, Vec<CartLineInput>),
    Update(CartId, Vec<CartLineUpdateInput>),
    Remove(CartId, Vec<CartLineId>),
}

/// Which kind of call to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Fetch,
    Create,
    Add,
    Update,
    Remove,
}

#[derive(Default)]
struct State {
    carts: HashMap<CartId, Cart>,
    calls: Vec<Call>,
    fail_on: Option<CallKind>,
    next_cart: u32,
    next_line: u32,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-memory remote that behaves like the Storefront cart API and records
/// every call. Clones share state.
#[derive(Clone, Default)]
pub struct RecordingGateway {
    state: Arc<Mutex<State>>,
    latency: Option<Duration>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Seed a remote cart.
    pub fn insert(&self, cart: Cart) {
        self.with_state(|s| {
            s.carts.insert(cart.id.clone(), cart);
        });
    }

    /// Forget a remote cart so fetches answer `NotFound`.
    pub fn expire(&self, cart_id: &CartId) {
        self.with_state(|s| {
            s.carts.remove(cart_id);
        });
    }

    pub fn fail_on(&self, kind: Option<CallKind>) {
        self.with_state(|s| s.fail_on = kind);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|s| s.calls.clone())
    }

    /// Calls other than fetches.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Fetch(_)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    pub fn remote(&self, cart_id: &CartId) -> Option<Cart> {
        self.with_state(|s| s.carts.get(cart_id).cloned())
    }

    pub fn max_in_flight(&self) -> usize {
        self.with_state(|s| s.max_in_flight)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    async fn call(
        &self,
        kind: CallKind,
        call: Call,
        apply: impl FnOnce(&mut State) -> Result<Cart, GatewayError>,
    ) -> Result<Cart, GatewayError> {
        self.with_state(|s| {
            s.calls.push(call);
            s.in_flight += 1;
            s.max_in_flight = s.max_in_flight.max(s.in_flight);
        });
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.with_state(|s| {
            s.in_flight -= 1;
            if s.fail_on == Some(kind) {
                return Err(GatewayError::Network(format!("injected {kind:?} failure")));
            }
            apply(s)
        })
    }
}

fn existing<'a>(s: &'a mut State, cart_id: &CartId) -> Result<&'a mut Cart, GatewayError> {
    s.carts
        .get_mut(cart_id)
        .ok_or_else(|| GatewayError::NotFound(cart_id.to_string()))
}

fn push_lines(s: &mut State, cart_id: &CartId, lines: &[CartLineInput]) -> Vec<CartLine> {
    lines
        .iter()
        .map(|input| {
            s.next_line += 1;
            line(
                &format!("{cart_id}/line/{}", s.next_line),
                input.merchandise_id.as_str(),
                input.quantity,
            )
        })
        .collect()
}

fn refreshed(cart: &mut Cart) -> Cart {
    cart.total_quantity = cart.lines.iter().map(|l| l.quantity).sum();
    cart.clone()
}

#[async_trait]
impl CartGateway for RecordingGateway {
    async fn fetch_by_id(&self, cart_id: &CartId) -> Result<Cart, GatewayError> {
        self.call(CallKind::Fetch, Call::Fetch(cart_id.clone()), |s| {
            existing(s, cart_id).map(|c| c.clone())
        })
        .await
    }

    async fn create_with_lines(&self, lines: Vec<CartLineInput>) -> Result<Cart, GatewayError> {
        self.call(CallKind::Create, Call::Create(lines.clone()), |s| {
            s.next_cart += 1;
            let cart_id = CartId::new(format!("gid://shopify/Cart/{}", s.next_cart));
            let new_lines = push_lines(s, &cart_id, &lines);
            let created = cart(cart_id.as_str(), new_lines);
            s.carts.insert(cart_id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, GatewayError> {
        self.call(
            CallKind::Add,
            Call::Add(cart_id.clone(), lines.clone()),
            |s| {
                existing(s, cart_id)?;
                let new_lines = push_lines(s, cart_id, &lines);
                let remote = existing(s, cart_id)?;
                remote.lines.extend(new_lines);
                Ok(refreshed(remote))
            },
        )
        .await
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, GatewayError> {
        self.call(
            CallKind::Update,
            Call::Update(cart_id.clone(), lines.clone()),
            |s| {
                let remote = existing(s, cart_id)?;
                for update in &lines {
                    if let (Some(quantity), Some(target)) = (
                        update.quantity,
                        remote.lines.iter_mut().find(|l| l.id == update.id),
                    ) {
                        target.quantity = quantity;
                    }
                }
                // The remote drops lines updated to zero
                remote.lines.retain(|l| l.quantity > 0);
                Ok(refreshed(remote))
            },
        )
        .await
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, GatewayError> {
        self.call(
            CallKind::Remove,
            Call::Remove(cart_id.clone(), line_ids.clone()),
            |s| {
                let remote = existing(s, cart_id)?;
                remote.lines.retain(|l| !line_ids.contains(&l.id));
                Ok(refreshed(remote))
            },
        )
        .await
    }
}
