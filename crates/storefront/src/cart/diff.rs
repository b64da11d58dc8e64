//! Delta between the desired local cart and a remote cart snapshot.
//!
//! Lines are matched by merchandise ID. Line IDs only exist remotely.

use std::collections::HashSet;

use storefront_cart_core::{CartLineId, MerchandiseId};

use super::local::LocalCart;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};

/// The remote calls needed to make a remote cart match a local cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartDelta {
    /// Lines whose merchandise is no longer wanted, plus duplicate lines.
    pub to_remove: Vec<CartLineId>,
    /// Existing lines whose quantity differs from the desired one.
    pub to_update: Vec<CartLineUpdateInput>,
    /// Wanted merchandise with no remote line yet.
    pub to_add: Vec<CartLineInput>,
}

impl CartDelta {
    /// Whether applying this delta would issue no calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_update.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the delta that converges `remote` onto `local`.
///
/// - `to_remove` and `to_update` follow remote line order.
/// - `to_add` follows local order and skips quantity 0.
/// - A local quantity of 0 on an existing line is an update to 0, which the
///   remote treats as removal.
/// - When the remote holds several lines for one merchandise, the first is
///   reconciled and the rest are removed.
#[must_use]
pub fn diff(local: &LocalCart, remote: &Cart) -> CartDelta {
    let mut delta = CartDelta::default();
    let mut seen: HashSet<&MerchandiseId> = HashSet::new();

    for line in &remote.lines {
        let merchandise_id = line.merchandise_id();

        if !seen.insert(merchandise_id) {
            delta.to_remove.push(line.id.clone());
            continue;
        }

        match local.get(merchandise_id) {
            None => delta.to_remove.push(line.id.clone()),
            Some(item) if i64::from(item.quantity) != line.quantity => {
                delta.to_update.push(CartLineUpdateInput {
                    id: line.id.clone(),
                    merchandise_id: Some(merchandise_id.clone()),
                    quantity: Some(i64::from(item.quantity)),
                });
            }
            Some(_) => {}
        }
    }

    delta.to_add = local
        .purchasable()
        .filter(|item| !seen.contains(&item.merchandise_id))
        .map(|item| CartLineInput {
            merchandise_id: item.merchandise_id.clone(),
            quantity: i64::from(item.quantity),
        })
        .collect();

    delta
}

/// Lines to seed a newly created cart with.
#[must_use]
pub fn creation_lines(local: &LocalCart) -> Vec<CartLineInput> {
    local
        .purchasable()
        .map(|item| CartLineInput {
            merchandise_id: item.merchandise_id.clone(),
            quantity: i64::from(item.quantity),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::local::StoredItem;
    use crate::cart::testing::{cart, line};

    fn local(items: &[(&str, u32)]) -> LocalCart {
        items
            .iter()
            .map(|(id, qty)| StoredItem::new(*id, *qty))
            .collect()
    }

    #[test]
    fn test_mixed_delta() {
        let local = local(&[("A", 2), ("B", 1)]);
        let remote = cart("c", vec![line("1", "A", 1), line("2", "C", 3)]);

        let delta = diff(&local, &remote);

        assert_eq!(delta.to_remove, vec![CartLineId::new("2")]);
        assert_eq!(
            delta.to_update,
            vec![CartLineUpdateInput {
                id: CartLineId::new("1"),
                merchandise_id: Some(MerchandiseId::new("A")),
                quantity: Some(2),
            }]
        );
        assert_eq!(
            delta.to_add,
            vec![CartLineInput {
                merchandise_id: MerchandiseId::new("B"),
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_in_sync_is_empty() {
        let local = local(&[("A", 2), ("B", 1)]);
        let remote = cart("c", vec![line("1", "B", 1), line("2", "A", 2)]);

        assert!(diff(&local, &remote).is_empty());
    }

    #[test]
    fn test_empty_local_removes_everything() {
        let remote = cart("c", vec![line("1", "A", 1), line("2", "B", 1)]);
        let delta = diff(&LocalCart::new(), &remote);

        assert_eq!(
            delta.to_remove,
            vec![CartLineId::new("1"), CartLineId::new("2")]
        );
        assert!(delta.to_update.is_empty());
        assert!(delta.to_add.is_empty());
    }

    #[test]
    fn test_zero_quantity_is_not_added() {
        let local = local(&[("A", 0)]);
        let delta = diff(&local, &cart("c", vec![]));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_zero_quantity_updates_existing_line() {
        let local = local(&[("A", 0)]);
        let remote = cart("c", vec![line("1", "A", 3)]);

        let delta = diff(&local, &remote);

        assert!(delta.to_remove.is_empty());
        assert_eq!(delta.to_update.len(), 1);
        assert_eq!(delta.to_update.first().unwrap().quantity, Some(0));
    }

    #[test]
    fn test_duplicate_remote_lines_are_removed() {
        let local = local(&[("A", 2)]);
        let remote = cart("c", vec![line("1", "A", 2), line("2", "A", 1)]);

        let delta = diff(&local, &remote);

        assert_eq!(delta.to_remove, vec![CartLineId::new("2")]);
        assert!(delta.to_update.is_empty());
        assert!(delta.to_add.is_empty());
    }

    #[test]
    fn test_add_follows_local_order() {
        let local = local(&[("C", 1), ("A", 1), ("B", 1)]);
        let delta = diff(&local, &cart("c", vec![]));

        let order: Vec<&str> = delta
            .to_add
            .iter()
            .map(|l| l.merchandise_id.as_str())
            .collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_creation_lines_skip_zero() {
        let local = local(&[("A", 2), ("B", 0), ("C", 1)]);
        let lines = creation_lines(&local);

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.quantity > 0));
    }
}
