// purchase_flow/src/consolidation/merge.rs

//! Folds a customer's persisted carts into the carts of the current session.
//!
//! Carts are compatible when they share a sale type. All compatible carts
//! collapse into one; carts of different sale types stay apart.

use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::core::actor::{Customer, CustomerId};
use crate::core::holder::{HolderId, ItemHolder};
use crate::error::FlowResult;
use crate::store::HolderStore;

/// A surviving cart and the persisted carts folded into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedCart {
  pub cart: ItemHolder,
  /// Persisted carts to delete once `cart` is saved.
  pub absorbed: Vec<HolderId>,
}

/// Carts after folding, plus persisted carts left without items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedCarts {
  pub carts: Vec<FoldedCart>,
  /// Nothing survives of these; they can be deleted unconditionally.
  pub emptied: Vec<HolderId>,
}

/// Folds `persisted` into `session`.
///
/// Session carts come first and survive over persisted ones of the same sale
/// type. A surviving cart without identity adopts the identity and version of
/// the first persisted cart folded into it. Persisted carts already present in
/// the session are not counted twice. Carts left without items are dropped.
pub fn fold_carts(customer: CustomerId, session: Vec<ItemHolder>, persisted: Vec<ItemHolder>) -> MergedCarts {
  let session_ids: Vec<HolderId> = session.iter().filter_map(|cart| cart.id).collect();
  let incoming = session.into_iter().chain(
    persisted
      .into_iter()
      .filter(|cart| cart.id.map_or(true, |id| !session_ids.contains(&id))),
  );

  let mut merged = MergedCarts::default();
  for cart in incoming {
    match merged.carts.iter_mut().find(|kept| kept.cart.sale_type == cart.sale_type) {
      None => {
        let mut cart = cart;
        cart.customer_id = Some(customer);
        merged.carts.push(FoldedCart {
          cart,
          absorbed: Vec::new(),
        });
      }
      Some(kept) => {
        match (kept.cart.id, cart.id) {
          (None, Some(_)) => {
            kept.cart.id = cart.id;
            kept.cart.version = cart.version;
          }
          (_, Some(id)) => kept.absorbed.push(id),
          (_, None) => {}
        }
        for item in cart.items {
          kept.cart.absorb_item(item);
        }
      }
    }
  }

  let (kept, empty): (Vec<_>, Vec<_>) = merged.carts.into_iter().partition(|folded| !folded.cart.items.is_empty());
  for folded in empty {
    merged.emptied.extend(folded.cart.id);
    merged.emptied.extend(folded.absorbed);
  }
  merged.carts = kept;
  merged
}

/// Cart-merge collaborator used on customer login.
pub struct CartConsolidationService {
  store: Arc<dyn HolderStore>,
}

impl CartConsolidationService {
  pub fn new(store: Arc<dyn HolderStore>) -> Self {
    Self { store }
  }

  #[instrument(
    name = "CartConsolidationService::merge_from_persisted",
    skip_all,
    fields(customer_id = %customer.id, session_carts = session_carts.len()),
    err(Display)
  )]
  pub async fn merge_from_persisted(&self, customer: &Customer, session_carts: Vec<ItemHolder>) -> FlowResult<MergedCarts> {
    let persisted = self.store.list_carts_for(customer.id).await?;
    event!(Level::DEBUG, persisted_carts = persisted.len(), "Loaded persisted carts.");
    let merged = fold_carts(customer.id, session_carts, persisted);
    event!(
      Level::DEBUG,
      carts = merged.carts.len(),
      emptied = merged.emptied.len(),
      "Carts folded."
    );
    Ok(merged)
  }

  /// Saves every surviving cart, then deletes the carts folded into it.
  ///
  /// Returns one result per cart, in order. A cart that fails to save keeps
  /// its folded carts in the store and does not affect the other carts.
  #[instrument(name = "CartConsolidationService::save", skip_all, fields(carts = merged.carts.len()))]
  pub async fn save(&self, merged: &mut MergedCarts) -> Vec<FlowResult<()>> {
    let mut results = Vec::with_capacity(merged.carts.len());
    for folded in &mut merged.carts {
      results.push(self.save_folded(folded).await);
    }
    for id in &merged.emptied {
      if let Err(err) = self.store.remove(*id).await {
        event!(Level::WARN, holder_id = %id, error = %err, "Failed to remove emptied cart.");
      }
    }
    results
  }

  async fn save_folded(&self, folded: &mut FoldedCart) -> FlowResult<()> {
    if let Err(err) = self.store.save(&mut folded.cart).await {
      event!(
        Level::WARN,
        cart_id = ?folded.cart.id,
        kept = folded.absorbed.len(),
        error = %err,
        "Merged cart not saved, folded carts kept."
      );
      return Err(err);
    }
    for id in &folded.absorbed {
      self.store.remove(*id).await?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::holder::{LineItem, OrderStatus, SaleType};
  use crate::error::FlowError;
  use crate::store::InMemoryStore;

  fn cart(sale_type: u32, items: &[(u64, u32)]) -> ItemHolder {
    items.iter().fold(ItemHolder::cart(SaleType(sale_type), OrderStatus(1)), |cart, (pc, qty)| {
      cart.with_item(LineItem::new(*pc, format!("item-{}", pc), *qty, 100))
    })
  }

  #[test]
  fn compatible_carts_collapse_into_the_session_cart() {
    let session = vec![cart(1, &[(1, 1)])];
    let persisted = vec![
      cart(1, &[(1, 2)]).with_id(HolderId(10)),
      cart(1, &[(2, 1)]).with_id(HolderId(11)),
    ];
    let merged = fold_carts(CustomerId(5), session, persisted);

    assert_eq!(merged.carts.len(), 1);
    let kept = &merged.carts[0].cart;
    assert_eq!(kept.id, Some(HolderId(10)));
    assert_eq!(kept.customer_id, Some(CustomerId(5)));
    assert_eq!(kept.items.len(), 2);
    assert_eq!(kept.items[0].quantity, 3);
    assert_eq!(merged.carts[0].absorbed, vec![HolderId(11)]);
    assert!(merged.emptied.is_empty());
  }

  #[test]
  fn different_sale_types_stay_apart() {
    let merged = fold_carts(CustomerId(5), vec![cart(1, &[(1, 1)])], vec![cart(2, &[(9, 1)]).with_id(HolderId(3))]);
    assert_eq!(merged.carts.len(), 2);
    assert!(merged.carts.iter().all(|folded| folded.absorbed.is_empty()));
  }

  #[test]
  fn persisted_cart_already_in_session_is_not_doubled() {
    let same = cart(1, &[(1, 2)]).with_id(HolderId(10));
    let merged = fold_carts(CustomerId(5), vec![same.clone()], vec![same]);
    assert_eq!(merged.carts.len(), 1);
    assert_eq!(merged.carts[0].cart.items[0].quantity, 2);
    assert!(merged.carts[0].absorbed.is_empty());
  }

  #[test]
  fn empty_carts_are_dropped_and_removed() {
    let merged = fold_carts(CustomerId(5), vec![cart(2, &[])], vec![cart(1, &[(1, 1)]).with_id(HolderId(4))]);
    assert_eq!(merged.carts.len(), 1);
    assert_eq!(merged.carts[0].cart.sale_type, SaleType(1));

    let merged = fold_carts(
      CustomerId(5),
      vec![],
      vec![cart(3, &[]).with_id(HolderId(8)), cart(3, &[]).with_id(HolderId(9))],
    );
    assert!(merged.carts.is_empty());
    assert_eq!(merged.emptied, vec![HolderId(8), HolderId(9)]);
  }

  #[tokio::test]
  async fn failed_save_keeps_only_its_own_folded_carts() {
    let store = Arc::new(InMemoryStore::new());
    let mut a = cart(1, &[(1, 1)]).with_customer(CustomerId(5));
    let mut b = cart(1, &[(2, 1)]).with_customer(CustomerId(5));
    let mut c = cart(2, &[(9, 1)]).with_customer(CustomerId(5));
    let mut d = cart(2, &[(8, 1)]).with_customer(CustomerId(5));
    for holder in [&mut a, &mut b, &mut c, &mut d] {
      store.save(holder).await.unwrap();
    }
    // Someone else saved `c` after this copy was taken.
    let stale_c = c.clone();
    store.save(&mut c).await.unwrap();

    let service = CartConsolidationService::new(store.clone());
    let customer = Customer::new(5, "five@example.com");
    let mut merged = service.merge_from_persisted(&customer, vec![stale_c]).await.unwrap();
    let results = service.save(&mut merged).await;

    let by_sale_type = |sale_type: u32| {
      merged
        .carts
        .iter()
        .position(|folded| folded.cart.sale_type == SaleType(sale_type))
        .unwrap()
    };
    assert!(results[by_sale_type(1)].is_ok());
    assert!(matches!(
      results[by_sale_type(2)],
      Err(FlowError::ConcurrencyConflict { .. })
    ));
    // The type-1 save went through, so `b` is gone; `d` stays with the failed cart.
    assert!(store.holder(b.id.unwrap()).is_none());
    assert_eq!(store.holder(a.id.unwrap()).unwrap().quantity(), 2);
    assert!(store.holder(d.id.unwrap()).is_some());
  }
}
