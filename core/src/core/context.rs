// purchase_flow/src/core/context.rs

//! Defines `PurchaseContext`, the per-invocation companion of the item holder
//! being processed.

use std::sync::Arc;

use crate::core::actor::Actor;
use crate::core::holder::ItemHolder;

/// Whether the holder is being created or edited. Decided by identity presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
  New,
  Edit,
}

/// Where the operation originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
  Storefront,
  BackOffice,
}

/// The pre-mutation snapshot of the holder, the actor, and flow metadata.
///
/// Built once per pipeline invocation. The origin snapshot is only reachable
/// through a shared reference, so processors cannot change it.
#[derive(Debug, Clone)]
pub struct PurchaseContext {
  origin: Arc<ItemHolder>,
  actor: Actor,
  flow: FlowKind,
  channel: Channel,
}

impl PurchaseContext {
  /// Creates a context from a snapshot taken before any mutation of the target.
  ///
  /// Staff actors default to the back-office channel, customers to the storefront.
  pub fn new(origin: ItemHolder, actor: Actor) -> Self {
    let flow = if origin.is_new() { FlowKind::New } else { FlowKind::Edit };
    let channel = if actor.is_staff() {
      Channel::BackOffice
    } else {
      Channel::Storefront
    };
    Self {
      origin: Arc::new(origin),
      actor,
      flow,
      channel,
    }
  }

  /// Snapshots `holder` as it is right now.
  pub fn snapshot(holder: &ItemHolder, actor: Actor) -> Self {
    Self::new(holder.clone(), actor)
  }

  pub fn with_channel(mut self, channel: Channel) -> Self {
    self.channel = channel;
    self
  }

  pub fn origin(&self) -> &ItemHolder {
    &self.origin
  }

  pub fn actor(&self) -> &Actor {
    &self.actor
  }

  pub fn flow(&self) -> FlowKind {
    self.flow
  }

  pub fn is_new(&self) -> bool {
    self.flow == FlowKind::New
  }

  pub fn channel(&self) -> Channel {
    self.channel
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::actor::{Customer, Member};
  use crate::core::holder::{HolderId, OrderStatus};

  #[test]
  fn flow_kind_follows_origin_identity() {
    let actor = Actor::Customer(Customer::new(1, "a@example.com"));
    let new_ctx = PurchaseContext::new(ItemHolder::order(OrderStatus(1)), actor.clone());
    assert_eq!(new_ctx.flow(), FlowKind::New);

    let edit_ctx = PurchaseContext::new(ItemHolder::order(OrderStatus(1)).with_id(HolderId(9)), actor);
    assert_eq!(edit_ctx.flow(), FlowKind::Edit);
  }

  #[test]
  fn channel_defaults_from_actor() {
    let staff = PurchaseContext::new(ItemHolder::order(OrderStatus(1)), Actor::Staff(Member::new(1, "admin")));
    assert_eq!(staff.channel(), Channel::BackOffice);
    let overridden = staff.with_channel(Channel::Storefront);
    assert_eq!(overridden.channel(), Channel::Storefront);
  }
}
