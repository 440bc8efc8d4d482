// purchase_flow/src/store.rs

//! Persistence collaborators. The purchase flow never persists by itself; the
//! boundary services hand holders to these traits once processing is done.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{event, Level};

use crate::core::actor::{CustomerId, Member};
use crate::core::holder::{HolderId, HolderKind, ItemHolder};
use crate::error::{FlowError, FlowResult};

/// Loads and saves carts and orders.
#[async_trait]
pub trait HolderStore: Send + Sync {
  async fn load(&self, id: HolderId) -> FlowResult<ItemHolder>;

  /// Persists `holder`, assigning an identity to a new one.
  ///
  /// The stored version must equal `holder.version`, otherwise
  /// [`FlowError::ConcurrencyConflict`]. On success the version is advanced.
  async fn save(&self, holder: &mut ItemHolder) -> FlowResult<()>;

  async fn list_carts_for(&self, customer: CustomerId) -> FlowResult<Vec<ItemHolder>>;

  async fn remove(&self, id: HolderId) -> FlowResult<()>;
}

/// Persists staff login timestamps.
#[async_trait]
pub trait MemberStore: Send + Sync {
  async fn record_login(&self, member: &Member) -> FlowResult<()>;
}

#[derive(Debug, Default)]
struct StoreState {
  holders: BTreeMap<HolderId, ItemHolder>,
  members: HashMap<u64, Member>,
  next_id: u64,
}

/// Process-local implementation of both stores.
#[derive(Debug, Default)]
pub struct InMemoryStore {
  state: RwLock<StoreState>,
  member_writes_failing: AtomicBool,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every following `record_login` fail, to simulate an unavailable backend.
  pub fn set_member_writes_failing(&self, failing: bool) {
    self.member_writes_failing.store(failing, Ordering::SeqCst);
  }

  pub fn member(&self, id: u64) -> Option<Member> {
    self.state.read().members.get(&id).cloned()
  }

  pub fn holder(&self, id: HolderId) -> Option<ItemHolder> {
    self.state.read().holders.get(&id).cloned()
  }

  pub fn len(&self) -> usize {
    self.state.read().holders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl HolderStore for InMemoryStore {
  async fn load(&self, id: HolderId) -> FlowResult<ItemHolder> {
    self
      .state
      .read()
      .holders
      .get(&id)
      .cloned()
      .ok_or(FlowError::NotFound { holder_id: id })
  }

  async fn save(&self, holder: &mut ItemHolder) -> FlowResult<()> {
    let mut state = self.state.write();
    match holder.id {
      None => {
        state.next_id += 1;
        let id = HolderId(state.next_id);
        holder.id = Some(id);
        holder.version = 1;
        state.holders.insert(id, holder.clone());
        event!(Level::DEBUG, holder_id = %id, "Inserted item holder.");
      }
      Some(id) => {
        let stored_version = state
          .holders
          .get(&id)
          .map(|stored| stored.version)
          .ok_or(FlowError::NotFound { holder_id: id })?;
        if stored_version != holder.version {
          event!(Level::WARN, holder_id = %id, expected = holder.version, found = stored_version, "Stale item holder.");
          return Err(FlowError::ConcurrencyConflict {
            holder_id: id,
            expected: holder.version,
            found: stored_version,
          });
        }
        holder.version += 1;
        state.holders.insert(id, holder.clone());
        event!(Level::DEBUG, holder_id = %id, version = holder.version, "Updated item holder.");
      }
    }
    Ok(())
  }

  async fn list_carts_for(&self, customer: CustomerId) -> FlowResult<Vec<ItemHolder>> {
    Ok(
      self
        .state
        .read()
        .holders
        .values()
        .filter(|h| h.kind == HolderKind::Cart && h.customer_id == Some(customer))
        .cloned()
        .collect(),
    )
  }

  async fn remove(&self, id: HolderId) -> FlowResult<()> {
    self.state.write().holders.remove(&id);
    Ok(())
  }
}

#[async_trait]
impl MemberStore for InMemoryStore {
  async fn record_login(&self, member: &Member) -> FlowResult<()> {
    if self.member_writes_failing.load(Ordering::SeqCst) {
      return Err(FlowError::Store {
        source: anyhow::anyhow!("member store unavailable"),
      });
    }
    self.state.write().members.insert(member.id, member.clone());
    Ok(())
  }
}
