// purchase_flow/src/service.rs

//! `PurchaseService` drives a holder through the registered flow and hands it to
//! the store afterwards. It is the only place where processing and persistence meet.

use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::core::actor::Actor;
use crate::core::context::PurchaseContext;
use crate::core::holder::{HolderId, ItemHolder};
use crate::core::result::ProcessingResult;
use crate::error::{FlowError, FlowResult};
use crate::registry::{FlowRegistry, FlowTrigger};
use crate::store::HolderStore;

/// The processed holder and what processing reported.
#[derive(Debug)]
pub struct PurchaseOutcome {
  pub holder: ItemHolder,
  pub result: ProcessingResult,
  /// `true` when the holder was saved. A result with errors is never saved.
  pub committed: bool,
}

pub struct PurchaseService {
  registry: Arc<FlowRegistry>,
  store: Arc<dyn HolderStore>,
}

impl PurchaseService {
  pub fn new(registry: Arc<FlowRegistry>, store: Arc<dyn HolderStore>) -> Self {
    Self { registry, store }
  }

  /// Storefront checkout of a new order.
  #[instrument(name = "PurchaseService::place_order", skip_all, err(Display))]
  pub async fn place_order(&self, mut holder: ItemHolder, actor: Actor) -> FlowResult<PurchaseOutcome> {
    if let Some(id) = holder.id {
      return Err(FlowError::Configuration(format!(
        "place_order expects a new holder, got {}",
        id
      )));
    }
    let ctx = PurchaseContext::snapshot(&holder, actor);
    let flow = self.registry.get(FlowTrigger::Shopping)?;
    let result = flow.execute(&mut holder, &ctx)?;
    self.finish(holder, result).await
  }

  /// Loads the order, applies `edit`, and runs the order flow against the
  /// loaded state as origin.
  #[instrument(name = "PurchaseService::edit_order", skip(self, actor, edit), err(Display))]
  pub async fn edit_order<F>(&self, id: HolderId, actor: Actor, edit: F) -> FlowResult<PurchaseOutcome>
  where
    F: FnOnce(&mut ItemHolder) + Send,
  {
    let origin = self.store.load(id).await?;
    let mut target = origin.clone();
    edit(&mut target);
    self.commit_edit(origin, target, actor).await
  }

  /// Runs the order flow for `target` against `origin`, then saves it.
  ///
  /// `target` must carry the version it was loaded with; if the stored order
  /// moved on in the meantime, the save fails with [`FlowError::ConcurrencyConflict`].
  #[instrument(name = "PurchaseService::commit_edit", skip_all, fields(holder_id = ?target.id), err(Display))]
  pub async fn commit_edit(&self, origin: ItemHolder, mut target: ItemHolder, actor: Actor) -> FlowResult<PurchaseOutcome> {
    let ctx = PurchaseContext::new(origin, actor);
    let flow = self.registry.get(FlowTrigger::Order)?;
    let result = flow.execute(&mut target, &ctx)?;
    self.finish(target, result).await
  }

  async fn finish(&self, mut holder: ItemHolder, result: ProcessingResult) -> FlowResult<PurchaseOutcome> {
    if !result.is_success() {
      event!(Level::INFO, errors = result.errors().len(), "Processing reported errors, holder not saved.");
      return Ok(PurchaseOutcome {
        holder,
        result,
        committed: false,
      });
    }
    self.store.save(&mut holder).await?;
    event!(Level::INFO, holder_id = ?holder.id, version = holder.version, "Holder saved.");
    Ok(PurchaseOutcome {
      holder,
      result,
      committed: true,
    })
  }
}
