// purchase_flow/src/registry.rs

//! Defines `FlowRegistry`, which maps each trigger of the purchase flow (cart
//! consolidation, storefront checkout, back-office edit) to its `PurchaseFlow`.
//! The flows share processor instances; only their composition and the
//! context they are run with differ.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::config::StatusConfig;
use crate::core::context::{Channel, PurchaseContext};
use crate::core::holder::ItemHolder;
use crate::core::phase::Phase;
use crate::core::processor::Processor;
use crate::core::result::ProcessingResult;
use crate::error::{FlowError, FlowResult};
use crate::pipeline::PurchaseFlow;
use crate::processor::{PaymentTotalLimitProcessor, PriceChangeProcessor, StockProcessor, UpdateDateProcessor};

/// What invoked the purchase flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowTrigger {
  /// Cart checks, e.g. after carts were consolidated on login.
  Cart,
  /// Storefront checkout creating a new order.
  Shopping,
  /// Back-office order creation and edits.
  Order,
}

impl fmt::Display for FlowTrigger {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      FlowTrigger::Cart => "cart",
      FlowTrigger::Shopping => "shopping",
      FlowTrigger::Order => "order",
    };
    f.write_str(name)
  }
}

/// Settings for [`FlowRegistry::standard`].
#[derive(Debug, Clone)]
pub struct StandardFlowSettings {
  pub status_config: Arc<StatusConfig>,
  pub payment_total_limit: i64,
}

impl StandardFlowSettings {
  pub fn new(status_config: Arc<StatusConfig>) -> Self {
    Self {
      status_config,
      payment_total_limit: 500_000,
    }
  }
}

/// Trigger-keyed registry of flows, filled once at startup.
pub struct FlowRegistry {
  flows: RwLock<HashMap<FlowTrigger, Arc<PurchaseFlow>>>,
}

impl Default for FlowRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl FlowRegistry {
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  /// The flows this crate ships with.
  ///
  /// - cart: validate = stock, price change
  /// - shopping: validate = stock, price change, payment total limit; commit = update date
  /// - order: validate = stock, payment total limit; commit = update date
  pub fn standard(settings: &StandardFlowSettings) -> Self {
    let stock: Arc<dyn Processor> = Arc::new(StockProcessor);
    let price: Arc<dyn Processor> = Arc::new(PriceChangeProcessor);
    let limit: Arc<dyn Processor> = Arc::new(PaymentTotalLimitProcessor::new(settings.payment_total_limit));
    let update_date: Arc<dyn Processor> = Arc::new(UpdateDateProcessor::new(settings.status_config.clone()));

    let mut cart = PurchaseFlow::builder("cart");
    cart.add(Phase::Validate, stock.clone()).add(Phase::Validate, price.clone());

    let mut shopping = PurchaseFlow::builder("shopping");
    shopping
      .add(Phase::Validate, stock.clone())
      .add(Phase::Validate, price)
      .add(Phase::Validate, limit.clone())
      .add(Phase::Commit, update_date.clone());

    let mut order = PurchaseFlow::builder("order");
    order
      .add(Phase::Validate, stock)
      .add_unless(
        Phase::Validate,
        limit,
        // The limit guards customer payments; staff may exceed it.
        Arc::new(|_: &ItemHolder, ctx: &PurchaseContext| ctx.channel() == Channel::BackOffice),
      )
      .add(Phase::Commit, update_date);

    let registry = Self::new();
    registry.register(FlowTrigger::Cart, cart.build());
    registry.register(FlowTrigger::Shopping, shopping.build());
    registry.register(FlowTrigger::Order, order.build());
    registry
  }

  /// Registers `flow` for `trigger`, replacing any previous one.
  pub fn register(&self, trigger: FlowTrigger, flow: PurchaseFlow) -> Arc<PurchaseFlow> {
    event!(Level::DEBUG, %trigger, flow = %flow.name(), "Registering purchase flow.");
    let flow = Arc::new(flow);
    self.flows.write().insert(trigger, flow.clone());
    flow
  }

  pub fn get(&self, trigger: FlowTrigger) -> FlowResult<Arc<PurchaseFlow>> {
    self.flows.read().get(&trigger).cloned().ok_or_else(|| {
      event!(Level::ERROR, %trigger, "No purchase flow registered.");
      FlowError::Configuration(format!("No purchase flow registered for trigger '{}'", trigger))
    })
  }

  /// Runs one phase of the flow registered for `trigger`.
  #[instrument(name = "FlowRegistry::run", skip(self, holder, ctx), err(Display))]
  pub fn run(
    &self,
    trigger: FlowTrigger,
    phase: Phase,
    holder: &mut ItemHolder,
    ctx: &PurchaseContext,
  ) -> FlowResult<ProcessingResult> {
    // The lock is released before any processor runs.
    let flow = self.get(trigger)?;
    flow.run(phase, holder, ctx)
  }
}
