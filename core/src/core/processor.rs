// purchase_flow/src/core/processor.rs

//! Defines the `Processor` capability and the registration entry that places a
//! processor in a phase.

use std::sync::Arc;

use crate::core::context::PurchaseContext;
use crate::core::holder::ItemHolder;
use crate::core::result::ResultAccumulator;

/// One business-rule unit applied to an item holder during a phase.
///
/// A processor may:
/// 1. mutate `target`;
/// 2. record warnings or validation errors through `acc` and return `Ok(())`;
/// 3. return `Err` when it cannot proceed at all. That aborts the phase and is
///    reported to the caller as a [`crate::FlowError::Fault`].
///
/// Implementations must leave previously stamped values alone when invoked again
/// on a holder whose relevant state has not changed.
pub trait Processor: Send + Sync {
  /// Unique name within a phase. Used for attribution and registry edits.
  fn name(&self) -> &str;

  fn process(
    &self,
    target: &mut ItemHolder,
    ctx: &PurchaseContext,
    acc: &mut ResultAccumulator<'_>,
  ) -> anyhow::Result<()>;
}

type ProcessFn =
  dyn Fn(&mut ItemHolder, &PurchaseContext, &mut ResultAccumulator<'_>) -> anyhow::Result<()> + Send + Sync + 'static;

/// A processor backed by a closure.
pub struct FnProcessor {
  name: String,
  f: Box<ProcessFn>,
}

impl Processor for FnProcessor {
  fn name(&self) -> &str {
    &self.name
  }

  fn process(
    &self,
    target: &mut ItemHolder,
    ctx: &PurchaseContext,
    acc: &mut ResultAccumulator<'_>,
  ) -> anyhow::Result<()> {
    (self.f)(target, ctx, acc)
  }
}

/// Wraps a closure as a shareable processor.
pub fn processor_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Processor>
where
  F: Fn(&mut ItemHolder, &PurchaseContext, &mut ResultAccumulator<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
  Arc::new(FnProcessor {
    name: name.into(),
    f: Box::new(f),
  })
}

// Evaluated before the processor runs; `true` skips it.
pub type SkipCondition = Arc<dyn Fn(&ItemHolder, &PurchaseContext) -> bool + Send + Sync + 'static>;

/// A processor as registered in a phase.
#[derive(Clone)]
pub struct ProcessorDef {
  pub processor: Arc<dyn Processor>,
  pub skip_if: Option<SkipCondition>,
}

impl ProcessorDef {
  pub fn name(&self) -> &str {
    self.processor.name()
  }
}

impl std::fmt::Debug for ProcessorDef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProcessorDef")
      .field("name", &self.name())
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
