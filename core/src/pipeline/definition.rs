// purchase_flow/src/pipeline/definition.rs

//! Contains the `PurchaseFlow` struct and the builder that assembles its
//! ordered processor lists.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::phase::Phase;
use crate::core::processor::{Processor, ProcessorDef, SkipCondition};

/// An ordered list of processors per phase, frozen at construction.
///
/// The same flow is shared by every invocation; it holds no per-run state.
pub struct PurchaseFlow {
  pub(crate) name: String,
  pub(crate) phases: HashMap<Phase, Vec<ProcessorDef>>,
}

impl PurchaseFlow {
  pub fn builder(name: impl Into<String>) -> PurchaseFlowBuilder {
    PurchaseFlowBuilder::new(name)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn defs(&self, phase: Phase) -> &[ProcessorDef] {
    self.phases.get(&phase).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Processor names of `phase`, in execution order.
  pub fn processor_names(&self, phase: Phase) -> Vec<&str> {
    self.defs(phase).iter().map(ProcessorDef::name).collect()
  }
}

impl std::fmt::Debug for PurchaseFlow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut s = f.debug_struct("PurchaseFlow");
    s.field("name", &self.name);
    for phase in Phase::ALL {
      s.field(phase.as_str(), &self.processor_names(phase));
    }
    s.finish()
  }
}

/// Assembles a [`PurchaseFlow`]. Edits are only possible before `build()`.
pub struct PurchaseFlowBuilder {
  name: String,
  phases: HashMap<Phase, Vec<ProcessorDef>>,
}

impl PurchaseFlowBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      phases: HashMap::new(),
    }
  }

  fn position(&self, phase: Phase, processor_name: &str) -> Option<usize> {
    self
      .phases
      .get(&phase)
      .and_then(|defs| defs.iter().position(|d| d.name() == processor_name))
  }

  /// Panics if `processor_name` is not registered in `phase`.
  fn ensure_registered(&self, phase: Phase, processor_name: &str) -> usize {
    self.position(phase, processor_name).unwrap_or_else(|| {
      // Programming error in flow setup, e.g. a typo in the processor name.
      panic!(
        "Purchase flow setup error: processor '{}' is not registered in the {} phase of '{}'.",
        processor_name, phase, self.name
      )
    })
  }

  /// Panics if a processor with the same name is already registered in `phase`.
  fn ensure_not_registered(&self, phase: Phase, processor_name: &str) {
    if self.position(phase, processor_name).is_some() {
      panic!(
        "Purchase flow setup error: processor '{}' is already registered in the {} phase of '{}'.",
        processor_name, phase, self.name
      );
    }
  }

  fn insert_at(&mut self, phase: Phase, idx: Option<usize>, processor: Arc<dyn Processor>, skip_if: Option<SkipCondition>) {
    self.ensure_not_registered(phase, processor.name());
    let defs = self.phases.entry(phase).or_default();
    let def = ProcessorDef { processor, skip_if };
    match idx {
      Some(idx) => defs.insert(idx, def),
      None => defs.push(def),
    }
  }

  /// Appends `processor` to the end of `phase`.
  pub fn add(&mut self, phase: Phase, processor: Arc<dyn Processor>) -> &mut Self {
    self.insert_at(phase, None, processor, None);
    self
  }

  /// Appends `processor`, skipped whenever `skip_if` holds for the holder and context.
  pub fn add_unless(&mut self, phase: Phase, processor: Arc<dyn Processor>, skip_if: SkipCondition) -> &mut Self {
    self.insert_at(phase, None, processor, Some(skip_if));
    self
  }

  pub fn insert_before(&mut self, phase: Phase, existing: &str, processor: Arc<dyn Processor>) -> &mut Self {
    let idx = self.ensure_registered(phase, existing);
    self.insert_at(phase, Some(idx), processor, None);
    self
  }

  pub fn insert_after(&mut self, phase: Phase, existing: &str, processor: Arc<dyn Processor>) -> &mut Self {
    let idx = self.ensure_registered(phase, existing);
    self.insert_at(phase, Some(idx + 1), processor, None);
    self
  }

  /// Removing a processor that is not registered is a no-op.
  pub fn remove(&mut self, phase: Phase, processor_name: &str) -> &mut Self {
    if let Some(idx) = self.position(phase, processor_name) {
      if let Some(defs) = self.phases.get_mut(&phase) {
        defs.remove(idx);
      }
    }
    self
  }

  pub fn set_skip_condition(&mut self, phase: Phase, processor_name: &str, skip_if: Option<SkipCondition>) -> &mut Self {
    let idx = self.ensure_registered(phase, processor_name);
    if let Some(def) = self.phases.get_mut(&phase).and_then(|defs| defs.get_mut(idx)) {
      def.skip_if = skip_if;
    }
    self
  }

  pub fn build(self) -> PurchaseFlow {
    PurchaseFlow {
      name: self.name,
      phases: self.phases,
    }
  }
}
