// purchase_flow/src/pipeline/execution.rs

//! Contains `PurchaseFlow::run()` and the phase-sequencing helpers built on it.

use tracing::{event, instrument, span, Level};

use crate::core::context::PurchaseContext;
use crate::core::holder::ItemHolder;
use crate::core::phase::Phase;
use crate::core::result::{ProcessingResult, ResultAccumulator};
use crate::error::{FlowError, FlowResult};
use crate::pipeline::definition::PurchaseFlow;

impl PurchaseFlow {
  /// Runs the processors of `phase` in declared order against `holder`.
  ///
  /// Validation errors are collected and every processor still runs. A processor
  /// returning `Err` aborts the phase with [`FlowError::Fault`]. Nothing is persisted.
  #[instrument(
    name = "PurchaseFlow::run",
    skip_all,
    fields(
      flow = %self.name,
      phase = %phase,
      holder_id = ?holder.id,
      num_processors = self.defs(phase).len(),
    ),
    err(Display)
  )]
  pub fn run(&self, phase: Phase, holder: &mut ItemHolder, ctx: &PurchaseContext) -> FlowResult<ProcessingResult> {
    // Identity is read once here and must hold for the whole run.
    let entry_id = holder.id;
    if entry_id.is_none() != ctx.is_new() {
      event!(Level::ERROR, flow_kind = ?ctx.flow(), "Context flow kind disagrees with holder identity.");
      return Err(FlowError::Configuration(format!(
        "Flow '{}' was given a {:?} context for a holder with identity {:?}",
        self.name,
        ctx.flow(),
        entry_id
      )));
    }

    event!(Level::DEBUG, "Phase starting.");
    let mut result = ProcessingResult::new();

    for (idx, def) in self.defs(phase).iter().enumerate() {
      let processor_name = def.name();
      let processor_span = span!(Level::INFO, "purchase_processor", processor = processor_name, index = idx);
      let _processor_span_guard = processor_span.enter();

      if let Some(skip_if) = &def.skip_if {
        if skip_if(&*holder, ctx) {
          event!(Level::DEBUG, "Processor skipped due to 'skip_if' condition.");
          continue;
        }
      }

      let errors_before = result.errors().len();
      let outcome = {
        let mut acc = ResultAccumulator::new(processor_name, &mut result);
        def.processor.process(holder, ctx, &mut acc)
      };

      if let Err(source) = outcome {
        event!(Level::ERROR, error = %source, "Processor faulted, aborting phase.");
        return Err(FlowError::Fault {
          phase,
          processor: processor_name.to_string(),
          source,
        });
      }

      if holder.id != entry_id {
        event!(Level::ERROR, "Processor changed the holder identity.");
        return Err(FlowError::IdentityChanged {
          processor: processor_name.to_string(),
        });
      }

      let new_errors = result.errors().len() - errors_before;
      if new_errors > 0 {
        event!(Level::WARN, new_errors, "Processor reported validation errors.");
      }
    }

    event!(
      Level::DEBUG,
      errors = result.errors().len(),
      warnings = result.warnings().len(),
      "Phase finished."
    );
    Ok(result)
  }

  pub fn validate(&self, holder: &mut ItemHolder, ctx: &PurchaseContext) -> FlowResult<ProcessingResult> {
    self.run(Phase::Validate, holder, ctx)
  }

  pub fn prepare(&self, holder: &mut ItemHolder, ctx: &PurchaseContext) -> FlowResult<ProcessingResult> {
    self.run(Phase::Prepare, holder, ctx)
  }

  pub fn commit(&self, holder: &mut ItemHolder, ctx: &PurchaseContext) -> FlowResult<ProcessingResult> {
    self.run(Phase::Commit, holder, ctx)
  }

  /// Runs validate, prepare and commit in order.
  ///
  /// A phase that records errors completes, but the following phases are not started.
  pub fn execute(&self, holder: &mut ItemHolder, ctx: &PurchaseContext) -> FlowResult<ProcessingResult> {
    let mut total = ProcessingResult::new();
    for phase in Phase::ALL {
      let phase_result = self.run(phase, holder, ctx)?;
      let succeeded = phase_result.is_success();
      total.merge(phase_result);
      if !succeeded {
        event!(Level::INFO, flow = %self.name, %phase, "Phase reported errors, later phases not started.");
        break;
      }
    }
    Ok(total)
  }
}
