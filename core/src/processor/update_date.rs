// purchase_flow/src/processor/update_date.rs

//! Keeps order, payment and commit dates consistent with status transitions.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{event, Level};

use crate::config::{StatusConfig, StatusRole};
use crate::core::context::PurchaseContext;
use crate::core::holder::ItemHolder;
use crate::core::processor::Processor;
use crate::core::result::ResultAccumulator;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync + 'static>;

/// Stamps order dates.
///
/// New holders always get an order date. A date tied to a status is stamped
/// when the holder is created in that status, or when an edit moves it into
/// that status. Saving an edit without a status change touches nothing.
pub struct UpdateDateProcessor {
  config: Arc<StatusConfig>,
  clock: Clock,
}

impl UpdateDateProcessor {
  pub const NAME: &'static str = "update_date";

  pub fn new(config: Arc<StatusConfig>) -> Self {
    Self {
      config,
      clock: Arc::new(Utc::now),
    }
  }

  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.clock = clock;
    self
  }
}

impl Processor for UpdateDateProcessor {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn process(
    &self,
    target: &mut ItemHolder,
    ctx: &PurchaseContext,
    _acc: &mut ResultAccumulator<'_>,
  ) -> anyhow::Result<()> {
    let now = (self.clock)();
    let shipped = self.config.resolve(StatusRole::Shipped)?;
    let payment_completed = self.config.resolve(StatusRole::PaymentCompleted)?;

    if target.is_new() {
      if target.status == shipped {
        target.stamp_commit_date(now);
      } else if target.status == payment_completed {
        target.payment_date = Some(now);
      }
      target.order_date = Some(now);
      event!(Level::DEBUG, status = %target.status, "Stamped dates on new order.");
      return Ok(());
    }

    // Edit: only a transition into the status stamps its date. Leaving the
    // shipped status keeps the commit date that was set.
    let transitioned = target.status != ctx.origin().status;
    if target.status == shipped {
      if transitioned {
        target.stamp_commit_date(now);
        event!(Level::DEBUG, "Order moved to shipped, commit date stamped.");
      }
    } else if target.status == payment_completed && transitioned {
      target.payment_date = Some(now);
      event!(Level::DEBUG, "Order moved to payment completed, payment date stamped.");
    }
    Ok(())
  }
}
