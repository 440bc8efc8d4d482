// purchase_flow/src/processor/payment_limit.rs

use crate::core::context::PurchaseContext;
use crate::core::holder::ItemHolder;
use crate::core::processor::Processor;
use crate::core::result::ResultAccumulator;

/// Rejects holders whose total exceeds what the payment methods accept.
#[derive(Debug, Clone, Copy)]
pub struct PaymentTotalLimitProcessor {
  limit: i64,
}

impl PaymentTotalLimitProcessor {
  pub const NAME: &'static str = "payment_total_limit";

  pub fn new(limit: i64) -> Self {
    Self { limit }
  }

  pub fn limit(&self) -> i64 {
    self.limit
  }
}

impl Processor for PaymentTotalLimitProcessor {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn process(
    &self,
    target: &mut ItemHolder,
    _ctx: &PurchaseContext,
    acc: &mut ResultAccumulator<'_>,
  ) -> anyhow::Result<()> {
    let total = target.total();
    if total > self.limit {
      acc.error(format!("Total {} exceeds the payment limit of {}", total, self.limit));
    }
    Ok(())
  }
}
