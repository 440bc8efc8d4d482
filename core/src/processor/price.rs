// purchase_flow/src/processor/price.rs

use crate::core::context::PurchaseContext;
use crate::core::holder::ItemHolder;
use crate::core::processor::Processor;
use crate::core::result::ResultAccumulator;

/// Brings recorded line prices up to date with the catalog and warns about each change.
#[derive(Debug, Default)]
pub struct PriceChangeProcessor;

impl PriceChangeProcessor {
  pub const NAME: &'static str = "price_change";
}

impl Processor for PriceChangeProcessor {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn process(
    &self,
    target: &mut ItemHolder,
    _ctx: &PurchaseContext,
    acc: &mut ResultAccumulator<'_>,
  ) -> anyhow::Result<()> {
    for item in &mut target.items {
      if let Some(current) = item.current_price {
        if current != item.price {
          acc.warn(format!("Price of '{}' changed from {} to {}", item.name, item.price, current));
          item.price = current;
        }
      }
    }
    Ok(())
  }
}
