// purchase_flow/src/processor/stock.rs

use tracing::{event, Level};

use crate::core::context::{Channel, PurchaseContext};
use crate::core::holder::ItemHolder;
use crate::core::processor::Processor;
use crate::core::result::ResultAccumulator;

/// Checks line quantities against available stock.
///
/// On the storefront the holder is corrected (quantity clamped, sold-out lines
/// dropped) and the customer is warned. In the back office the shortage is a
/// validation error left for staff to resolve.
#[derive(Debug, Default)]
pub struct StockProcessor;

impl StockProcessor {
  pub const NAME: &'static str = "stock";
}

impl Processor for StockProcessor {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn process(
    &self,
    target: &mut ItemHolder,
    ctx: &PurchaseContext,
    acc: &mut ResultAccumulator<'_>,
  ) -> anyhow::Result<()> {
    let adjust = ctx.channel() == Channel::Storefront;
    let mut kept = Vec::with_capacity(target.items.len());

    for mut item in target.items.drain(..) {
      let stock = match item.stock {
        Some(stock) if item.quantity > stock => stock,
        _ => {
          kept.push(item);
          continue;
        }
      };

      event!(Level::DEBUG, product_class_id = item.product_class_id, requested = item.quantity, stock, "Insufficient stock.");
      if !adjust {
        acc.error(format!(
          "Insufficient stock for '{}': available {}, requested {}",
          item.name, stock, item.quantity
        ));
        kept.push(item);
      } else if stock == 0 {
        acc.warn(format!("'{}' is sold out and was removed", item.name));
      } else {
        acc.warn(format!(
          "Only {} of '{}' in stock, quantity reduced from {}",
          stock, item.name, item.quantity
        ));
        item.quantity = stock;
        kept.push(item);
      }
    }

    target.items = kept;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::actor::{Actor, Customer, Member};
  use crate::core::holder::{LineItem, OrderStatus, SaleType};
  use crate::core::result::ProcessingResult;

  fn cart() -> ItemHolder {
    ItemHolder::cart(SaleType(1), OrderStatus(1))
      .with_item(LineItem::new(1, "tea", 5, 300).with_stock(2))
      .with_item(LineItem::new(2, "cup", 1, 900).with_stock(0))
      .with_item(LineItem::new(3, "ebook", 9, 100))
  }

  #[test]
  fn storefront_clamps_and_drops_with_warnings() {
    let mut target = cart();
    let ctx = PurchaseContext::snapshot(&target, Actor::Customer(Customer::new(1, "c@example.com")));
    let mut result = ProcessingResult::new();
    StockProcessor
      .process(&mut target, &ctx, &mut ResultAccumulator::new(StockProcessor::NAME, &mut result))
      .unwrap();

    assert!(result.is_success());
    assert_eq!(result.warnings().len(), 2);
    assert_eq!(target.items.len(), 2);
    assert_eq!(target.items[0].quantity, 2);
    assert_eq!(target.items[1].product_class_id, 3);
  }

  #[test]
  fn back_office_reports_errors_without_touching_lines() {
    let mut target = cart();
    let ctx = PurchaseContext::snapshot(&target, Actor::Staff(Member::new(1, "admin")));
    let mut result = ProcessingResult::new();
    StockProcessor
      .process(&mut target, &ctx, &mut ResultAccumulator::new(StockProcessor::NAME, &mut result))
      .unwrap();

    assert_eq!(result.errors().len(), 2);
    assert_eq!(target, cart());
  }
}
