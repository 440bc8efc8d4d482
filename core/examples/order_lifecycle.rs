// purchase_flow/examples/order_lifecycle.rs

use purchase_flow::{
  processor_fn, Actor, Customer, FlowRegistry, FlowTrigger, InMemoryStore, ItemHolder, LineItem, Member, Phase,
  PurchaseFlow, PurchaseService, Shipping, StandardFlowSettings, StatusConfig, StatusRole, StockProcessor,
  UpdateDateProcessor,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Purchase Flow Order Lifecycle Example ---");

  // 1. Status codes: defaults, overridable through ORDER_STATUS_* variables or a .env file.
  let statuses = Arc::new(StatusConfig::from_env()?);
  let settings = StandardFlowSettings::new(statuses.clone());
  let registry = FlowRegistry::standard(&settings);

  // 2. Customize the storefront flow: a gift-wrap note runs right after the stock check.
  let mut shopping = PurchaseFlow::builder("shopping-with-gift-wrap");
  shopping
    .add(Phase::Validate, Arc::new(StockProcessor))
    .insert_after(
      Phase::Validate,
      StockProcessor::NAME,
      processor_fn("gift_wrap", |target, _ctx, acc| {
        if target.quantity() > 3 {
          acc.warn("Gift wrap is limited to three items");
        }
        Ok(())
      }),
    )
    .add(Phase::Commit, Arc::new(UpdateDateProcessor::new(statuses.clone())));
  registry.register(FlowTrigger::Shopping, shopping.build());

  let store = Arc::new(InMemoryStore::new());
  let service = PurchaseService::new(Arc::new(registry), store);

  // 3. A customer checks out.
  let customer = Actor::Customer(Customer::new(42, "customer@example.com"));
  let order = ItemHolder::order(statuses.resolve(StatusRole::New)?)
    .with_item(LineItem::new(1, "Green tea", 4, 1_200).with_stock(10))
    .with_shipping(Shipping::new("Home"));
  let placed = service.place_order(order, customer).await?;
  for warning in placed.result.warnings() {
    warn!("Checkout warning: {}", warning);
  }
  let id = placed.holder.id.ok_or("order was not saved")?;
  info!(order = %id, order_date = ?placed.holder.order_date, "Order placed.");

  // 4. Staff marks it shipped; commit dates are stamped on the order and every shipping.
  let staff = Actor::Staff(Member::new(1, "admin"));
  let shipped_status = statuses.resolve(StatusRole::Shipped)?;
  let shipped = service
    .edit_order(id, staff.clone(), move |order| order.status = shipped_status)
    .await?;
  info!(commit_date = ?shipped.holder.commit_date, "Order shipped.");

  // 5. Saving again without a status change leaves the dates alone.
  let resaved = service.edit_order(id, staff, |_| {}).await?;
  assert_eq!(resaved.holder.commit_date, shipped.holder.commit_date);
  info!(version = resaved.holder.version, status = %resaved.holder.status, "Order re-saved.");

  info!("--- Example Finished ---");
  Ok(())
}
