// purchase_flow/examples/login_consolidation.rs

use purchase_flow::{
  Actor, CartConsolidationService, Customer, FlowRegistry, FlowTrigger, HolderStore, InMemoryStore, ItemHolder,
  LineItem, LoginEvent, LoginEventBridge, LoginOutcome, Member, OrderStatus, SaleType, StandardFlowSettings,
  StatusConfig,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Purchase Flow Login Consolidation Example ---");

  let statuses = Arc::new(StatusConfig::default());
  let registry = FlowRegistry::standard(&StandardFlowSettings::new(statuses.clone()));
  let store = Arc::new(InMemoryStore::new());
  let customer = Customer::new(42, "customer@example.com");

  // A cart left over from an earlier visit, in a different sale type.
  let mut earlier = ItemHolder::cart(SaleType(2), OrderStatus(1))
    .with_customer(customer.id)
    .with_item(LineItem::new(7, "Subscription box", 1, 3_000).with_current_price(3_200));
  store.save(&mut earlier).await?;

  let bridge = LoginEventBridge::new(
    store.clone(),
    CartConsolidationService::new(store.clone()),
    registry.get(FlowTrigger::Cart)?,
  );

  // Staff login: only the login date is recorded.
  if let LoginOutcome::Staff { member, persisted, .. } = bridge
    .on_interactive_login(LoginEvent::new(Actor::Staff(Member::new(1, "admin"))))
    .await?
  {
    info!(member = %member.name, login_date = ?member.login_date, persisted, "Staff logged in.");
  }

  // Customer login with a fresh session cart.
  let session_cart = ItemHolder::cart(SaleType(1), OrderStatus(1)).with_item(LineItem::new(1, "Green tea", 2, 1_200));
  let event = LoginEvent::new(Actor::Customer(customer)).with_session_carts(vec![session_cart]);
  if let LoginOutcome::Customer(outcome) = bridge.on_interactive_login(event).await? {
    if outcome.carts_divided {
      warn!("Your items are in {} carts and must be checked out separately.", outcome.carts.len());
    }
    for consolidated in &outcome.carts {
      match &consolidated.validation {
        Ok(result) => {
          for warning in result.warnings() {
            info!(cart = ?consolidated.cart.id, "{}", warning);
          }
        }
        Err(err) => warn!(cart = ?consolidated.cart.id, error = %err, "Cart could not be checked."),
      }
      if let Err(err) = &consolidated.saved {
        warn!(cart = ?consolidated.cart.id, error = %err, "Cart could not be saved.");
      }
    }
  }

  info!(stored_carts = store.len(), "--- Example Finished ---");
  Ok(())
}
