// tests/date_stamping_tests.rs
mod common;

use chrono::{DateTime, Utc};
use common::*;
use parking_lot::Mutex;
use purchase_flow::{
  Clock, ItemHolder, OrderStatus, Phase, PurchaseContext, PurchaseFlow, StatusConfig, StatusRole, UpdateDateProcessor,
};
use std::sync::Arc;

const NEW: u32 = 1;
const SHIPPED: u32 = 5;
const PAYMENT_COMPLETED: u32 = 6;

/// A clock the test can move forward between runs.
fn settable_clock(start: DateTime<Utc>) -> (Arc<Mutex<DateTime<Utc>>>, Clock) {
  let now = Arc::new(Mutex::new(start));
  let reader = now.clone();
  (now, Arc::new(move || *reader.lock()))
}

fn commit_flow(config: StatusConfig, clock: Clock) -> PurchaseFlow {
  let mut builder = PurchaseFlow::builder("dates");
  builder.add(
    Phase::Commit,
    Arc::new(UpdateDateProcessor::new(Arc::new(config)).with_clock(clock)),
  );
  builder.build()
}

fn commit(flow: &PurchaseFlow, origin: &ItemHolder, target: &mut ItemHolder) {
  let ctx = PurchaseContext::snapshot(origin, staff());
  let result = flow.commit(target, &ctx).unwrap();
  assert!(result.is_success());
}

#[test]
fn test_new_order_gets_order_date_only() {
  setup_tracing();
  let (_, clock) = settable_clock(at(9));
  let flow = commit_flow(StatusConfig::default(), clock);

  let mut order = new_order(NEW);
  let origin = order.clone();
  commit(&flow, &origin, &mut order);

  assert_eq!(order.order_date, Some(at(9)));
  assert_eq!(order.payment_date, None);
  assert_eq!(order.commit_date, None);
  assert_eq!(order.shippings[0].shipping_commit_date, None);
}

#[test]
fn test_new_order_created_as_shipped_gets_commit_dates() {
  setup_tracing();
  let (_, clock) = settable_clock(at(10));
  let flow = commit_flow(StatusConfig::default(), clock);

  let mut order = new_order(SHIPPED).with_shipping(purchase_flow::Shipping::new("office"));
  let origin = order.clone();
  commit(&flow, &origin, &mut order);

  assert_eq!(order.order_date, Some(at(10)));
  assert_eq!(order.commit_date, Some(at(10)));
  assert!(order.shippings.iter().all(|s| s.shipping_commit_date == Some(at(10))));
  assert_eq!(order.payment_date, None);
}

#[test]
fn test_new_order_created_as_paid_gets_payment_date() {
  setup_tracing();
  let (_, clock) = settable_clock(at(11));
  let flow = commit_flow(StatusConfig::default(), clock);

  let mut order = new_order(PAYMENT_COMPLETED);
  let origin = order.clone();
  commit(&flow, &origin, &mut order);

  assert_eq!(order.payment_date, Some(at(11)));
  assert_eq!(order.order_date, Some(at(11)));
  assert_eq!(order.commit_date, None);
}

#[test]
fn test_edit_into_payment_completed_stamps_payment_date_once() {
  setup_tracing();
  let (now, clock) = settable_clock(at(12));
  let flow = commit_flow(StatusConfig::default(), clock);

  let origin = saved_order(20, NEW);
  let mut order = origin.clone();
  order.status = OrderStatus(PAYMENT_COMPLETED);
  commit(&flow, &origin, &mut order);
  assert_eq!(order.payment_date, Some(at(12)));
  assert_eq!(order.order_date, None);

  // Saving again without a status change keeps the first stamp.
  *now.lock() = at(15);
  let origin = order.clone();
  commit(&flow, &origin, &mut order);
  assert_eq!(order.payment_date, Some(at(12)));
}

#[test]
fn test_edit_without_status_change_touches_nothing() {
  setup_tracing();
  let (_, clock) = settable_clock(at(13));
  let flow = commit_flow(StatusConfig::default(), clock);

  let origin = saved_order(21, SHIPPED);
  let mut order = origin.clone();
  order.items[0].quantity = 9;
  commit(&flow, &origin, &mut order);

  assert_eq!(order.commit_date, None);
  assert_eq!(order.payment_date, None);
  assert_eq!(order.order_date, None);
}

#[test]
fn test_commit_is_idempotent() {
  setup_tracing();
  let (now, clock) = settable_clock(at(14));
  let flow = commit_flow(StatusConfig::default(), clock);

  let mut order = new_order(SHIPPED);
  let origin = order.clone();
  commit(&flow, &origin, &mut order);
  let first = order.clone();

  // The stamped order is now the origin of a second, unchanged run.
  *now.lock() = at(18);
  let mut persisted = first.clone().with_id(purchase_flow::HolderId(30));
  let origin = persisted.clone();
  commit(&flow, &origin, &mut persisted);

  assert_eq!(persisted.commit_date, first.commit_date);
  assert_eq!(persisted.order_date, first.order_date);
  assert_eq!(persisted.shippings, first.shippings);
}

#[test]
fn test_leaving_shipped_keeps_commit_date() {
  setup_tracing();
  let (_, clock) = settable_clock(at(16));
  let flow = commit_flow(StatusConfig::default(), clock);

  let mut origin = saved_order(22, SHIPPED);
  origin.stamp_commit_date(at(8));
  let mut order = origin.clone();
  order.status = OrderStatus(PAYMENT_COMPLETED);
  commit(&flow, &origin, &mut order);

  assert_eq!(order.payment_date, Some(at(16)));
  // A regression does not clear the commit date.
  assert_eq!(order.commit_date, Some(at(8)));
  assert_eq!(order.shippings[0].shipping_commit_date, Some(at(8)));
}

#[test]
fn test_status_codes_follow_configuration() {
  setup_tracing();
  let (_, clock) = settable_clock(at(17));
  let config = StatusConfig::default()
    .with(StatusRole::Shipped, OrderStatus(50))
    .with(StatusRole::PaymentCompleted, OrderStatus(60));
  let flow = commit_flow(config, clock);

  // 5 is no longer "shipped" in this deployment.
  let origin = saved_order(23, NEW);
  let mut order = origin.clone();
  order.status = OrderStatus(SHIPPED);
  commit(&flow, &origin, &mut order);
  assert_eq!(order.commit_date, None);

  let mut order = origin.clone();
  order.status = OrderStatus(50);
  commit(&flow, &origin, &mut order);
  assert_eq!(order.commit_date, Some(at(17)));
}

#[test]
fn test_unconfigured_status_faults_the_commit() {
  setup_tracing();
  let (_, clock) = settable_clock(at(19));
  let flow = commit_flow(StatusConfig::default().without(StatusRole::PaymentCompleted), clock);

  let mut order = new_order(NEW);
  let ctx = PurchaseContext::snapshot(&order, staff());
  let err = flow.commit(&mut order, &ctx).unwrap_err();

  assert!(matches!(err, purchase_flow::FlowError::Fault { ref processor, .. } if processor == UpdateDateProcessor::NAME));
  assert_eq!(order.order_date, None);
}
