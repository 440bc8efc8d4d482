// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use purchase_flow::{
  processor_fn, Actor, Customer, HolderId, ItemHolder, LineItem, Member, OrderStatus, Processor, SaleType, Shipping,
};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Fixtures ---
pub fn staff() -> Actor {
  Actor::Staff(Member::new(1, "admin"))
}

pub fn customer() -> Actor {
  Actor::Customer(Customer::new(7, "buyer@example.com"))
}

pub fn new_order(status: u32) -> ItemHolder {
  ItemHolder::order(OrderStatus(status))
    .with_item(LineItem::new(1, "tea", 2, 300))
    .with_shipping(Shipping::new("home"))
}

pub fn saved_order(id: u64, status: u32) -> ItemHolder {
  new_order(status).with_id(HolderId(id))
}

pub fn cart_with(sale_type: u32, items: &[(u64, u32)]) -> ItemHolder {
  items.iter().fold(ItemHolder::cart(SaleType(sale_type), OrderStatus(1)), |cart, (pc, qty)| {
    cart.with_item(LineItem::new(*pc, format!("item-{}", pc), *qty, 100))
  })
}

pub fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

// --- Common Processor Creators ---

/// Shared execution log, in invocation order.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> ExecutionLog {
  Arc::new(Mutex::new(Vec::new()))
}

/// Records its name and appends a line item so later processors can see the mutation.
pub fn create_recording_processor(name: &'static str, log: ExecutionLog) -> Arc<dyn Processor> {
  processor_fn(name, move |target, _ctx, _acc| {
    log.lock().push(name.to_string());
    PROCESSOR_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    let seen = target.items.len() as u64;
    target.items.push(LineItem::new(100 + seen, name, 1, 0));
    tracing::debug!(target: "test_processors", processor = name, items = target.items.len(), "executed");
    Ok(())
  })
}

/// Records a validation error and keeps going.
pub fn create_rejecting_processor(name: &'static str, log: ExecutionLog, message: &'static str) -> Arc<dyn Processor> {
  processor_fn(name, move |_target, _ctx, acc| {
    log.lock().push(name.to_string());
    PROCESSOR_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    acc.error(message);
    Ok(())
  })
}

/// Cannot proceed at all.
pub fn create_faulting_processor(name: &'static str, log: ExecutionLog, message: &'static str) -> Arc<dyn Processor> {
  processor_fn(name, move |_target, _ctx, _acc| {
    log.lock().push(name.to_string());
    PROCESSOR_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    tracing::warn!(target: "test_processors", processor = name, "faulting with: '{}'", message);
    Err(anyhow::anyhow!(message))
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking execution counts ---
pub static PROCESSOR_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  PROCESSOR_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
