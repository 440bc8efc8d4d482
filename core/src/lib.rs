// src/lib.rs

//! purchase-flow: an ordered, phase-based processing pipeline for carts and orders.
//!
//! A `PurchaseFlow` runs named processors over an item holder (a cart or an
//! order) in three phases: validate, prepare, commit. Features:
//!  - Validation errors are collected; every processor of the phase still runs.
//!  - A faulting processor aborts the phase with a typed error.
//!  - Processors see an immutable snapshot of the holder taken before mutation.
//!  - Flows are assembled and mutated at startup, then shared read-only.
//!  - Order status meaning comes from configuration, not from literals.
//!  - A login bridge records staff logins and consolidates customer carts.

pub mod config;
pub mod consolidation;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod service;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::core::actor::{Actor, Customer, CustomerId, Member};
pub use crate::core::context::{Channel, FlowKind, PurchaseContext};
pub use crate::core::holder::{HolderId, HolderKind, ItemHolder, LineItem, OrderStatus, SaleType, Shipping};
pub use crate::core::phase::Phase;
pub use crate::core::processor::{processor_fn, Processor, ProcessorDef, SkipCondition};
pub use crate::core::result::{ProcessingResult, ProcessingWarning, ResultAccumulator};

pub use crate::pipeline::{PurchaseFlow, PurchaseFlowBuilder};

pub use crate::processor::{Clock, PaymentTotalLimitProcessor, PriceChangeProcessor, StockProcessor, UpdateDateProcessor};

pub use crate::config::{StatusConfig, StatusRole};
pub use crate::error::{FlowError, FlowResult, ValidationError};

pub use crate::registry::{FlowRegistry, FlowTrigger, StandardFlowSettings};

pub use crate::consolidation::{
  CartConsolidationService, ConsolidatedCart, ConsolidationOutcome, FoldedCart, LoginEvent, LoginEventBridge,
  LoginOutcome, MergedCarts,
};
pub use crate::service::{PurchaseOutcome, PurchaseService};
pub use crate::store::{HolderStore, InMemoryStore, MemberStore};

/*
    Typical wiring:
    1. Load a `StatusConfig` (`from_env` or `from_json`) and wrap it in an `Arc`.
    2. Build a `FlowRegistry` with `FlowRegistry::standard`, or register custom flows.
       Flows may be adjusted with `insert_before`, `insert_after`, `remove` before `build()`.
    3. Hand the registry and a `HolderStore` to `PurchaseService`.
    4. On login, pass a `LoginEvent` to `LoginEventBridge::on_interactive_login`.
*/
