// purchase_flow/src/pipeline/mod.rs

//! Defines the `PurchaseFlow` struct, its construction, and execution logic.

pub mod definition;
pub mod execution;

pub use definition::{PurchaseFlow, PurchaseFlowBuilder};
