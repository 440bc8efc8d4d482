// purchase_flow/src/consolidation/mod.rs

//! Login-time boundary: cart consolidation and the login event bridge.

pub mod login;
pub mod merge;

pub use login::{ConsolidatedCart, ConsolidationOutcome, LoginEvent, LoginEventBridge, LoginOutcome};
pub use merge::{fold_carts, CartConsolidationService, FoldedCart, MergedCarts};
