pub mod actor;
pub mod context;
pub mod holder;
pub mod phase;
pub mod processor;
pub mod result;

// Re-export key types for easier access from other modules (and lib.rs)
pub use actor::{Actor, Customer, CustomerId, Member};
pub use context::{Channel, FlowKind, PurchaseContext};
pub use holder::{HolderId, HolderKind, ItemHolder, LineItem, OrderStatus, SaleType, Shipping};
pub use phase::Phase;
pub use processor::{processor_fn, Processor, ProcessorDef, SkipCondition};
pub use result::{ProcessingResult, ProcessingWarning, ResultAccumulator};
