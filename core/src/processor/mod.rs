// purchase_flow/src/processor/mod.rs

//! Concrete processors shipped with the crate.

pub mod payment_limit;
pub mod price;
pub mod stock;
pub mod update_date;

pub use payment_limit::PaymentTotalLimitProcessor;
pub use price::PriceChangeProcessor;
pub use stock::StockProcessor;
pub use update_date::{Clock, UpdateDateProcessor};
