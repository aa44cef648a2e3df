//! Orders
//!
//! - [`pricer`]: cart -> priced order lines
//! - [`state_machine`]: status transitions
//! - [`service`]: create/list/update/delete, used by the HTTP API

pub mod pricer;
pub mod service;
pub mod state_machine;

pub use pricer::{MAX_QUANTITY, OrderPricer, PricedOrder, PricingError};
pub use service::OrderService;
pub use state_machine::{OrderEvent, TransitionError};
