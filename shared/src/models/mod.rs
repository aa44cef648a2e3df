//! Data models
//!
//! Shared between food-server and its clients (via API).
//! All IDs are 24-char hex strings; money is `rust_decimal::Decimal`
//! serialized as a string so no client ever sees a binary float.

pub mod add_on;
pub mod branch;
pub mod category;
pub mod dining_table;
pub mod menu;
pub mod money;
pub mod order;
pub mod sale;
pub mod user;

// Re-exports
pub use add_on::*;
pub use branch::*;
pub use category::*;
pub use dining_table::*;
pub use menu::*;
pub use money::*;
pub use order::*;
pub use sale::*;
pub use user::*;
