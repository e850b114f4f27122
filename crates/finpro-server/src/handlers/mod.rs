//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod health;
pub mod insights;
pub mod receipts;
pub mod summary;
pub mod transactions;

// Re-export all handlers for use in router
pub use health::*;
pub use insights::*;
pub use receipts::*;
pub use summary::*;
pub use transactions::*;
