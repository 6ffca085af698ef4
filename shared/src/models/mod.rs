//! Data models
//!
//! Shared between the engine and the presentation layer, and wire-shaped
//! for the remote catalog/order service where noted.

pub mod cart;
pub mod order;
pub mod product;
pub mod ticket;

// Re-exports
pub use cart::*;
pub use order::*;
pub use product::*;
pub use ticket::*;
