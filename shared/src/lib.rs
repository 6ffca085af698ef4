//! Shared types for the station engine
//!
//! Common types used across the workspace: the catalog/cart/ticket/order
//! data model, the unified error type, and small time/id utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult};
