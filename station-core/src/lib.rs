//! Station Core - offline-first order-staging engine for a restaurant POS
//!
//! # Architecture overview
//!
//! The engine behind the terminal UI: it aggregates selected products into
//! a draft cart, overlays the day-gated buy-one-get-one promotion, manages
//! the three kitchen-ticket queues with time-based expiry, and reconciles
//! the local cache against the remote catalog/order service when
//! connectivity is intermittent.
//!
//! # Module structure
//!
//! ```text
//! station-core/src/
//! ├── core/        # Config, state wiring, background tasks
//! ├── cart/        # Draft cart aggregation
//! ├── promo/       # Day-gated BOGO overlay
//! ├── tickets/     # Kitchen ticket queues, expiry sweep, rendering
//! ├── catalog/     # Cache-first product catalog
//! ├── sync/        # Offline-order drain toward the remote store
//! ├── remote/      # Gateway traits + HTTP client
//! ├── storage/     # Durable store (redb)
//! ├── scratchpad   # Cross-navigation handoff blobs
//! └── utils/       # Logging, time formatting
//! ```
//!
//! Data flows one direction for catalog data (remote → durable cache → UI)
//! and one direction for cart data (UI → cart → ticket queue → remote).

pub mod cart;
pub mod catalog;
pub mod core;
pub mod promo;
pub mod remote;
pub mod scratchpad;
pub mod storage;
pub mod sync;
pub mod tickets;
pub mod utils;

// Re-export public types
pub use cart::{CartService, VarietyDraft, VarietySelection};
pub use catalog::CatalogService;
pub use crate::core::{BackgroundTasks, Config, StationState, TaskKind};
pub use promo::PromoEngine;
pub use remote::{CatalogGateway, OrderGateway, RemoteClient};
pub use scratchpad::Scratchpad;
pub use storage::{StationStorage, StorageError};
pub use sync::SyncService;
pub use tickets::{ExpiryWorker, TicketStore, EXPIRY_MS};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
