//! Engine state - wiring and presentation-layer facade
//!
//! `StationState` holds shared references to every service and exposes the
//! cross-service commands (print, edit, promotion toggle) the presentation
//! layer calls. All services are `Arc`-shared, so cloning the state is
//! cheap.

use shared::models::{CartLine, KotTicket, OrderType};
use shared::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::promo::{self, PromoEngine};
use crate::remote::{CatalogGateway, OrderGateway, RemoteClient};
use crate::scratchpad::Scratchpad;
use crate::storage::StationStorage;
use crate::sync::SyncService;
use crate::tickets::{render, ExpiryWorker, TicketStore};

/// Shared engine state
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | Configuration (immutable) |
/// | storage | Durable store (redb) |
/// | scratchpad | Cross-navigation handoff blobs |
/// | promo | BOGO promotion engine |
/// | cart | Draft cart owner |
/// | tickets | Kitchen ticket queues |
/// | catalog | Published product catalog |
/// | sync | Offline-order reconciler |
#[derive(Clone)]
pub struct StationState {
    pub config: Config,
    pub storage: StationStorage,
    pub scratchpad: Arc<Scratchpad>,
    pub promo: Arc<PromoEngine>,
    pub cart: Arc<CartService>,
    pub tickets: Arc<TicketStore>,
    pub catalog: Arc<CatalogService>,
    pub sync: Arc<SyncService>,
}

impl StationState {
    /// Initialize the engine against the real remote service
    pub fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::storage(format!("Failed to create work directory: {e}")))?;

        let storage = StationStorage::open(config.database_path())
            .map_err(|e| AppError::storage(e.to_string()))?;
        let scratchpad = Arc::new(Scratchpad::load(config.scratchpad_path())?);
        let remote = RemoteClient::new(&config.remote_base_url, config.request_timeout_secs);

        Ok(Self::with_gateways(
            config.clone(),
            storage,
            scratchpad,
            Arc::new(remote.clone()),
            Arc::new(remote),
        ))
    }

    /// Wire the engine with explicit gateways (tests, alternate transports)
    pub fn with_gateways(
        config: Config,
        storage: StationStorage,
        scratchpad: Arc<Scratchpad>,
        catalog_gateway: Arc<dyn CatalogGateway>,
        order_gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        let promo = Arc::new(PromoEngine::new());
        let cart = Arc::new(CartService::new(
            promo.clone(),
            storage.clone(),
            scratchpad.clone(),
        ));
        let tickets = Arc::new(TicketStore::new(scratchpad.clone()));
        let catalog = Arc::new(CatalogService::new(
            catalog_gateway,
            storage.clone(),
            cart.clone(),
        ));
        let sync = Arc::new(SyncService::new(order_gateway, storage.clone()));

        Self {
            config,
            storage,
            scratchpad,
            promo,
            cart,
            tickets,
            catalog,
            sync,
        }
    }

    /// Register the engine's background tasks
    ///
    /// - one-shot catalog hydration (cache + remote refresh)
    /// - per-second ticket expiry sweep
    /// - hourly promotion day-gate re-evaluation
    ///
    /// All of them stop when the supervisor shuts down; the hydration
    /// checks the token before publishing so a teardown mid-flight never
    /// lets a stale response overwrite newer state.
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let catalog = self.catalog.clone();
        let cancel = tasks.shutdown_token();
        tasks.spawn("catalog_hydration", TaskKind::Warmup, async move {
            catalog.hydrate(&cancel).await;
        });

        let sweep = ExpiryWorker::new(
            self.tickets.clone(),
            Duration::from_millis(self.config.expiry_sweep_interval_ms),
        );
        tasks.spawn(
            "ticket_expiry_sweep",
            TaskKind::Periodic,
            sweep.run(tasks.shutdown_token()),
        );

        tasks.spawn(
            "promo_day_watcher",
            TaskKind::Periodic,
            promo::run_day_watcher(
                self.promo.clone(),
                self.cart.clone(),
                Duration::from_secs(self.config.promo_check_interval_secs),
                tasks.shutdown_token(),
            ),
        );
    }

    // ========== Presentation-layer commands ==========

    /// Print a kitchen ticket from the current draft cart
    ///
    /// Snapshots the cart into a pending ticket, clears the draft and
    /// returns the ticket together with its printable text.
    pub fn print_ticket(&self, order_type: OrderType) -> AppResult<(KotTicket, String)> {
        let items = self.cart.snapshot();
        if items.is_empty() {
            return Err(AppError::validation("Cannot print an empty cart"));
        }

        let ticket = self.tickets.print(items, order_type)?;
        let text = render::render_kot(&ticket);
        self.cart.clear()?;
        Ok((ticket, text))
    }

    /// Pop a ticket back into the draft cart, discarding the current draft
    pub fn edit_ticket(&self, order_type: OrderType, ticket_id: i64) -> AppResult<Vec<CartLine>> {
        let items = self.tickets.take_for_edit(order_type, ticket_id)?;
        self.cart.replace_lines(items)
    }

    /// Hand a ticket to the invoice finalization flow
    pub fn stage_invoice(&self, order_type: OrderType, ticket_id: i64) -> AppResult<Vec<CartLine>> {
        self.tickets.stage_for_invoice(order_type, ticket_id)
    }

    /// Toggle the promotion, re-applying the overlay on a state change
    pub fn set_promotion_enabled(&self, on: bool) -> AppResult<()> {
        if self.promo.set_enabled(on)? {
            self.cart.reapply_promotion()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Weekday;
    use shared::models::{OrderRecord, OrderSubmission, Pricing, Product};

    /// Gateway standing in for an unreachable remote: the engine keeps
    /// working offline against cache and queue.
    struct OfflineRemote;

    #[async_trait]
    impl CatalogGateway for OfflineRemote {
        async fn fetch_products(&self) -> AppResult<Vec<Product>> {
            Err(AppError::remote_unavailable("offline"))
        }
        async fn remove_product(&self, _name: &str, _price: i64) -> AppResult<()> {
            Err(AppError::remote_unavailable("offline"))
        }
    }

    #[async_trait]
    impl OrderGateway for OfflineRemote {
        async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>> {
            Err(AppError::remote_unavailable("offline"))
        }
        async fn submit_order(&self, _order: &OrderSubmission) -> AppResult<()> {
            Err(AppError::remote_unavailable("offline"))
        }
        async fn remove_order(&self, _id: &str) -> AppResult<()> {
            Err(AppError::remote_unavailable("offline"))
        }
    }

    fn offline_state() -> (tempfile::TempDir, StationState) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(
            dir.path().to_string_lossy().to_string(),
            "http://localhost:1",
        );
        config.ensure_work_dir_structure().unwrap();
        let storage = StationStorage::open(config.database_path()).unwrap();
        let scratchpad = Arc::new(Scratchpad::load(config.scratchpad_path()).unwrap());
        let state = StationState::with_gateways(
            config,
            storage,
            scratchpad,
            Arc::new(OfflineRemote),
            Arc::new(OfflineRemote),
        );
        // Pin the day gate so these tests behave the same on Thursdays
        state.promo.update_day(Weekday::Wed);
        (dir, state)
    }

    fn pizza() -> Product {
        Product {
            id: None,
            name: "Cheese pizza".into(),
            category: Some("Pizza".into()),
            pricing: Pricing::Single { price: 300 },
        }
    }

    #[test]
    fn test_print_ticket_snapshots_and_clears_draft() {
        let (_dir, state) = offline_state();
        state.cart.add_product(&pizza()).unwrap();
        state.cart.add_product(&pizza()).unwrap();

        let (ticket, text) = state.print_ticket(OrderType::Delivery).unwrap();
        assert_eq!(ticket.items.len(), 1);
        assert_eq!(ticket.items[0].quantity, 2);
        assert!(text.contains("Delivery"));
        assert!(text.contains("Cheese pizza"));

        // Draft cleared, ticket queued
        assert!(state.cart.snapshot().is_empty());
        assert_eq!(state.tickets.queue_len(OrderType::Delivery), 1);
    }

    #[test]
    fn test_print_rejects_empty_cart() {
        let (_dir, state) = offline_state();
        let err = state.print_ticket(OrderType::DineIn).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_edit_ticket_discards_current_draft() {
        let (_dir, state) = offline_state();
        state.cart.add_product(&pizza()).unwrap();
        let (ticket, _) = state.print_ticket(OrderType::Takeaway).unwrap();

        // A different draft is in progress when the edit happens
        state
            .cart
            .replace_lines(vec![CartLine::paid("Cold coffee", None, 80, 1)])
            .unwrap();

        let lines = state.edit_ticket(OrderType::Takeaway, ticket.id).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Cheese pizza");
        assert_eq!(state.tickets.queue_len(OrderType::Takeaway), 0);
        assert_eq!(state.cart.snapshot(), lines);
    }

    #[test]
    fn test_promotion_toggle_reapplies_overlay() {
        let (_dir, state) = offline_state();
        state.promo.update_day(Weekday::Thu);
        state.cart.add_product(&pizza()).unwrap();
        assert_eq!(state.cart.snapshot().len(), 2);

        state.set_promotion_enabled(false).unwrap();
        assert_eq!(state.cart.snapshot().len(), 1);

        state.set_promotion_enabled(true).unwrap();
        assert_eq!(state.cart.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_background_tasks_start_and_stop() {
        let (_dir, state) = offline_state();
        let mut tasks = BackgroundTasks::new();
        state.start_background_tasks(&mut tasks);
        assert_eq!(tasks.len(), 3);

        // Offline hydration publishes the (empty) cache and gives up on
        // the remote without surfacing an error.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!state.catalog.is_loading());

        tasks.shutdown().await;
    }
}
