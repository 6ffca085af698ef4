//! Catalog service - cache-first product catalog
//!
//! Two-phase load, never serialized as a blocking sequence: the durable
//! cache is published immediately (the UI drops its loading state as soon
//! as any cached data exists), while the authoritative set is requested
//! concurrently. A remote success supersedes the cache regardless of
//! completion order; a remote failure never disturbs a published cache
//! view; a cancelled task never publishes at all.

use parking_lot::RwLock;
use shared::AppResult;
use shared::models::Product;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

use crate::cart::CartService;
use crate::remote::CatalogGateway;
use crate::storage::StationStorage;

/// Where the currently published product set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    None,
    Cache,
    Remote,
}

struct CatalogState {
    products: Vec<Product>,
    source: Source,
}

/// Published product catalog with durable-cache fallback
pub struct CatalogService {
    state: RwLock<CatalogState>,
    loading: AtomicBool,
    remote: Arc<dyn CatalogGateway>,
    storage: StationStorage,
    cart: Arc<CartService>,
}

impl CatalogService {
    pub fn new(
        remote: Arc<dyn CatalogGateway>,
        storage: StationStorage,
        cart: Arc<CartService>,
    ) -> Self {
        Self {
            state: RwLock::new(CatalogState {
                products: Vec::new(),
                source: Source::None,
            }),
            loading: AtomicBool::new(true),
            remote,
            storage,
            cart,
        }
    }

    /// Currently published product set
    pub fn products(&self) -> Vec<Product> {
        self.state.read().products.clone()
    }

    /// Whether nothing has been published yet
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Run both load phases concurrently
    pub async fn hydrate(&self, cancel: &CancellationToken) {
        let cache_phase = async { self.publish_from_cache(cancel) };
        let remote_phase = self.refresh_from_remote(cancel);
        tokio::join!(cache_phase, remote_phase);
    }

    /// Phase 1: publish whatever the durable cache holds
    fn publish_from_cache(&self, cancel: &CancellationToken) {
        let products = match self.storage.load_products() {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read cached catalog");
                return;
            }
        };
        if cancel.is_cancelled() {
            return;
        }

        let mut state = self.state.write();
        // Whichever publishes last wins, except that an authoritative
        // remote set is never downgraded back to the cache view.
        if state.source < Source::Remote {
            tracing::debug!(products = products.len(), "Catalog hydrated from cache");
            state.products = products;
            state.source = Source::Cache;
            self.loading.store(false, Ordering::Release);
        }
    }

    /// Phase 2: fetch the authoritative set and overwrite the cache
    async fn refresh_from_remote(&self, cancel: &CancellationToken) {
        match self.remote.fetch_products().await {
            Ok(products) => {
                if cancel.is_cancelled() {
                    tracing::debug!("Dropping catalog response that arrived after teardown");
                    return;
                }
                {
                    let mut state = self.state.write();
                    tracing::info!(products = products.len(), "Catalog refreshed from remote");
                    state.products = products.clone();
                    state.source = Source::Remote;
                }
                self.loading.store(false, Ordering::Release);
                if let Err(e) = self.storage.save_products(&products) {
                    tracing::error!(error = %e, "Failed to overwrite catalog cache");
                }
            }
            Err(e) => {
                // A failed refresh is not a user-visible error
                tracing::warn!(error = %e, "Catalog refresh failed, keeping cached view");
            }
        }
    }

    /// Remove a product from the catalog and purge it from the cart
    ///
    /// Destructive and non-undoable; gated on the remote delete having
    /// been confirmed.
    pub async fn remove_product(&self, name: &str, price: i64) -> AppResult<()> {
        self.remote.remove_product(name, price).await?;

        let products = {
            let mut state = self.state.write();
            state.products.retain(|p| !p.matches_key(name, price));
            state.products.clone()
        };
        self.storage.save_products(&products)?;
        self.cart.purge_key(name, price)?;
        tracing::info!(name = %name, price, "Product removed from catalog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promo::PromoEngine;
    use crate::scratchpad::Scratchpad;
    use async_trait::async_trait;
    use chrono::Weekday;
    use shared::AppError;
    use shared::models::{CartLine, Pricing};
    use std::time::Duration;

    struct StubCatalog {
        products: Vec<Product>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl CatalogGateway for StubCatalog {
        async fn fetch_products(&self) -> AppResult<Vec<Product>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(AppError::remote_unavailable("connection refused"));
            }
            Ok(self.products.clone())
        }

        async fn remove_product(&self, _name: &str, _price: i64) -> AppResult<()> {
            if self.fail {
                return Err(AppError::remote_rejected("HTTP 500"));
            }
            Ok(())
        }
    }

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: None,
            name: name.to_string(),
            category: None,
            pricing: Pricing::Single { price },
        }
    }

    fn build(
        remote: StubCatalog,
        cached: &[Product],
    ) -> (tempfile::TempDir, Arc<CartService>, CatalogService) {
        let dir = tempfile::tempdir().unwrap();
        let promo = Arc::new(PromoEngine::new());
        promo.update_day(Weekday::Wed);
        let storage = StationStorage::open_in_memory().unwrap();
        storage.save_products(cached).unwrap();
        let scratchpad = Arc::new(Scratchpad::load(dir.path().join("pad.json")).unwrap());
        let cart = Arc::new(CartService::new(promo, storage.clone(), scratchpad));
        let catalog = CatalogService::new(Arc::new(remote), storage, cart.clone());
        (dir, cart, catalog)
    }

    #[tokio::test]
    async fn test_remote_supersedes_cache() {
        let remote = StubCatalog {
            products: vec![product("Cheese pizza", 300), product("Hot stuff", 550)],
            fail: false,
            delay: Some(Duration::from_millis(20)),
        };
        let (_dir, _cart, catalog) = build(remote, &[product("Cheese pizza", 280)]);
        assert!(catalog.is_loading());

        catalog.hydrate(&CancellationToken::new()).await;
        assert!(!catalog.is_loading());
        let products = catalog.products();
        assert_eq!(products.len(), 2);
        // The cache was overwritten with the authoritative set
        assert_eq!(catalog.storage.load_products().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_cached_view() {
        let remote = StubCatalog {
            products: vec![],
            fail: true,
            delay: None,
        };
        let cached = [product("Cheese pizza", 300)];
        let (_dir, _cart, catalog) = build(remote, &cached);

        catalog.hydrate(&CancellationToken::new()).await;
        assert!(!catalog.is_loading());
        assert_eq!(catalog.products(), cached.to_vec());
        assert_eq!(catalog.storage.load_products().unwrap(), cached.to_vec());
    }

    #[tokio::test]
    async fn test_late_cache_read_never_downgrades_remote() {
        let remote = StubCatalog {
            products: vec![product("Hot stuff", 550)],
            fail: false,
            delay: None,
        };
        let (_dir, _cart, catalog) = build(remote, &[product("Cheese pizza", 280)]);

        let cancel = CancellationToken::new();
        catalog.refresh_from_remote(&cancel).await;
        // A cache read completing after the remote publish is ignored
        catalog.publish_from_cache(&cancel);
        let products = catalog.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Hot stuff");
    }

    #[tokio::test]
    async fn test_cancelled_hydration_never_publishes() {
        let remote = StubCatalog {
            products: vec![product("Hot stuff", 550)],
            fail: false,
            delay: Some(Duration::from_millis(5)),
        };
        let (_dir, _cart, catalog) = build(remote, &[product("Cheese pizza", 280)]);

        let cancel = CancellationToken::new();
        cancel.cancel();
        catalog.hydrate(&cancel).await;
        assert!(catalog.is_loading());
        assert!(catalog.products().is_empty());
    }

    #[tokio::test]
    async fn test_remove_product_is_gated_on_remote_confirmation() {
        let remote = StubCatalog {
            products: vec![],
            fail: true,
            delay: None,
        };
        let cached = [product("Cheese pizza", 300)];
        let (_dir, cart, catalog) = build(remote, &cached);
        catalog.hydrate(&CancellationToken::new()).await;
        cart.replace_lines(vec![CartLine::paid("Cheese pizza", None, 300, 2)]).unwrap();

        let err = catalog.remove_product("Cheese pizza", 300).await.unwrap_err();
        assert!(err.is_remote());
        // Nothing was assumed persisted: catalog and cart are untouched
        assert_eq!(catalog.products(), cached.to_vec());
        assert_eq!(cart.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_product_purges_catalog_cache_and_cart() {
        let remote = StubCatalog {
            products: vec![product("Cheese pizza", 300), product("Hot stuff", 550)],
            fail: false,
            delay: None,
        };
        let (_dir, cart, catalog) = build(remote, &[]);
        catalog.hydrate(&CancellationToken::new()).await;
        cart.replace_lines(vec![
            CartLine::paid("Cheese pizza", None, 300, 2),
            CartLine::paid("Hot stuff", None, 550, 1),
        ])
        .unwrap();

        catalog.remove_product("Cheese pizza", 300).await.unwrap();

        let names: Vec<String> = catalog.products().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Hot stuff"]);
        assert_eq!(catalog.storage.load_products().unwrap().len(), 1);
        let cart_names: Vec<String> = cart.snapshot().iter().map(|l| l.name.clone()).collect();
        assert_eq!(cart_names, vec!["Hot stuff"]);
    }
}
