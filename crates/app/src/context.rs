//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartsService, DefaultCartsService, MemoryCartStore, PgCartStore},
        catalog::{CatalogGateway, PgCatalogGateway},
        checkout::{CheckoutService, CheckoutSettings, DefaultCheckoutService, PaymentAuthorizer},
        orders::{DefaultOrdersService, OrderLedger, OrdersService, PgOrderLedger},
        promotions::{DefaultPromotionsService, PgPromotionStore, PromotionsService},
    },
    memory::MemoryStore,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub promotions: Arc<dyn PromotionsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// Signed-in users get durable carts; guest carts stay in process memory.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(
        url: &str,
        run_migrations: bool,
        settings: CheckoutSettings,
        payments: Arc<dyn PaymentAuthorizer>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;

            info!("applied database migrations");
        }

        let db = Db::new(pool);

        let catalog = Arc::new(PgCatalogGateway::new(db.clone()));
        let ledger = Arc::new(PgOrderLedger::new(db.clone(), settings.lock_timeout));

        let carts = Arc::new(DefaultCartsService::new(
            Arc::new(PgCartStore::new(db.clone())),
            Arc::new(MemoryCartStore::new()),
            catalog.clone(),
        ));

        let promotions = Arc::new(DefaultPromotionsService::new(Arc::new(
            PgPromotionStore::new(db),
        )));

        Ok(Self::assemble(carts, promotions, catalog, ledger, payments, settings))
    }

    /// Build application context over an in-process store.
    #[must_use]
    pub fn in_memory(
        store: &MemoryStore,
        settings: CheckoutSettings,
        payments: Arc<dyn PaymentAuthorizer>,
    ) -> Self {
        let store = Arc::new(store.clone());
        let guest_carts = Arc::new(MemoryCartStore::new());

        let carts = Arc::new(DefaultCartsService::new(
            guest_carts.clone(),
            guest_carts,
            store.clone(),
        ));

        let promotions = Arc::new(DefaultPromotionsService::new(store.clone()));

        Self::assemble(carts, promotions, store.clone(), store, payments, settings)
    }

    fn assemble(
        carts: Arc<DefaultCartsService>,
        promotions: Arc<DefaultPromotionsService>,
        catalog: Arc<dyn CatalogGateway>,
        ledger: Arc<dyn OrderLedger>,
        payments: Arc<dyn PaymentAuthorizer>,
        settings: CheckoutSettings,
    ) -> Self {
        let checkout = DefaultCheckoutService::new(
            carts.clone(),
            catalog,
            promotions.clone(),
            ledger.clone(),
            payments,
            settings,
        );

        Self {
            carts,
            promotions,
            checkout: Arc::new(checkout),
            orders: Arc::new(DefaultOrdersService::new(ledger)),
        }
    }
}
