use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use crate::{
    config::AppConfig,
    document::{DocumentRenderer, PdfRenderer},
    error::AppResult,
    models::{Product, Sale},
    repository,
    storage::{LocalStorage, PRODUCTS_KEY, SALES_KEY, USERS_KEY},
    stores::{
        CatalogStore, SalesLedger, SessionRegistry, UserDirectory, UserRecord,
        events::spawn_logger,
    },
};

/// Every store the point of sale owns. Guarded by a single lock so a checkout
/// sees and mutates cart, catalog and ledger as one step.
#[derive(Debug)]
pub struct Shop {
    pub catalog: CatalogStore,
    pub ledger: SalesLedger,
    pub users: UserDirectory,
    pub sessions: SessionRegistry,
}

#[derive(Clone)]
pub struct AppState {
    pub shop: Arc<Mutex<Shop>>,
    pub orm: Option<DatabaseConnection>,
    pub storage: LocalStorage,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub config: Arc<AppConfig>,
    pub offset: FixedOffset,
}

impl AppState {
    /// Hydrates the stores from the database and the local mirrors.
    pub async fn bootstrap(config: AppConfig, orm: Option<DatabaseConnection>) -> anyhow::Result<Self> {
        let offset = config.utc_offset()?;
        let storage = match &config.data_dir {
            Some(dir) => LocalStorage::new(dir),
            None => LocalStorage::disabled(),
        };

        let users = match storage.load::<Vec<UserRecord>>(USERS_KEY).await? {
            Some(records) => UserDirectory::from_records(records),
            None => UserDirectory::new(),
        };
        storage.save(USERS_KEY, users.records()).await?;

        let catalog = load_catalog(&config, orm.as_ref(), &storage).await?;
        let ledger = match storage.load::<Vec<Sale>>(SALES_KEY).await? {
            Some(sales) => SalesLedger::from_sales(sales, offset),
            None => SalesLedger::new(offset),
        };

        tracing::info!(
            products = catalog.len(),
            sales = ledger.len(),
            users = users.records().len(),
            database = orm.is_some(),
            "stores hydrated"
        );

        Ok(Self {
            shop: Arc::new(Mutex::new(Shop {
                catalog,
                ledger,
                users,
                sessions: SessionRegistry::with_ttl(config.session_ttl()),
            })),
            orm,
            storage,
            renderer: Arc::new(PdfRenderer::new()),
            config: Arc::new(config),
            offset,
        })
    }

    /// Logs catalog, ledger and directory events for the lifetime of the process.
    pub async fn spawn_event_log(&self) {
        let shop = self.shop.lock().await;
        spawn_logger(shop.catalog.subscribe(), "catalog");
        spawn_logger(shop.ledger.subscribe(), "ledger");
        spawn_logger(shop.users.subscribe(), "users");
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    pub async fn persist_users(&self, shop: &Shop) -> AppResult<()> {
        self.storage.save(USERS_KEY, shop.users.records()).await?;
        Ok(())
    }

    pub async fn persist_catalog(&self, shop: &Shop) -> AppResult<()> {
        self.storage.save(PRODUCTS_KEY, shop.catalog.products()).await?;
        Ok(())
    }

    pub async fn persist_sales(&self, shop: &Shop) -> AppResult<()> {
        self.storage.save(SALES_KEY, shop.ledger.sales()).await?;
        Ok(())
    }
}

async fn load_catalog(
    config: &AppConfig,
    orm: Option<&DatabaseConnection>,
    storage: &LocalStorage,
) -> anyhow::Result<CatalogStore> {
    if let Some(conn) = orm {
        let products = repository::list_products(conn).await?;
        if !products.is_empty() || !config.seed_demo_catalog {
            return Ok(CatalogStore::with_products(products));
        }
        let demo = CatalogStore::demo();
        for product in demo.products() {
            repository::insert_product(conn, product).await?;
        }
        return Ok(demo);
    }

    if let Some(products) = storage.load::<Vec<Product>>(PRODUCTS_KEY).await? {
        return Ok(CatalogStore::with_products(products));
    }
    Ok(if config.seed_demo_catalog {
        CatalogStore::demo()
    } else {
        CatalogStore::new()
    })
}
