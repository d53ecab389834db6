use pos_server::{
    config::AppConfig,
    db::{MIGRATIONS_DIR, create_orm_conn, run_migrations},
    repository,
    stores::CatalogStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set to seed the catalog"))?;

    let orm = create_orm_conn(database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm, MIGRATIONS_DIR).await?;

    let existing = repository::list_products(&orm).await?;
    let demo = CatalogStore::demo();
    let mut inserted = 0;
    for product in demo.products() {
        if existing.iter().any(|p| p.name == product.name) {
            println!("Skipped {} (already present)", product.name);
            continue;
        }
        repository::insert_product(&orm, product).await?;
        inserted += 1;
    }

    println!("Seeded {inserted} products");
    Ok(())
}
