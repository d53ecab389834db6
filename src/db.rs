use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::fs;

pub const MIGRATIONS_DIR: &str = "migrations";

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url)
        .await
        .context("connecting to DATABASE_URL")?;
    tracing::info!("database connected");
    Ok(conn)
}

/// Applies every `*.sql` file in `dir` in filename order and returns how many
/// files ran. Migrations must be idempotent (`IF NOT EXISTS`); there is no
/// bookkeeping table.
pub async fn run_migrations(conn: &DatabaseConnection, dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let files = migration_files(dir)
        .await
        .with_context(|| format!("reading migrations from {}", dir.display()))?;

    let backend = conn.get_database_backend();
    for file in &files {
        let sql = fs::read_to_string(file).await?;
        let statements = split_statements(&sql);
        tracing::info!(
            migration = %file.display(),
            statements = statements.len(),
            "applying migration"
        );
        for stmt in statements {
            conn.execute(Statement::from_string(backend, stmt))
                .await
                .with_context(|| format!("migration {} failed", file.display()))?;
        }
    }

    Ok(files.len())
}

async fn migration_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// Postgres prepared statements take one command each.
fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{stmt};"))
        .collect()
}
